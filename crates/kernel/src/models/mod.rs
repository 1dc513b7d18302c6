//! Database models.

pub mod idea;

pub use idea::{Idea, IdeaSummary, NewIdea, ValidationError};
