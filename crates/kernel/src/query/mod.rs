//! Filtered ideas query engine.
//!
//! Request parameters flow through the column registry, the predicate
//! builder and the sort resolver into [`builder::IdeasQueryBuilder`], and
//! [`pager::execute`] runs the resulting statements against the store.

pub mod builder;
pub mod columns;
pub mod filter;
pub mod pager;
pub mod sort;

pub use columns::{Column, ColumnType};
pub use filter::Predicate;
pub use pager::{IdeaQuery, Page, PageLimits, PageWindow};
pub use sort::{ResolvedSort, SortDirection};
