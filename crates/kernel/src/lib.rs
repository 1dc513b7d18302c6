//! Ideaboard Kernel Library
//!
//! Filtered query engine and HTTP API for improvement ideas.
//! The main entry point for running the server is the `ideaboard` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod query;
pub mod routes;
pub mod state;
