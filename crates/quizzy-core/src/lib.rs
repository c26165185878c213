//! quizzy-core — question loading, session state and scoring.
//!
//! This crate holds the data model and the per-user quiz lifecycle that the
//! CLI and the result stores build on.

pub mod engine;
pub mod error;
pub mod loader;
pub mod model;
pub mod navigator;
pub mod presenter;
pub mod report;
pub mod scorer;
pub mod session;
pub mod traits;
