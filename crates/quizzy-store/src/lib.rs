//! quizzy-store — result stores and configuration.
//!
//! Implements the `ResultSink` trait for a remote HTTP document store, an
//! append-only JSON-lines file and an in-memory store, plus the config file
//! that selects between them.

pub mod config;
pub mod error;
pub mod http;
pub mod jsonl;
pub mod memory;

pub use config::{create_store, load_config, load_config_from, QuizzyConfig, StoreConfig};
pub use error::StoreError;
