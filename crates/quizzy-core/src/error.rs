//! Error types for question loading and session transitions.
//!
//! Loader errors are terminal for the current action: the user has to pick
//! the topic again. Session errors signal a transition attempted from the
//! wrong lifecycle phase and leave the session untouched.

use std::path::PathBuf;

use thiserror::Error;

use crate::session::Phase;

/// Errors that can occur while loading a question set.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The question source does not exist.
    #[error("question source not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// One or more required columns are missing from the header row.
    #[error("question source is missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A row or the file itself could not be parsed.
    #[error("failed to parse {}{}: {message}", .path.display(), .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Parse {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    /// The source has a header but no questions.
    #[error("topic '{topic}' contains no questions")]
    Empty { topic: String },
}

impl LoadError {
    /// Column names reported by a schema error, empty otherwise.
    pub fn missing_columns(&self) -> &[String] {
        match self {
            LoadError::Schema { missing } => missing,
            _ => &[],
        }
    }
}

/// Errors raised by session transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The requested transition is not allowed from the current phase.
    #[error("cannot {action} while the quiz is {phase}")]
    InvalidTransition { phase: Phase, action: &'static str },

    /// No question set is loaded.
    #[error("no question set loaded")]
    NoQuestionSet,

    /// The question index is outside the loaded set.
    #[error("question {index} is out of range (set has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The option position is outside the four displayed choices.
    #[error("option {position} is out of range")]
    OptionOutOfRange { position: usize },

    /// The question's shuffled options were not on screen when it was answered.
    #[error("question {} had not been shown yet; choose again from the options below", .index + 1)]
    NotShown { index: usize },
}
