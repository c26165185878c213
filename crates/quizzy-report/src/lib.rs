//! quizzy-report — report rendering for finished attempts.

pub mod html;

pub use html::{generate_html, write_html_report};
