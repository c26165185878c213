//! Collaborator traits for rendering and result persistence.
//!
//! The renderer is implemented by the CLI; result sinks are implemented by
//! the `quizzy-store` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::FeedbackEntry;
use crate::report::ResultsView;

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Receives one render request per handled event.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &QuizView);
}

/// Everything a renderer needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum QuizView {
    /// No attempt is loaded.
    Idle,
    /// Questions are being answered.
    Page(PageView),
    /// The attempt was submitted.
    Results(ResultsView),
}

/// The visible page of an attempt in progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub topic: String,
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub questions: Vec<QuestionView>,
}

impl PageView {
    /// Progress text such as `"Question 2 of 5"`.
    pub fn progress_text(&self) -> String {
        if self.questions.len() > 1 {
            format!("{} questions ({} answered)", self.total, self.answered)
        } else {
            format!("Question {} of {}", self.position, self.total)
        }
    }
}

/// A question as displayed, with its options in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    /// Zero-based index in the question set.
    pub index: usize,
    pub text: String,
    pub options: Vec<OptionView>,
}

impl QuestionView {
    pub fn selected(&self) -> Option<&OptionView> {
        self.options.iter().find(|o| o.selected)
    }
}

/// One selectable choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub label: String,
    pub selected: bool,
}

/// Renderer that draws nothing.
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render(&self, _: &QuizView) {}
}

// ---------------------------------------------------------------------------
// Result persistence
// ---------------------------------------------------------------------------

/// Append-only store for attempt results.
///
/// Implementations stamp each record with their own timestamp when it is
/// written and must tolerate concurrent appends from many sessions.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Human-readable sink name (e.g. "http").
    fn name(&self) -> &str;

    /// Append one per-question response record.
    async fn append_response(&self, record: &ResponseRecord) -> anyhow::Result<()>;

    /// Append one per-attempt score record.
    async fn append_score(&self, record: &ScoreRecord) -> anyhow::Result<()>;
}

/// A single answered (or unanswered) question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub identifier: String,
    pub question_text: String,
    /// `None` when the question was left unanswered.
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

impl ResponseRecord {
    pub fn from_feedback(identifier: &str, entry: &FeedbackEntry) -> Self {
        Self {
            identifier: identifier.to_string(),
            question_text: entry.question_text.clone(),
            user_answer: entry.user_answer.as_given().map(str::to_string),
            correct_answer: entry.correct_answer.clone(),
            is_correct: entry.result.is_correct(),
        }
    }
}

/// The aggregate score of one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub identifier: String,
    pub score: usize,
    pub total: usize,
}
