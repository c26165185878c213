//! Core data model types for quizzy.
//!
//! These are the fundamental types that the rest of the system uses to
//! represent questions, question sets, answers and per-question feedback.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LoadError;

/// Number of answer choices every question carries.
pub const OPTION_COUNT: usize = 4;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question text shown to the user.
    pub text: String,
    /// The four answer choices, in source order.
    pub options: [String; OPTION_COUNT],
    /// Ground truth. Must equal one of `options` by value to be scorable.
    pub correct_answer: String,
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: [&str; OPTION_COUNT],
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options: options.map(String::from),
            correct_answer: correct_answer.into(),
        }
    }

    /// Returns `true` if the correct answer appears among the source options.
    pub fn is_scorable(&self) -> bool {
        self.options.iter().any(|o| *o == self.correct_answer)
    }
}

/// An ordered, non-empty collection of questions for one topic.
///
/// Immutable once built; the order is fixed for the lifetime of an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionSet {
    topic: String,
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Build a question set, rejecting an empty one.
    pub fn new(topic: impl Into<String>, questions: Vec<Question>) -> Result<Self, LoadError> {
        let topic = topic.into();
        if questions.is_empty() {
            return Err(LoadError::Empty { topic });
        }
        Ok(Self { topic, questions })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always `false` for a constructed set; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    /// One-time full reorder, applied by the loader before an attempt starts.
    pub(crate) fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.questions.shuffle(rng);
    }
}

/// What the user answered for a question.
///
/// `Unanswered` is a distinguished sentinel that never equals any real
/// answer string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAnswer {
    Given(String),
    Unanswered,
}

impl UserAnswer {
    /// Returns `true` only for a given answer equal to `expected`.
    pub fn matches(&self, expected: &str) -> bool {
        match self {
            UserAnswer::Given(answer) => answer == expected,
            UserAnswer::Unanswered => false,
        }
    }

    pub fn as_given(&self) -> Option<&str> {
        match self {
            UserAnswer::Given(answer) => Some(answer),
            UserAnswer::Unanswered => None,
        }
    }
}

impl fmt::Display for UserAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserAnswer::Given(answer) => write!(f, "{answer}"),
            UserAnswer::Unanswered => write!(f, "(unanswered)"),
        }
    }
}

/// Outcome of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerResult {
    Correct,
    Incorrect,
}

impl AnswerResult {
    pub fn is_correct(self) -> bool {
        matches!(self, AnswerResult::Correct)
    }
}

impl fmt::Display for AnswerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerResult::Correct => write!(f, "Correct"),
            AnswerResult::Incorrect => write!(f, "Incorrect"),
        }
    }
}

/// Per-question feedback produced by the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub question_text: String,
    pub user_answer: UserAnswer,
    pub correct_answer: String,
    pub result: AnswerResult,
    /// Set when the correct answer was not among the options shown.
    #[serde(default)]
    pub unscorable: bool,
}

/// How questions are laid out for the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Paging {
    /// One question at a time with next/previous navigation.
    #[default]
    Sequential,
    /// Every question on a single page.
    All,
}

impl fmt::Display for Paging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paging::Sequential => write!(f, "sequential"),
            Paging::All => write!(f, "all"),
        }
    }
}

impl FromStr for Paging {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "paged" | "one" => Ok(Paging::Sequential),
            "all" | "single-page" => Ok(Paging::All),
            other => Err(format!("unknown paging mode: {other}")),
        }
    }
}

/// Whether answer options are shuffled per question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionOrder {
    #[default]
    Source,
    Shuffled,
}
