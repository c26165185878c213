//! Per-user quiz session state and lifecycle.
//!
//! A [`Session`] is the single source of truth for one attempt. It moves
//! through `NotStarted -> InProgress -> Completed -> NotStarted`:
//!
//! - `start` is allowed from any phase and discards whatever was there.
//! - `submit` is only allowed while `InProgress`.
//! - `reset` is allowed from `NotStarted` or `Completed`, never mid-attempt.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::{OptionOrder, Paging, QuestionSet, OPTION_COUNT};
use crate::navigator::Navigator;
use crate::presenter::{OptionPresenter, ShownOptions};
use crate::scorer::{score_attempt, Answers, QuizOutcome};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "not started"),
            Phase::InProgress => write!(f, "in progress"),
            Phase::Completed => write!(f, "completed"),
        }
    }
}

/// Presentation policy for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// One question at a time, or all on one page.
    pub paging: Paging,
    /// Source-order or shuffled-once options.
    pub option_order: OptionOrder,
}

/// Mutable state for one user's attempts.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    phase: Phase,
    questions: Option<Arc<QuestionSet>>,
    navigator: Navigator,
    presenter: OptionPresenter,
    answers: Answers,
    started_at: Option<Instant>,
    started_at_utc: Option<DateTime<Utc>>,
    outcome: Option<QuizOutcome>,
    rng: StdRng,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// A session whose option shuffles are reproducible.
    pub fn with_seed(config: SessionConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SessionConfig, rng: StdRng) -> Self {
        Self {
            config,
            phase: Phase::NotStarted,
            questions: None,
            navigator: Navigator::new(0, config.paging),
            presenter: OptionPresenter::new(config.option_order),
            answers: Answers::new(),
            started_at: None,
            started_at_utc: None,
            outcome: None,
            rng,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn questions(&self) -> Option<&Arc<QuestionSet>> {
        self.questions.as_ref()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn current_index(&self) -> usize {
        self.navigator.index()
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Option orders cached so far in this attempt.
    pub fn shown_options(&self) -> &ShownOptions {
        self.presenter.shown()
    }

    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    pub fn started_at_utc(&self) -> Option<DateTime<Utc>> {
        self.started_at_utc
    }

    /// Time spent so far, or the final duration once completed.
    pub fn elapsed(&self) -> Option<Duration> {
        match self.phase {
            Phase::NotStarted => None,
            Phase::InProgress => self.started_at.map(|t| t.elapsed()),
            Phase::Completed => self.outcome.as_ref().map(|o| o.duration),
        }
    }

    /// Begin a new attempt, discarding any previous state.
    pub fn start(&mut self, questions: Arc<QuestionSet>) {
        if self.phase == Phase::InProgress {
            tracing::debug!("starting over an attempt that was in progress");
        }
        self.clear();
        self.navigator = Navigator::new(questions.len(), self.config.paging);
        self.questions = Some(questions);
        self.started_at = Some(Instant::now());
        self.started_at_utc = Some(Utc::now());
        self.phase = Phase::InProgress;
    }

    /// Record `option` as the answer to question `index`, replacing any
    /// earlier answer.
    pub fn record_answer(
        &mut self,
        index: usize,
        option: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.require_in_progress("answer")?;
        self.check_index(index)?;
        self.answers.insert(index, option.into());
        Ok(())
    }

    /// Answer question `index` with the option at zero-based `position` of
    /// the displayed choices. Returns the chosen option.
    pub fn select_option(&mut self, index: usize, position: usize) -> Result<String, SessionError> {
        self.require_in_progress("answer")?;
        if position >= OPTION_COUNT {
            return Err(SessionError::OptionOutOfRange { position });
        }
        let chosen = self.options_for(index)?[position].clone();
        self.answers.insert(index, chosen.clone());
        Ok(chosen)
    }

    /// The four choices displayed for question `index`.
    pub fn options_for(&mut self, index: usize) -> Result<&[String; OPTION_COUNT], SessionError> {
        let questions = self.questions.as_ref().ok_or(SessionError::NoQuestionSet)?;
        let question = questions.get(index).ok_or(SessionError::IndexOutOfRange {
            index,
            len: questions.len(),
        })?;
        Ok(self.presenter.options_for(index, question, &mut self.rng))
    }

    /// Move to the next question; no-op at the end or outside an attempt.
    pub fn advance(&mut self) -> bool {
        self.phase == Phase::InProgress && self.navigator.advance()
    }

    /// Move to the previous question; no-op at the start or outside an attempt.
    pub fn retreat(&mut self) -> bool {
        self.phase == Phase::InProgress && self.navigator.retreat()
    }

    /// Jump to question `index` (sequential paging only).
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.require_in_progress("navigate")?;
        self.check_index(index)?;
        self.navigator.jump_to(index);
        Ok(())
    }

    pub fn is_first(&self) -> bool {
        self.navigator.is_first()
    }

    pub fn is_last(&self) -> bool {
        self.navigator.is_last()
    }

    /// Score the attempt and move to `Completed`.
    ///
    /// Unanswered questions are allowed and scored incorrect.
    pub fn submit(&mut self) -> Result<&QuizOutcome, SessionError> {
        self.require_in_progress("submit")?;
        let questions = self.questions.as_ref().ok_or(SessionError::NoQuestionSet)?;
        let duration = self.started_at.map(|t| t.elapsed()).unwrap_or_default();

        let outcome = score_attempt(questions, &self.answers, self.presenter.shown(), duration);
        tracing::info!(
            topic = questions.topic(),
            score = outcome.score,
            total = outcome.total,
            duration_ms = duration.as_millis() as u64,
            "attempt submitted"
        );

        self.phase = Phase::Completed;
        Ok(self.outcome.insert(outcome))
    }

    /// Return to `NotStarted`, dropping the question set and all answers.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.phase == Phase::InProgress {
            return Err(SessionError::InvalidTransition {
                phase: self.phase,
                action: "reset",
            });
        }
        self.clear();
        self.phase = Phase::NotStarted;
        Ok(())
    }

    fn clear(&mut self) {
        self.questions = None;
        self.navigator = Navigator::new(0, self.config.paging);
        self.presenter.clear();
        self.answers.clear();
        self.started_at = None;
        self.started_at_utc = None;
        self.outcome = None;
    }

    fn require_in_progress(&self, action: &'static str) -> Result<(), SessionError> {
        if self.phase == Phase::InProgress {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                phase: self.phase,
                action,
            })
        }
    }

    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        let len = self.questions.as_ref().map(|q| q.len()).unwrap_or(0);
        if index < len {
            Ok(())
        } else {
            Err(SessionError::IndexOutOfRange { index, len })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerResult, Question, UserAnswer};

    fn three_questions() -> Arc<QuestionSet> {
        Arc::new(
            QuestionSet::new(
                "math",
                vec![
                    Question::new("2+2?", ["3", "4", "5", "6"], "4"),
                    Question::new("3+3?", ["5", "6", "7", "8"], "6"),
                    Question::new("1+1?", ["1", "2", "3", "4"], "2"),
                ],
            )
            .unwrap(),
        )
    }

    fn shuffled() -> SessionConfig {
        SessionConfig {
            paging: Paging::Sequential,
            option_order: OptionOrder::Shuffled,
        }
    }

    #[test]
    fn start_enters_in_progress() {
        let mut session = Session::with_seed(SessionConfig::default(), 1);
        assert_eq!(session.phase(), Phase::NotStarted);
        session.start(three_questions());
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.current_index(), 0);
        assert!(session.answers().is_empty());
        assert!(session.elapsed().is_some());
    }

    #[test]
    fn record_answer_overwrites() {
        let mut session = Session::with_seed(SessionConfig::default(), 1);
        session.start(three_questions());
        session.record_answer(0, "3").unwrap();
        session.record_answer(0, "4").unwrap();
        assert_eq!(session.answer(0), Some("4"));
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn record_answer_rejects_bad_index_and_phase() {
        let mut session = Session::with_seed(SessionConfig::default(), 1);
        assert!(matches!(
            session.record_answer(0, "4"),
            Err(SessionError::InvalidTransition { .. })
        ));
        session.start(three_questions());
        assert_eq!(
            session.record_answer(3, "4"),
            Err(SessionError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn select_option_uses_displayed_order() {
        let mut session = Session::with_seed(shuffled(), 9);
        session.start(three_questions());
        let shown = session.options_for(1).unwrap().clone();
        let chosen = session.select_option(1, 2).unwrap();
        assert_eq!(chosen, shown[2]);
        assert_eq!(session.answer(1), Some(shown[2].as_str()));
        assert_eq!(
            session.select_option(1, 4),
            Err(SessionError::OptionOutOfRange { position: 4 })
        );
    }

    #[test]
    fn option_order_stable_across_navigation() {
        let mut session = Session::with_seed(shuffled(), 5);
        session.start(three_questions());
        let first = session.options_for(0).unwrap().clone();
        session.advance();
        session.options_for(1).unwrap();
        session.retreat();
        assert_eq!(session.options_for(0).unwrap(), &first);
    }

    #[test]
    fn navigation_is_bounded() {
        let mut session = Session::with_seed(SessionConfig::default(), 1);
        session.start(three_questions());
        assert!(!session.retreat());
        assert_eq!(session.current_index(), 0);
        assert!(session.advance());
        assert!(session.advance());
        assert!(!session.advance());
        assert!(session.is_last());
        session.go_to(0).unwrap();
        assert!(session.is_first());
    }

    #[test]
    fn submit_scores_and_completes() {
        let mut session = Session::with_seed(SessionConfig::default(), 1);
        session.start(three_questions());
        session.record_answer(0, "4").unwrap();
        session.record_answer(1, "7").unwrap();

        let outcome = session.submit().unwrap().clone();
        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.feedback[0].result, AnswerResult::Correct);
        assert_eq!(outcome.feedback[1].result, AnswerResult::Incorrect);
        assert_eq!(outcome.feedback[2].user_answer, UserAnswer::Unanswered);
        assert_eq!(session.elapsed(), Some(outcome.duration));
    }

    #[test]
    fn submit_twice_is_rejected() {
        let mut session = Session::with_seed(SessionConfig::default(), 1);
        session.start(three_questions());
        session.submit().unwrap();
        assert_eq!(
            session.submit().unwrap_err(),
            SessionError::InvalidTransition {
                phase: Phase::Completed,
                action: "submit"
            }
        );
    }

    #[test]
    fn submit_before_start_is_rejected() {
        let mut session = Session::with_seed(SessionConfig::default(), 1);
        assert!(session.submit().is_err());
    }

    #[test]
    fn reset_not_allowed_mid_attempt() {
        let mut session = Session::with_seed(SessionConfig::default(), 1);
        session.start(three_questions());
        assert!(session.reset().is_err());
        assert_eq!(session.phase(), Phase::InProgress);
    }

    #[test]
    fn reset_clears_everything_and_is_idempotent() {
        let mut session = Session::with_seed(shuffled(), 2);
        session.start(three_questions());
        session.options_for(0).unwrap();
        session.select_option(0, 0).unwrap();
        session.advance();
        session.submit().unwrap();

        session.reset().unwrap();
        assert_eq!(session.phase(), Phase::NotStarted);
        assert!(session.answers().is_empty());
        assert!(session.shown_options().is_empty());
        assert!(session.outcome().is_none());
        assert!(session.questions().is_none());
        assert_eq!(session.current_index(), 0);
        assert!(session.elapsed().is_none());

        session.reset().unwrap();
        assert_eq!(session.phase(), Phase::NotStarted);
    }

    #[test]
    fn restart_is_independent_of_previous_attempt() {
        let mut session = Session::with_seed(SessionConfig::default(), 1);
        session.start(three_questions());
        session.record_answer(0, "4").unwrap();
        session.advance();

        session.start(three_questions());
        assert_eq!(session.phase(), Phase::InProgress);
        assert!(session.answers().is_empty());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.submit().unwrap().score, 0);
    }
}
