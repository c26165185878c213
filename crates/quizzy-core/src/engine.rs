//! Quiz controller.
//!
//! [`QuizEngine`] owns a [`Session`] and turns user events into session
//! transitions. Every handler triggers exactly one render, whether or not the
//! transition was accepted.

use std::sync::Arc;

use crate::error::SessionError;
use crate::model::{OptionOrder, Paging, QuestionSet};
use crate::report::{publish_report, AttemptReport, PublishSummary, ResultsView};
use crate::session::{Phase, Session};
use crate::traits::{OptionView, PageView, QuestionView, QuizView, Renderer, ResultSink};

/// Drives one user's session and keeps the renderer in sync with it.
pub struct QuizEngine {
    session: Session,
    renderer: Arc<dyn Renderer>,
    sink: Option<Arc<dyn ResultSink>>,
    identifier: Option<String>,
    report: Option<AttemptReport>,
    published: Option<PublishSummary>,
}

impl QuizEngine {
    pub fn new(session: Session, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            session,
            renderer,
            sink: None,
            identifier: None,
            report: None,
            published: None,
        }
    }

    /// Forward submitted attempts to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Label attached to reports and persisted records.
    pub fn with_identifier(mut self, identifier: Option<String>) -> Self {
        self.identifier = identifier.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Report of the last submitted attempt, until reset or restart.
    pub fn report(&self) -> Option<&AttemptReport> {
        self.report.as_ref()
    }

    /// Outcome of forwarding the last attempt to the sink, once finished.
    pub fn published(&self) -> Option<PublishSummary> {
        self.published
    }

    pub fn on_start(&mut self, questions: Arc<QuestionSet>) {
        tracing::info!(topic = questions.topic(), count = questions.len(), "attempt started");
        self.report = None;
        self.published = None;
        self.session.start(questions);
        self.render();
    }

    /// Returns `true` if the current question changed.
    pub fn on_advance(&mut self) -> bool {
        let moved = self.session.advance();
        self.render();
        moved
    }

    /// Returns `true` if the current question changed.
    pub fn on_retreat(&mut self) -> bool {
        let moved = self.session.retreat();
        self.render();
        moved
    }

    /// Answer question `index` with the displayed option at `position`.
    ///
    /// In sequential paging the answered question also becomes current. A
    /// shuffled question that was never on screen is shown instead of
    /// answered, since its option order is not known to the user yet.
    pub fn on_select(&mut self, index: usize, position: usize) -> Result<String, SessionError> {
        let result = self.select(index, position);
        if let Err(e) = &result {
            tracing::debug!("selection rejected: {e}");
        }
        self.render();
        result
    }

    fn select(&mut self, index: usize, position: usize) -> Result<String, SessionError> {
        let config = self.session.config();
        let unseen = config.paging == Paging::Sequential
            && matches!(config.option_order, OptionOrder::Shuffled)
            && index != self.session.current_index()
            && !self.session.shown_options().contains_key(&index);
        if unseen {
            self.session.go_to(index)?;
            return Err(SessionError::NotShown { index });
        }

        let chosen = self.session.select_option(index, position)?;
        if index != self.session.current_index() {
            self.session.go_to(index)?;
        }
        Ok(chosen)
    }

    /// Score the attempt and show the results, then forward them to the sink
    /// if one is configured.
    ///
    /// The results are rendered before any write starts, so a slow or
    /// unreachable store never holds back the score. The forwarding summary
    /// is available from [`published`](Self::published) afterwards.
    pub async fn on_submit(&mut self) -> Result<&AttemptReport, SessionError> {
        let outcome = match self.session.submit() {
            Ok(outcome) => outcome.clone(),
            Err(e) => {
                self.render();
                return Err(e);
            }
        };
        let topic = self
            .session
            .questions()
            .map(|q| q.topic().to_string())
            .unwrap_or_default();

        let report = AttemptReport::from_outcome(&topic, self.identifier.as_deref(), &outcome);
        self.published = None;
        self.report = Some(report);
        self.render();

        if let (Some(sink), Some(report)) = (&self.sink, &self.report) {
            self.published = Some(publish_report(sink.as_ref(), report).await);
        }

        self.report.as_ref().ok_or(SessionError::NoQuestionSet)
    }

    /// Go back to the idle state. Rejected while an attempt is in progress.
    pub fn on_reset(&mut self) -> Result<(), SessionError> {
        let result = self.session.reset();
        if result.is_ok() {
            self.report = None;
            self.published = None;
        }
        self.render();
        result
    }

    /// Build the view for the current state.
    ///
    /// Takes `&mut self` because drawing a page fixes the option order of
    /// any question shown for the first time.
    pub fn view(&mut self) -> QuizView {
        match self.session.phase() {
            Phase::NotStarted => QuizView::Idle,
            Phase::InProgress => self.page_view().map_or(QuizView::Idle, QuizView::Page),
            Phase::Completed => match &self.report {
                Some(report) => QuizView::Results(ResultsView {
                    report: report.clone(),
                    published: self.published,
                }),
                None => QuizView::Idle,
            },
        }
    }

    fn page_view(&mut self) -> Option<PageView> {
        let topic = self.session.questions()?.topic().to_string();
        let navigator = *self.session.navigator();

        let mut questions = Vec::new();
        for index in navigator.page() {
            let text = self.session.questions()?.get(index)?.text.clone();
            let options = self.session.options_for(index).ok()?.clone();
            let answer = self.session.answer(index);
            questions.push(QuestionView {
                index,
                text,
                options: options
                    .into_iter()
                    .map(|label| OptionView {
                        selected: answer == Some(label.as_str()),
                        label,
                    })
                    .collect(),
            });
        }

        Some(PageView {
            topic,
            position: navigator.index() + 1,
            total: navigator.len(),
            answered: self.session.answered_count(),
            is_first: navigator.is_first(),
            is_last: navigator.is_last(),
            questions,
        })
    }

    fn render(&mut self) {
        let view = self.view();
        self.renderer.render(&view);
    }
}
