//! Attempt reports: display helpers, JSON persistence and forwarding to a
//! result sink.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerResult, FeedbackEntry};
use crate::scorer::QuizOutcome;
use crate::traits::{ResponseRecord, ResultSink, ScoreRecord};

/// Identifier used for persisted records when the user gave none.
pub const ANONYMOUS: &str = "anonymous";

/// A finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the attempt was submitted.
    pub created_at: DateTime<Utc>,
    /// Topic the questions came from.
    pub topic: String,
    /// Optional free-text label supplied by the user.
    #[serde(default)]
    pub identifier: Option<String>,
    pub score: usize,
    pub total: usize,
    /// Wall-clock duration from start to submit in milliseconds.
    pub duration_ms: u64,
    /// Per-question feedback, in question order.
    pub feedback: Vec<FeedbackEntry>,
}

impl AttemptReport {
    pub fn from_outcome(topic: &str, identifier: Option<&str>, outcome: &QuizOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            topic: topic.to_string(),
            identifier: identifier.map(str::to_string),
            score: outcome.score,
            total: outcome.total,
            duration_ms: outcome.duration.as_millis() as u64,
            feedback: outcome.feedback.clone(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// `"Your final score is: 3 / 5"`.
    pub fn score_line(&self) -> String {
        format!("Your final score is: {} / {}", self.score, self.total)
    }

    /// `"Time taken: 1m 5s"`.
    pub fn duration_line(&self) -> String {
        format!("Time taken: {}", format_duration(self.duration()))
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## Quiz Results: {}\n\n", self.topic));
        if let Some(identifier) = &self.identifier {
            md.push_str(&format!("**Name:** {identifier}\n\n"));
        }
        md.push_str(&format!("**{}**\n\n", self.score_line()));
        md.push_str(&format!("{}\n\n", self.duration_line()));

        md.push_str("### Detailed Feedback\n\n");
        md.push_str("| # | Question | Your Answer | Correct Answer | Result |\n");
        md.push_str("|---|----------|-------------|----------------|--------|\n");
        for (i, entry) in self.feedback.iter().enumerate() {
            let style = ResultStyle::of(entry.result);
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} {} |\n",
                i + 1,
                escape_cell(&entry.question_text),
                escape_cell(&entry.user_answer.to_string()),
                escape_cell(&entry.correct_answer),
                style.symbol,
                style.label
            ));
        }

        md
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Format a duration as minutes and seconds, e.g. `"2m 5s"`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Distinguishing color of a result marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Green,
    Red,
}

/// Visual marker for a feedback row, derived only from its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultStyle {
    pub label: &'static str,
    pub symbol: &'static str,
    pub css_class: &'static str,
    pub color: MarkerColor,
}

impl ResultStyle {
    pub fn of(result: AnswerResult) -> Self {
        match result {
            AnswerResult::Correct => Self {
                label: "Correct",
                symbol: "✔",
                css_class: "correct",
                color: MarkerColor::Green,
            },
            AnswerResult::Incorrect => Self {
                label: "Incorrect",
                symbol: "✘",
                css_class: "incorrect",
                color: MarkerColor::Red,
            },
        }
    }
}

/// What the renderer shows after submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub report: AttemptReport,
    /// Present when results were forwarded to a sink.
    pub published: Option<PublishSummary>,
}

/// Outcome of forwarding an attempt to a result sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishSummary {
    pub responses_written: usize,
    pub responses_failed: usize,
    pub score_written: bool,
}

impl PublishSummary {
    pub fn is_complete(&self) -> bool {
        self.responses_failed == 0 && self.score_written
    }
}

/// Forward an attempt to `sink`: one response record per question, then one
/// score record.
///
/// Best effort. Failures are logged and counted, never returned.
pub async fn publish_report(sink: &dyn ResultSink, report: &AttemptReport) -> PublishSummary {
    let identifier = report.identifier.as_deref().unwrap_or(ANONYMOUS);

    let records: Vec<ResponseRecord> = report
        .feedback
        .iter()
        .map(|entry| ResponseRecord::from_feedback(identifier, entry))
        .collect();

    let results = join_all(records.iter().map(|r| sink.append_response(r))).await;

    let mut summary = PublishSummary::default();
    for (record, result) in records.iter().zip(results) {
        match result {
            Ok(()) => summary.responses_written += 1,
            Err(e) => {
                tracing::warn!(
                    sink = sink.name(),
                    question = %record.question_text,
                    "failed to store response: {e:#}"
                );
                summary.responses_failed += 1;
            }
        }
    }

    let score = ScoreRecord {
        identifier: identifier.to_string(),
        score: report.score,
        total: report.total,
    };
    match sink.append_score(&score).await {
        Ok(()) => summary.score_written = true,
        Err(e) => tracing::warn!(sink = sink.name(), "failed to store score: {e:#}"),
    }

    tracing::info!(
        sink = sink.name(),
        written = summary.responses_written,
        failed = summary.responses_failed,
        score_written = summary.score_written,
        "published attempt results"
    );
    summary
}
