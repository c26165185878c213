//! In-process store for tests and dry runs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use quizzy_core::traits::{ResponseRecord, ResultSink, ScoreRecord};

/// A record together with the time the store accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub record: T,
    pub server_timestamp: DateTime<Utc>,
}

/// Keeps every appended record in memory.
#[derive(Default)]
pub struct MemoryStore {
    responses: Mutex<Vec<Stored<ResponseRecord>>>,
    scores: Mutex<Vec<Stored<ScoreRecord>>>,
    call_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of append calls made to this store.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn responses(&self) -> Vec<Stored<ResponseRecord>> {
        lock(&self.responses).clone()
    }

    pub fn scores(&self) -> Vec<Stored<ScoreRecord>> {
        lock(&self.scores).clone()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ResultSink for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append_response(&self, record: &ResponseRecord) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        lock(&self.responses).push(Stored {
            record: record.clone(),
            server_timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn append_score(&self, record: &ScoreRecord) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        lock(&self.scores).push(Stored {
            record: record.clone(),
            server_timestamp: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizzy_core::model::{AnswerResult, FeedbackEntry, UserAnswer};
    use quizzy_core::report::{publish_report, AttemptReport};

    #[tokio::test]
    async fn records_are_stamped_and_kept_separately() {
        let store = MemoryStore::new();
        let before = Utc::now();
        store
            .append_score(&ScoreRecord {
                identifier: "ana".into(),
                score: 2,
                total: 3,
            })
            .await
            .unwrap();

        assert!(store.responses().is_empty());
        let scores = store.scores();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].record.score, 2);
        assert!(scores[0].server_timestamp >= before);
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn publishing_a_report_fills_both_collections() {
        let store = MemoryStore::new();
        let report = AttemptReport {
            id: Default::default(),
            created_at: Utc::now(),
            topic: "math".into(),
            identifier: None,
            score: 1,
            total: 1,
            duration_ms: 0,
            feedback: vec![FeedbackEntry {
                question_text: "2+2?".into(),
                user_answer: UserAnswer::Given("4".into()),
                correct_answer: "4".into(),
                result: AnswerResult::Correct,
                unscorable: false,
            }],
        };

        let summary = publish_report(&store, &report).await;
        assert!(summary.is_complete());
        assert_eq!(store.responses()[0].record.identifier, "anonymous");
        assert!(store.responses()[0].record.is_correct);
        assert_eq!(store.scores()[0].record.total, 1);
        assert_eq!(store.call_count(), 2);
    }
}
