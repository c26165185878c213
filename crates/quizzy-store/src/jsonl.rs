//! Append-only JSON-lines store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use quizzy_core::traits::{ResponseRecord, ResultSink, ScoreRecord};

use crate::error::StoreError;

/// Writes one JSON object per line, tagged with `kind` and stamped with the
/// write time.
pub struct JsonlStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

#[derive(Serialize)]
struct Line<'a, T: Serialize> {
    kind: &'static str,
    #[serde(flatten)]
    record: &'a T,
    server_timestamp: DateTime<Utc>,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append<T: Serialize + Sync>(
        &self,
        kind: &'static str,
        record: &T,
    ) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(&Line {
            kind,
            record,
            server_timestamp: Utc::now(),
        })?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ResultSink for JsonlStore {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn append_response(&self, record: &ResponseRecord) -> anyhow::Result<()> {
        Ok(self.append("response", record).await?)
    }

    async fn append_score(&self, record: &ScoreRecord) -> anyhow::Result<()> {
        Ok(self.append("score", record).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn appends_tagged_stamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("attempts.jsonl");
        let store = JsonlStore::new(&path);

        store
            .append_response(&ResponseRecord {
                identifier: "ana".into(),
                question_text: "2+2?".into(),
                user_answer: None,
                correct_answer: "4".into(),
                is_correct: false,
            })
            .await
            .unwrap();
        store
            .append_score(&ScoreRecord {
                identifier: "ana".into(),
                score: 0,
                total: 1,
            })
            .await
            .unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "response");
        assert_eq!(lines[0]["user_answer"], serde_json::Value::Null);
        assert_eq!(lines[1]["kind"], "score");
        assert_eq!(lines[1]["total"], 1);
        assert!(lines[1]["server_timestamp"].is_string());
    }

    #[tokio::test]
    async fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.jsonl");
        let store = Arc::new(JsonlStore::new(&path));

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .append_score(&ScoreRecord {
                            identifier: format!("user-{i}"),
                            score: i,
                            total: 20,
                        })
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(read_lines(&path).len(), 20);
    }
}
