//! CSV question loader.
//!
//! Loads topics from `.csv` files, enumerates the topics in a directory and
//! validates question sets. A load is all-or-nothing: any malformed row
//! rejects the whole source.

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Deserialize;

use crate::error::LoadError;
use crate::model::{Question, QuestionSet};

/// Columns every question source must provide, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "question",
    "option1",
    "option2",
    "option3",
    "option4",
    "correct_answer",
];

const TOPIC_EXTENSION: &str = "csv";

/// One raw CSV row, matched to columns by header name.
#[derive(Debug, Deserialize)]
struct CsvRow {
    question: String,
    option1: String,
    option2: String,
    option3: String,
    option4: String,
    correct_answer: String,
}

impl CsvRow {
    fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("question", self.question.as_str()),
            ("option1", self.option1.as_str()),
            ("option2", self.option2.as_str()),
            ("option3", self.option3.as_str()),
            ("option4", self.option4.as_str()),
            ("correct_answer", self.correct_answer.as_str()),
        ]
    }

    fn into_question(self) -> Question {
        Question {
            text: self.question,
            options: [self.option1, self.option2, self.option3, self.option4],
            correct_answer: self.correct_answer,
        }
    }
}

/// Options applied when loading a topic.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Reorder the questions once, at load time.
    pub shuffle_questions: bool,
}

/// Path of the source file for a topic inside `dir`.
pub fn topic_path(dir: &Path, topic: &str) -> PathBuf {
    dir.join(format!("{topic}.{TOPIC_EXTENSION}"))
}

/// Topic name derived from a source file's base name.
pub fn topic_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List the topics available in `dir`, sorted by name.
pub fn list_topics(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut topics = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == TOPIC_EXTENSION) {
            topics.push(topic_name(&path));
        }
    }
    topics.sort();
    Ok(topics)
}

/// Load a topic by name from `dir`.
pub fn load_topic<R: Rng + ?Sized>(
    dir: &Path,
    topic: &str,
    options: LoadOptions,
    rng: &mut R,
) -> Result<QuestionSet, LoadError> {
    load_question_set(&topic_path(dir, topic), options, rng)
}

/// Load a question set from a CSV file.
pub fn load_question_set<R: Rng + ?Sized>(
    path: &Path,
    options: LoadOptions,
    rng: &mut R,
) -> Result<QuestionSet, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        line: None,
        message: e.to_string(),
    })?;

    let mut set = parse_question_set(file, &topic_name(path), path)?;
    if options.shuffle_questions {
        set.shuffle(rng);
    }

    tracing::info!(
        topic = set.topic(),
        questions = set.len(),
        shuffled = options.shuffle_questions,
        "loaded question set"
    );
    Ok(set)
}

/// Parse CSV content into a `QuestionSet` (useful for testing).
///
/// `source_path` is only used for error messages.
pub fn parse_question_set<T: Read>(
    reader: T,
    topic: &str,
    source_path: &Path,
) -> Result<QuestionSet, LoadError> {
    let parse_err = |line: Option<u64>, message: String| LoadError::Parse {
        path: source_path.to_path_buf(),
        line,
        message,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| parse_err(e.position().map(|p| p.line()), e.to_string()))?
        .clone();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::Schema { missing });
    }

    let mut questions = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| parse_err(e.position().map(|p| p.line()), e.to_string()))?;
        let line = record.position().map(|p| p.line());

        let row: CsvRow = record
            .deserialize(Some(&headers))
            .map_err(|e| parse_err(line, e.to_string()))?;

        if let Some((column, _)) = row.fields().iter().find(|(_, value)| value.is_empty()) {
            return Err(parse_err(line, format!("empty value for '{column}'")));
        }

        questions.push(row.into_question());
    }

    QuestionSet::new(topic, questions)
}

/// A warning from question set validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// 1-based question number (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a question set for common authoring issues.
///
/// None of these reject the set; an unscorable question is scored as
/// incorrect during an attempt.
pub fn validate_question_set(set: &QuestionSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (i, q) in set.iter().enumerate() {
        if !q.is_scorable() {
            warnings.push(ValidationWarning {
                question: Some(i + 1),
                message: format!(
                    "correct answer '{}' is not one of the options; the question can never be scored correct",
                    q.correct_answer
                ),
            });
        }

        let distinct: HashSet<&String> = q.options.iter().collect();
        if distinct.len() < q.options.len() {
            warnings.push(ValidationWarning {
                question: Some(i + 1),
                message: "duplicate options".into(),
            });
        }
    }

    let mut seen = HashSet::new();
    for (i, q) in set.iter().enumerate() {
        if !seen.insert(&q.text) {
            warnings.push(ValidationWarning {
                question: Some(i + 1),
                message: format!("duplicate question text: {}", q.text),
            });
        }
    }

    warnings
}
