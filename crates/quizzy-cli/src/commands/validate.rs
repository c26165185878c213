//! The `quizzy validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizzy_core::loader::{
    list_topics, load_question_set, topic_path, validate_question_set, LoadOptions,
};

pub fn execute(file: Option<PathBuf>, dir: Option<PathBuf>) -> Result<()> {
    let paths = match (file, dir) {
        (Some(file), _) => vec![file],
        (None, Some(dir)) => list_topics(&dir)?
            .iter()
            .map(|topic| topic_path(&dir, topic))
            .collect(),
        (None, None) => anyhow::bail!("pass either --file or --dir"),
    };
    anyhow::ensure!(!paths.is_empty(), "no question files found");

    let mut total_warnings = 0;
    let mut failed = 0;
    let mut rng = rand::rng();

    for path in &paths {
        let set = match load_question_set(path, LoadOptions::default(), &mut rng) {
            Ok(set) => set,
            Err(e) if paths.len() == 1 => return Err(e.into()),
            Err(e) => {
                println!("{}: ERROR: {e}", path.display());
                failed += 1;
                continue;
            }
        };
        println!("Topic: {} ({} questions)", set.topic(), set.len());

        let warnings = validate_question_set(&set);
        for w in &warnings {
            let prefix = w
                .question
                .map(|n| format!("  [Q{n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    anyhow::ensure!(failed == 0, "{failed} topic(s) failed to load");

    if total_warnings == 0 {
        println!("All topics valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
