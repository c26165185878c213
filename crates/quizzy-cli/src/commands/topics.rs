//! The `quizzy topics` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::Table;

use quizzy_core::loader::{list_topics, load_topic, LoadOptions};
use quizzy_store::config::load_config_from;

pub fn execute(dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let dir = dir.unwrap_or(config.topics_dir);

    let topics = list_topics(&dir)
        .with_context(|| format!("failed to list topics in {}", dir.display()))?;
    if topics.is_empty() {
        println!("No topics found in {}", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Topic", "Questions"]);

    let mut rng = rand::rng();
    for topic in &topics {
        let count = match load_topic(&dir, topic, LoadOptions::default(), &mut rng) {
            Ok(set) => set.len().to_string(),
            Err(e) => format!("error: {e}"),
        };
        table.add_row(vec![topic.clone(), count]);
    }

    println!("{table}");
    Ok(())
}
