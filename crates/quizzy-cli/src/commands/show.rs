//! The `quizzy show` command.

use std::path::PathBuf;

use anyhow::Result;

use quizzy_core::report::AttemptReport;

use crate::render::report_text;

pub fn execute(report_path: PathBuf, format: String) -> Result<()> {
    let report = AttemptReport::load_json(&report_path)?;

    match format.as_str() {
        "text" => {
            println!(
                "Topic: {} ({})",
                report.topic,
                report.created_at.format("%Y-%m-%d %H:%M UTC")
            );
            print!("{}", report_text(&report));
        }
        "markdown" => print!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => anyhow::bail!("unknown format: '{other}' (expected text, markdown or json)"),
    }

    Ok(())
}
