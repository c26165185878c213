//! The `quizzy take` command.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use quizzy_core::engine::QuizEngine;
use quizzy_core::loader::{list_topics, load_topic, LoadOptions};
use quizzy_core::model::{OptionOrder, Paging, QuestionSet, OPTION_COUNT};
use quizzy_core::report::AttemptReport;
use quizzy_core::session::{Phase, Session, SessionConfig};
use quizzy_report::html::write_html_report;
use quizzy_store::config::{create_store, load_config_from};

use crate::render::{publish_text, TerminalRenderer};

const HELP: &str = "Commands: 1-4 answer, '<question> <option>' answer any question, \
                    n/next, p/prev, s/submit, r/again, q/quit";

#[derive(Args)]
pub struct TakeArgs {
    /// Topic name (a <topic>.csv file in the topics directory)
    #[arg(long)]
    topic: Option<String>,

    /// Directory containing <topic>.csv files
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Name recorded with your results
    #[arg(long)]
    name: Option<String>,

    /// Shuffle question order
    #[arg(long)]
    shuffle_questions: bool,

    /// Shuffle answer options
    #[arg(long)]
    shuffle_options: bool,

    /// Layout: sequential (one question at a time) or all
    #[arg(long)]
    paging: Option<Paging>,

    /// Directory for report files
    #[arg(long)]
    output: Option<PathBuf>,

    /// Report format: json, html, all
    #[arg(long)]
    format: Option<String>,

    /// Send results to the store configured in the config file
    #[arg(long)]
    record: bool,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Zero-based option position for the current question.
    Select(usize),
    /// Zero-based question index and option position.
    SelectFor { question: usize, position: usize },
    Next,
    Prev,
    Submit,
    Again,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let parse_option = |s: &str| {
        s.parse::<usize>()
            .ok()
            .filter(|n| (1..=OPTION_COUNT).contains(n))
            .map(|n| n - 1)
    };

    match line.to_lowercase().as_str() {
        "" => return Input::Empty,
        "n" | "next" => return Input::Next,
        "p" | "prev" | "previous" => return Input::Prev,
        "s" | "submit" => return Input::Submit,
        "r" | "again" => return Input::Again,
        "q" | "quit" | "exit" => return Input::Quit,
        _ => {}
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [option] => parse_option(option).map(Input::Select),
        [question, option] => question
            .parse::<usize>()
            .ok()
            .filter(|q| *q >= 1)
            .zip(parse_option(option))
            .map(|(q, position)| Input::SelectFor {
                question: q - 1,
                position,
            }),
        _ => None,
    }
    .unwrap_or_else(|| Input::Unknown(line.to_string()))
}

pub async fn execute(args: TakeArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let dir = args.dir.clone().unwrap_or(config.topics_dir.clone());
    let load_options = LoadOptions {
        shuffle_questions: args.shuffle_questions || config.shuffle_questions,
    };
    let session_config = SessionConfig {
        paging: args.paging.unwrap_or(config.paging),
        option_order: if args.shuffle_options || config.shuffle_options {
            OptionOrder::Shuffled
        } else {
            OptionOrder::Source
        },
    };

    let formats = report_formats(args.format.as_deref())?;
    let output = match (&args.output, formats.is_empty()) {
        (Some(dir), _) => Some(dir.clone()),
        (None, false) => Some(config.output_dir.clone()),
        (None, true) => None,
    };
    let formats = if output.is_some() && formats.is_empty() {
        vec!["json"]
    } else {
        formats
    };

    let mut engine = QuizEngine::new(Session::new(session_config), Arc::new(TerminalRenderer))
        .with_identifier(args.name.clone());
    if args.record {
        let store = config
            .store
            .as_ref()
            .context("--record needs a [store] section in the config file")?;
        engine = engine.with_sink(create_store(store)?);
    }

    tracing::debug!(?session_config, dir = %dir.display(), record = args.record, "starting quiz");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let topic = match args.topic.clone() {
        Some(topic) => topic,
        None => match choose_topic(&dir, &mut lines).await? {
            Some(topic) => topic,
            None => return Ok(()),
        },
    };

    engine.on_start(load(&dir, &topic, load_options)?);

    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match (engine.phase(), parse_input(&line)) {
            (_, Input::Quit) => break,
            (_, Input::Empty) => {}
            (_, Input::Unknown(s)) => println!("Unknown command '{s}'. {HELP}"),
            (Phase::InProgress, input) => match input {
                Input::Select(position) => {
                    if session_config.paging == Paging::All {
                        println!("All questions are on one page: answer with '<question> <option>'.");
                    } else {
                        let index = engine.session().current_index();
                        if let Err(e) = engine.on_select(index, position) {
                            println!("{e}");
                        }
                    }
                }
                Input::SelectFor { question, position } => {
                    if let Err(e) = engine.on_select(question, position) {
                        println!("{e}");
                    }
                }
                Input::Next => {
                    engine.on_advance();
                }
                Input::Prev => {
                    engine.on_retreat();
                }
                Input::Submit => {
                    let report = engine.on_submit().await?.clone();
                    if let Some(summary) = engine.published() {
                        print!("{}", publish_text(&summary));
                    }
                    if let Some(dir) = &output {
                        save_reports(&report, dir, &formats)?;
                    }
                }
                Input::Again => println!("Submit this attempt first, or 'q' to quit."),
                _ => {}
            },
            (_, Input::Again) => {
                engine.on_reset()?;
                engine.on_start(load(&dir, &topic, load_options)?);
            }
            (_, _) => println!("The quiz is finished. Type 'r' to try again or 'q' to quit."),
        }
    }

    if engine.phase() == Phase::InProgress {
        println!("Quiz abandoned.");
    }
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn load(dir: &Path, topic: &str, options: LoadOptions) -> Result<Arc<QuestionSet>> {
    let set = load_topic(dir, topic, options, &mut rand::rng())
        .with_context(|| format!("failed to load topic '{topic}'"))?;
    Ok(Arc::new(set))
}

async fn choose_topic(dir: &Path, lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    let topics = list_topics(dir)
        .with_context(|| format!("failed to list topics in {}", dir.display()))?;
    anyhow::ensure!(!topics.is_empty(), "no topics found in {}", dir.display());

    println!("Available topics:");
    for (i, topic) in topics.iter().enumerate() {
        println!("  {}) {topic}", i + 1);
    }

    loop {
        print!("Choose a topic [1-{}]: ", topics.len());
        let _ = std::io::stdout().flush();
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let line = line.trim();
        if matches!(line, "q" | "quit") {
            return Ok(None);
        }
        let chosen = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| topics.get(i))
            .or_else(|| topics.iter().find(|t| t.as_str() == line));
        match chosen {
            Some(topic) => return Ok(Some(topic.clone())),
            None => println!("Please enter a number between 1 and {}.", topics.len()),
        }
    }
}

fn report_formats(format: Option<&str>) -> Result<Vec<&'static str>> {
    let Some(format) = format else {
        return Ok(vec![]);
    };
    let mut formats = Vec::new();
    for fmt in format.split(',').map(str::trim) {
        let named: &[&'static str] = match fmt {
            "json" => &["json"],
            "html" => &["html"],
            "all" => &["json", "html"],
            other => anyhow::bail!("unknown report format: '{other}' (expected json, html or all)"),
        };
        for name in named {
            if !formats.contains(name) {
                formats.push(*name);
            }
        }
    }
    Ok(formats)
}

fn save_reports(report: &AttemptReport, output: &Path, formats: &[&str]) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");

    for fmt in formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("{}-{timestamp}.json", report.topic));
                report.save_json(&path)?;
                println!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{}-{timestamp}.html", report.topic));
                write_html_report(report, &path)?;
                println!("HTML report: {}", path.display());
            }
            _ => {}
        }
    }
    Ok(())
}
