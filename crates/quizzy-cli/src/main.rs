//! quizzy CLI — take multiple-choice quizzes in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "quizzy", version, about = "Multiple-choice quizzes from CSV files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available topics
    Topics {
        /// Directory containing <topic>.csv files
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Take a quiz interactively
    Take(commands::take::TakeArgs),

    /// Check question files for problems
    Validate {
        /// A single question CSV file
        #[arg(long, conflicts_with = "dir", required_unless_present = "dir")]
        file: Option<PathBuf>,

        /// Directory of question CSV files
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Display a saved attempt report
    Show {
        /// Report JSON written by `take --output`
        #[arg(long)]
        report: PathBuf,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and sample topic
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizzy=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Topics { dir, config } => commands::topics::execute(dir, config),
        Commands::Take(args) => commands::take::execute(args).await,
        Commands::Validate { file, dir } => commands::validate::execute(file, dir),
        Commands::Show { report, format } => commands::show::execute(report, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
