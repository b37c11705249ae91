//! bandmark CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bandmark", version, about = "IELTS practice test scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an answer sheet against an answer key
    Score {
        /// Path to the .toml answer key
        #[arg(long)]
        key: PathBuf,

        /// Path to the .toml or .json answer sheet
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Save the score report as JSON in this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Show the per-question answer review
        #[arg(long)]
        review: bool,

        /// Append the score to the history log
        #[arg(long)]
        record: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate answer key TOML files
    Validate {
        /// Path to answer key file or directory
        #[arg(long)]
        key: PathBuf,
    },

    /// Take a timed test on the console
    Take {
        /// Path to the .toml answer key
        #[arg(long)]
        key: PathBuf,

        /// Time limit in minutes (overrides the key and config)
        #[arg(long)]
        minutes: Option<u64>,

        /// Append the score to the history log
        #[arg(long)]
        record: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two score reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Exit code 1 if any question lost points
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show score history
    History {
        /// Only show attempts at this test
        #[arg(long)]
        test: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example answer key
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bandmark=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            key,
            answers,
            format,
            output,
            review,
            record,
            config,
        } => commands::score::execute(key, answers, format, output, review, record, config).await,
        Commands::Validate { key } => commands::validate::execute(key),
        Commands::Take {
            key,
            minutes,
            record,
            config,
        } => commands::take::execute(key, minutes, record, config).await,
        Commands::Compare {
            baseline,
            current,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, fail_on_regression, format),
        Commands::History { test, config } => commands::history::execute(test, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
