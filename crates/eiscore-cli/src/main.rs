//! eiscore CLI — score elicited imitation responses from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "eiscore", version, about = "Elicited imitation grammatical scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single response
    Score {
        /// Path to .toml item bank or directory
        #[arg(long)]
        items: PathBuf,

        /// Item id to score against
        #[arg(long)]
        item: String,

        /// The transcribed response
        response: String,

        /// Print every rule the cascade evaluated
        #[arg(long)]
        explain: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a TSV file of responses
    Batch {
        /// Path to .toml item bank or directory
        #[arg(long)]
        items: PathBuf,

        /// Item id to score against
        #[arg(long)]
        item: String,

        /// Input TSV
        #[arg(long)]
        input: PathBuf,

        /// Output TSV (input lines with a score column)
        #[arg(long)]
        output: PathBuf,

        /// Zero-based column holding the response id
        #[arg(long, default_value = "0")]
        id_column: usize,

        /// Zero-based column holding the transcription
        #[arg(long, default_value = "1")]
        column: usize,

        /// The input has no header line
        #[arg(long)]
        no_header: bool,

        /// Write the JSON report here instead of the output directory
        #[arg(long)]
        report: Option<PathBuf>,

        /// Write a markdown summary
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Max concurrent annotator calls (overrides config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate item bank TOML files
    Validate {
        /// Path to item bank file or directory
        #[arg(long)]
        items: PathBuf,
    },

    /// Compare two batch reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Exit code 1 if any score changed
        #[arg(long)]
        fail_on_change: bool,
    },

    /// Create starter config, lexicon and example item bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("eiscore=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            items,
            item,
            response,
            explain,
            config,
        } => commands::score::execute(items, item, response, explain, config).await,
        Commands::Batch {
            items,
            item,
            input,
            output,
            id_column,
            column,
            no_header,
            report,
            summary,
            parallelism,
            config,
        } => {
            commands::batch::execute(commands::batch::BatchArgs {
                items,
                item,
                input,
                output,
                id_column,
                column,
                no_header,
                report,
                summary,
                parallelism,
                config,
            })
            .await
        }
        Commands::Validate { items } => commands::validate::execute(items),
        Commands::Compare {
            baseline,
            current,
            format,
            fail_on_change,
        } => commands::compare::execute(baseline, current, format, fail_on_change),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
