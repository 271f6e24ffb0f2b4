//! Uiwright CLI - inspect accessibility tree snapshots from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uiwright::prelude::*;
use uiwright::query::{count_matches, resolve, resolve_all};

#[derive(Parser)]
#[command(name = "uiwright")]
#[command(author, version, about = "Fluent UI testing over accessibility trees")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a snapshot as an indented outline
    Tree {
        /// Snapshot file (JSON or YAML)
        snapshot: PathBuf,

        /// Print normalized JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Resolve a query against a snapshot
    Resolve {
        /// Snapshot file (JSON or YAML)
        snapshot: PathBuf,

        /// Query such as `identifier("List") > button("Back")`
        query: String,

        /// Print every match instead of the first
        #[arg(long)]
        all: bool,
    },

    /// Count static texts matching an identifier or label
    Count {
        /// Snapshot file (JSON or YAML)
        snapshot: PathBuf,

        /// Identifier or label to count
        text: String,
    },

    /// Render a wireframe PNG of a snapshot
    Render {
        /// Snapshot file (JSON or YAML)
        snapshot: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "snapshot.png")]
        output: PathBuf,

        /// Font name for captions
        #[arg(long)]
        font: Option<String>,

        /// Font size in pixels
        #[arg(long, default_value = "12")]
        font_size: f32,

        /// Scale factor from points to pixels
        #[arg(long, default_value = "1.0")]
        scale: f64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Tree { snapshot, json } => {
            let tree = Node::load(&snapshot)?;
            debug!(nodes = tree.node_count(), "loaded snapshot");
            if json {
                println!("{}", tree.to_json()?);
            } else {
                print!("{}", tree.describe());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve {
            snapshot,
            query,
            all,
        } => {
            let tree = Node::load(&snapshot)?;
            let query: ElementQuery = query.parse()?;
            let found: Vec<(Vec<usize>, String)> = if all {
                resolve_all(&query, &tree)
                    .into_iter()
                    .map(|(path, node)| (path, node.summary()))
                    .collect()
            } else {
                resolve(&query, &tree)
                    .map(|element| (element.path, element.node.summary()))
                    .into_iter()
                    .collect()
            };
            if found.is_empty() {
                eprintln!("no element matches {query}");
                return Ok(ExitCode::FAILURE);
            }
            for (path, summary) in found {
                println!("{path:?}\t{summary}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Count { snapshot, text } => {
            let tree = Node::load(&snapshot)?;
            let labels = ElementQuery::root().static_text(text);
            println!("{}", count_matches(&labels, &tree));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Render {
            snapshot,
            output,
            font,
            font_size,
            scale,
        } => {
            let tree = Node::load(&snapshot)?;
            let mut screenshot = Screenshot::new(tree).scale(scale);
            if let Some(font_name) = font {
                screenshot = screenshot.font(&font_name, font_size);
            }
            screenshot.save(&output)?;
            eprintln!("Screenshot saved to: {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}
