//! # EdiHub CLI (`edihub`)
//!
//! ## Usage
//!
//! ```bash
//! edihub --config ./config/edihub.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `edihub init` | Create the SQLite database and run schema migrations |
//! | `edihub import <file>` | Bulk-load tasks and contracts from JSON |
//! | `edihub search "<query>"` | Similarity search over tasks and contracts |
//! | `edihub serve` | Start the HTTP API server |
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr so
//! command output on stdout stays clean.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use edihub::search::SearchArgs;
use edihub::{config, import, migrate, search, server};

/// EdiHub: task and contract management with similarity search.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/edihub.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "edihub",
    about = "EdiHub: task and contract management with lexical similarity search",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/edihub.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file with the `tarefas` and `contratos`
    /// tables. Safe to run repeatedly.
    Init,

    /// Import tasks and contracts from a JSON file.
    ///
    /// The file holds `{"tarefas": [...], "contratos": [...]}` with the same
    /// payloads the HTTP create endpoints accept.
    Import {
        file: PathBuf,
    },

    /// Search tasks and contracts by lexical similarity.
    Search {
        query: String,

        /// Entity kind: `all`, `tarefas` or `contratos`.
        #[arg(long)]
        tipo: Option<String>,

        /// Maximum number of results (defaults to `[search].default_limit`).
        #[arg(long)]
        limite: Option<usize>,

        /// Minimum score in [0, 1] (defaults to `[search].default_threshold`).
        #[arg(long)]
        threshold: Option<f64>,

        /// Restrict task candidates to this project.
        #[arg(long)]
        projeto: Option<String>,

        /// Restrict task candidates to this column.
        #[arg(long)]
        coluna: Option<String>,
    },

    /// Start the HTTP API server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { file } => {
            import::run_import(&cfg, &file).await?;
        }
        Commands::Search {
            query,
            tipo,
            limite,
            threshold,
            projeto,
            coluna,
        } => {
            let args = SearchArgs {
                query,
                tipo,
                limite,
                threshold,
                projeto,
                coluna,
            };
            search::run_search(&cfg, &args).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
