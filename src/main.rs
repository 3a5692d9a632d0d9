mod cli;
mod server;
mod tools;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use olivetti::config::OlivettiConfig;
use olivetti::memory::types::{BankKind, Lane};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "olivetti", version, about = "Style and voice memory for creative writing")]
struct Cli {
    /// Path to config.toml (defaults to ~/.olivetti/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (stdio transport unless --sse)
    Serve {
        /// Serve Streamable HTTP on [server] host:port instead of stdio
        #[arg(long)]
        sse: bool,
    },
    /// Add a writing sample to a style bank or voice vault
    Ingest {
        /// narration, dialogue, interiority, or action
        lane: Lane,
        /// Style or voice name
        identity: String,
        /// Sample text (read from --file or stdin when omitted)
        text: Option<String>,
        #[arg(long, default_value = "style")]
        kind: BankKind,
        #[arg(long, short)]
        file: Option<PathBuf>,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Show the exemplars closest to a query
    Recall {
        lane: Lane,
        identity: String,
        query: String,
        #[arg(long, default_value = "style")]
        kind: BankKind,
        /// Number of exemplars (defaults to [retrieval] default_k)
        #[arg(long, short)]
        k: Option<usize>,
    },
    /// List identities that have a bank
    List {
        /// Restrict to one lane
        lane: Option<Lane>,
        #[arg(long, default_value = "style")]
        kind: BankKind,
    },
    /// Delete every sample for one identity in one lane
    Forget {
        lane: Lane,
        identity: String,
        #[arg(long, default_value = "style")]
        kind: BankKind,
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
    /// Print bank statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Check the snapshot and its backups
    Doctor,
    /// Re-encode every stored sample with the configured encoder
    ReEmbed,
    /// Draft a continuation guided by stored exemplars
    Draft {
        /// Draft file (stdin when omitted)
        file: Option<PathBuf>,
        #[arg(long)]
        style: Option<String>,
        #[arg(long)]
        voice: Option<String>,
        #[arg(long, value_enum, default_value = "write")]
        action: cli::draft::DraftAction,
        /// Override lane detection
        #[arg(long)]
        lane: Option<Lane>,
        /// Print the assembled prompt instead of calling the provider
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => OlivettiConfig::load_from(path)?,
        None => OlivettiConfig::load()?,
    };

    // Log to stderr so stdout stays clean for MCP JSON-RPC and command output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { sse } => {
            if sse || config.server.transport == "sse" {
                server::serve_sse(config).await?;
            } else {
                server::serve_stdio(config).await?;
            }
        }
        Command::Ingest {
            lane,
            identity,
            text,
            kind,
            file,
            description,
        } => {
            let text = cli::read_text_input(text, file.as_deref())?;
            cli::ingest::ingest(&config, lane, &identity, kind, &text, description.as_deref())?;
        }
        Command::Recall {
            lane,
            identity,
            query,
            kind,
            k,
        } => {
            let k = k.unwrap_or(config.retrieval.default_k);
            cli::recall::recall(&config, lane, &identity, kind, &query, k)?;
        }
        Command::List { lane, kind } => {
            cli::list::list(&config, lane, kind)?;
        }
        Command::Forget {
            lane,
            identity,
            kind,
            yes,
        } => {
            cli::forget::forget(&config, lane, &identity, kind, yes)?;
        }
        Command::Stats { json } => {
            cli::stats::stats(&config, json)?;
        }
        Command::Doctor => {
            cli::doctor::doctor(&config)?;
        }
        Command::ReEmbed => {
            cli::re_embed::re_embed(&config).await?;
        }
        Command::Draft {
            file,
            style,
            voice,
            action,
            lane,
            dry_run,
        } => {
            let draft = cli::read_text_input(None, file.as_deref())?;
            let request = cli::draft::DraftRequest {
                draft,
                style,
                voice,
                action,
                lane,
            };
            cli::draft::draft(&config, request, dry_run).await?;
        }
    }

    Ok(())
}
