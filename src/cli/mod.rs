//! Command-line interface definitions and dispatch.

mod cache;
mod config;
mod generate;
mod history;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Step-wise article drafting with a cached LLM backend.
#[derive(Parser)]
#[command(name = "paperweave", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the drafting wizard and generate an article.
    Generate {
        /// Bypass the response cache for this run.
        #[arg(long)]
        no_cache: bool,
        /// Write the generated article to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Reuse the saved draft as-is, without interactive prompts.
        #[arg(long)]
        from_draft: bool,
    },
    /// Inspect and manage past generations.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Inspect and manage the response cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Show or initialize configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List past generations, newest first.
    List {
        /// Maximum rows to show.
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// Show every entry, ignoring the limit.
        #[arg(long)]
        all: bool,
        /// List recorded prompts instead of responses.
        #[arg(long)]
        prompts: bool,
    },
    /// Print one generation in full.
    Show {
        /// Cache key (as printed by `history list`).
        key: String,
        /// Show the recorded prompt instead of the response.
        #[arg(long)]
        prompt: bool,
    },
    /// Copy a past generation back into the draft as the current article.
    Restore {
        /// Cache key of the generation to restore.
        key: String,
    },
    /// Delete one generation (response and recorded prompt).
    Delete {
        /// Cache key of the generation to delete.
        key: String,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Print entry count and disk usage.
    Stats,
    /// Enforce the configured entry bound now.
    Evict,
    /// Delete every cache entry.
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration as TOML.
    Show,
    /// Write a default config file if none exists.
    Init,
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            no_cache,
            output,
            from_draft,
        } => generate::cmd_generate(no_cache, output, from_draft).await,
        Command::History { action } => history::cmd_history(action).await,
        Command::Cache { action } => cache::cmd_cache(action).await,
        Command::Config { action } => config::cmd_config(action),
    }
}
