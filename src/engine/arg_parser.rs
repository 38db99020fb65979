use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::DedupKeyKind;
use crate::utils::config::DEFAULT_SERVE_ADDR;

/// Bulk-load a tree of message files into a ZincSearch index, or query it.
#[derive(Clone, Parser)]
#[command(name = "mailfeed")]
#[command(about = "Ingest a mail directory tree into ZincSearch; search the index.")]
pub struct Cli {
    /// Verbose output (debug logs and a progress counter).
    #[arg(long, short = 'v', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Walk ROOT, decode every file, and bulk-insert the records. Creates the index if absent.
    Ingest(IngestArgs),
    /// Run a free-text search and print the result JSON.
    Search(SearchArgs),
    /// Serve `GET /search?q=TERM` over HTTP, relaying the index response.
    Serve(ServeArgs),
}

#[derive(Clone, Args)]
pub struct IngestArgs {
    /// Root directory to scan. Default: $MAILFEED_ROOT, else the current directory.
    #[arg(value_name = "ROOT")]
    pub dir: Option<PathBuf>,

    /// Parser worker threads.
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Directory walker threads. Default: derived from CPU count and the FD limit.
    #[arg(long)]
    pub walkers: Option<usize>,

    /// Records per bulk-insert call.
    #[arg(long, short = 'b')]
    pub batch_size: Option<usize>,

    /// Capacity of the path and record queues.
    #[arg(long)]
    pub queue_cap: Option<usize>,

    /// Disable deduplication.
    #[arg(long)]
    pub no_dedup: bool,

    /// Field used to detect duplicate messages.
    #[arg(long, value_enum)]
    pub dedup_key: Option<DedupKeyKind>,

    /// Target index name.
    #[arg(long, short = 'i')]
    pub index: Option<String>,

    /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2 pattern3
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,
}

#[derive(Clone, Args)]
pub struct SearchArgs {
    /// Term to search for.
    #[arg(value_name = "TERM")]
    pub term: String,

    /// Index to search.
    #[arg(long, short = 'i')]
    pub index: Option<String>,
}

#[derive(Clone, Args)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_SERVE_ADDR)]
    pub bind: SocketAddr,

    /// Index to search.
    #[arg(long, short = 'i')]
    pub index: Option<String>,
}
