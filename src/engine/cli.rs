//! CLI command handlers: `ingest` runs the pipeline against the index; `search` queries it once;
//! `serve` exposes search over HTTP.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::engine::arg_parser::{Cli, Commands, IngestArgs, SearchArgs, ServeArgs};
use crate::engine::server::{SharedStore, serve};
use crate::engine::zinc::{IndexStatus, IndexStore, ZincClient};
use crate::feed::ingest_dir;
use crate::utils::config::{
    ConnectionConfig, DEFAULT_INDEX_NAME, EnvKeys, env_usize, load_dotenv,
};
use crate::utils::feed_toml::{apply_file_to_opts, load_feed_toml};
use crate::utils::setup_logging;
use crate::{Opts, RunSummary};

/// Dispatch the parsed command line. `ingest` sets up logging itself once `.mailfeed.toml` is read.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let verbose = cli.verbose.unwrap_or(false);
    match &cli.command {
        Commands::Ingest(args) => handle_ingest(args, verbose).map(|_| ()),
        Commands::Search(args) => {
            setup_logging(verbose);
            handle_search(args)
        }
        Commands::Serve(args) => {
            setup_logging(verbose);
            handle_serve(args)
        }
    }
}

/// Root from the positional arg, then `MAILFEED_ROOT`, then the current directory.
fn resolve_root(args: &IngestArgs) -> PathBuf {
    args.dir
        .clone()
        .or_else(|| {
            std::env::var(EnvKeys::ROOT)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Flags override everything read from file and environment.
fn apply_args_to_opts(args: &IngestArgs, opts: &mut Opts) {
    if args.workers.is_some() {
        opts.workers = args.workers;
    }
    if args.walkers.is_some() {
        opts.walkers = args.walkers;
    }
    if let Some(n) = args.batch_size {
        opts.batch_size = n;
    }
    if let Some(n) = args.queue_cap {
        opts.queue_cap = n;
    }
    if args.no_dedup {
        opts.dedup = false;
    }
    if let Some(k) = args.dedup_key {
        opts.dedup_key = k;
    }
    if let Some(ref name) = args.index {
        opts.index = name.clone();
    }
    if !args.exclude.is_empty() {
        opts.exclude = args.exclude.clone();
    }
}

/// Layer defaults, `.mailfeed.toml` in `root`, environment, then flags.
pub fn build_opts(args: &IngestArgs, root: &Path, verbose: bool) -> Result<Opts> {
    let mut opts = Opts::default();
    if let Some(file) = load_feed_toml(root) {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(n) = env_usize(EnvKeys::WORKERS)? {
        opts.workers = Some(n);
    }
    if let Some(n) = env_usize(EnvKeys::BATCH_SIZE)? {
        opts.batch_size = n;
    }
    apply_args_to_opts(args, &mut opts);
    opts.verbose |= verbose;
    Ok(opts)
}

/// Create the index if needed, then run the pipeline over the root.
pub fn handle_ingest(args: &IngestArgs, verbose: bool) -> Result<RunSummary> {
    load_dotenv(args.dir.as_deref());
    let root = resolve_root(args);
    let opts = build_opts(args, &root, verbose)?;
    setup_logging(opts.verbose);
    let config_str = format!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    debug!("{}", config_str);

    // Connection settings are required before any stage starts.
    let conn = ConnectionConfig::from_env()?;
    let client = ZincClient::new(conn, &opts.index)?;
    match client
        .create_index_if_absent()
        .with_context(|| format!("create index {}", opts.index))?
    {
        IndexStatus::Created => info!("Created index {}", opts.index),
        IndexStatus::AlreadyExists => debug!("Using existing index {}", opts.index),
    }
    ingest_dir(&root, &opts, &client)
}

/// Search the index and print the response JSON.
pub fn handle_search(args: &SearchArgs) -> Result<()> {
    let term = args.term.trim();
    if term.is_empty() {
        anyhow::bail!("Search term must not be empty");
    }
    load_dotenv(None);
    let conn = ConnectionConfig::from_env()?;
    let index = args.index.as_deref().unwrap_or(DEFAULT_INDEX_NAME);
    let client = ZincClient::new(conn, index)?;
    let results = client
        .search(term)
        .with_context(|| format!("search {} for {:?}", index, term))?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Serve the search endpoint until Ctrl+C.
pub fn handle_serve(args: &ServeArgs) -> Result<()> {
    load_dotenv(None);
    let conn = ConnectionConfig::from_env()?;
    let index = args.index.as_deref().unwrap_or(DEFAULT_INDEX_NAME);
    // The blocking index client is built and finally dropped outside the async runtime.
    let store: SharedStore = Arc::new(ZincClient::new(conn, index)?);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    let served = runtime.block_on(serve(args.bind, Arc::clone(&store)));
    drop(runtime);
    served
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingest_args(dir: &Path) -> IngestArgs {
        IngestArgs {
            dir: Some(dir.to_path_buf()),
            workers: None,
            walkers: None,
            batch_size: None,
            queue_cap: None,
            no_dedup: false,
            dedup_key: None,
            index: None,
            exclude: Vec::new(),
        }
    }

    #[test]
    fn test_verbose_from_settings_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(".mailfeed.toml"),
            "[settings]\nverbose = true\nbatch_size = 7\n",
        )
        .unwrap();
        let opts = build_opts(&ingest_args(tmp.path()), tmp.path(), false).unwrap();
        assert!(opts.verbose);
        assert_eq!(opts.batch_size, 7);
    }

    #[test]
    fn test_flags_override_settings_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".mailfeed.toml"), "[settings]\nindex = \"file\"\n").unwrap();
        let mut args = ingest_args(tmp.path());
        args.index = Some("flag".to_string());
        args.no_dedup = true;
        let opts = build_opts(&args, tmp.path(), false).unwrap();
        assert_eq!(opts.index, "flag");
        assert!(!opts.dedup);
        assert!(!opts.verbose);
    }
}
