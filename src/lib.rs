//! Mailfeed: concurrent ingestion of a mail directory tree into a full-text index

pub mod engine;
pub mod feed;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::path::Path;
use std::sync::Arc;

use engine::{HeaderBodyDecoder, IndexStore, MessageDecoder};
use pipeline::CancelToken;

/// Result alias used by public mailfeed API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: ingest every message under `root` into `store` with `opts`.
///
/// Uses the default header/body decoder and a fresh cancel token. The index must already exist
/// (see [`IndexStore::create_index_if_absent`]). Failures on individual files or batches are
/// counted in the returned [`RunSummary`], not returned as errors.
pub fn feed_dir(root: &Path, opts: &FeedOpts, store: &dyn IndexStore) -> Result<RunSummary> {
    feed_dir_with(
        root,
        opts,
        Arc::new(HeaderBodyDecoder),
        store,
        &CancelToken::new(),
    )
}

/// Like [`feed_dir`], with a caller-supplied decoder and cancel token.
///
/// ```ignore
/// let cancel = mailfeed::pipeline::CancelToken::new();
/// let stopper = cancel.clone();
/// ctrlc::set_handler(move || stopper.cancel())?;
/// let summary = mailfeed::feed_dir_with(root, &opts, Arc::new(MyDecoder), &store, &cancel)?;
/// ```
pub fn feed_dir_with(
    root: &Path,
    opts: &FeedOpts,
    decoder: Arc<dyn MessageDecoder>,
    store: &dyn IndexStore,
    cancel: &CancelToken,
) -> Result<RunSummary> {
    let opts = Opts::from(opts);
    let config_str = format!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    debug!("{}", config_str);
    pipeline::feed_records(root, &opts, decoder, store, cancel, None)
}
