//! CLI ingestion: wires Ctrl+C and the progress counter around the pipeline.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::engine::decoder::HeaderBodyDecoder;
use crate::engine::progress::{create_counter, progress_callback};
use crate::engine::zinc::IndexStore;
use crate::pipeline::{CancelToken, feed_records, log_run_summary};
use crate::{Opts, RunSummary};

/// Ingest every message under `root` into `store`, logging the summary.
/// Ctrl+C cancels the run; records already received by the sender are still flushed, and the
/// call returns an error so the process exits non-zero.
pub fn ingest_dir(root: &Path, opts: &Opts, store: &dyn IndexStore) -> Result<RunSummary> {
    let cancel = CancelToken::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || {
        cancel_handler.cancel();
    })
    .context("set Ctrl+C handler")?;

    let bar = opts.verbose.then(|| create_counter("Sending"));
    let on_batch = progress_callback(&bar);

    let summary = feed_records(
        root,
        opts,
        Arc::new(HeaderBodyDecoder),
        store,
        &cancel,
        on_batch,
    )?;
    if bar.is_some() {
        eprintln!();
    }
    log_run_summary(&summary);

    if summary.cancelled {
        return Err(anyhow::anyhow!(
            "Ingest cancelled by user; {} records were sent before stopping",
            summary.records_sent
        ));
    }
    Ok(summary)
}
