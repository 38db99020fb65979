use anyhow::Result;
use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::engine::decoder::MessageDecoder;
use crate::engine::tools::check_root_and_canonicalize;
use crate::engine::zinc::IndexStore;
use crate::pipeline;
use crate::{Opts, RunSummary};

use super::cancel::CancelToken;
use super::dedup::Deduplicator;
use super::parse::{ParseReport, ParserShared};
use super::sender::{BatchSenderParams, run_batch_sender};
use super::summary::summarize;

/// Start the walk and parse stages. The caller drains `record_rx`, then joins via
/// [`shutdown_pipeline_handles`].
///
/// Queue ownership enforces the staged shutdown: the walk coordinator owns the only `path_tx`
/// and drops it after joining every walker; each parser worker owns a `record_tx` clone, and
/// ours is dropped here, so the record queue closes only after the last worker exits.
pub fn run_pipeline(
    root: &Path,
    opts: &Opts,
    tuning: &pipeline::PipelineTuning,
    decoder: Arc<dyn MessageDecoder>,
    cancel: &CancelToken,
) -> pipeline::PipelineHandles {
    let channels = pipeline::create_pipeline_channels(root, opts, tuning, cancel);

    debug!("stage: walking ({} walkers)", tuning.walkers);
    let walk_handle = pipeline::spawn_walk_thread(channels.path_tx, channels.ctx, tuning.walkers);

    let shared = ParserShared {
        decoder,
        dedup: opts
            .dedup
            .then(|| Arc::new(Deduplicator::new(opts.dedup_key))),
        cancel: cancel.clone(),
    };
    debug!("stage: parsing ({} workers)", tuning.workers);
    let worker_handles = pipeline::spawn_parser_workers(
        channels.path_rx,
        &channels.record_tx,
        &shared,
        tuning.workers,
    );

    // Dropping the last sender we hold lets the record queue close once workers exit.
    drop(channels.record_tx);

    pipeline::PipelineHandles {
        record_rx: channels.record_rx,
        walk_handle,
        worker_handles,
    }
}

/// Join the walk coordinator and every parser worker. Call after the record queue is drained.
pub fn shutdown_pipeline_handles(
    walk_handle: JoinHandle<pipeline::WalkReport>,
    worker_handles: Vec<JoinHandle<ParseReport>>,
) -> Result<(pipeline::WalkReport, ParseReport)> {
    let walk = walk_handle
        .join()
        .map_err(|_| anyhow::anyhow!("walk thread panicked"))?;
    let mut parse = ParseReport::default();
    for h in worker_handles {
        let report = h
            .join()
            .map_err(|_| anyhow::anyhow!("parser worker panicked"))?;
        parse.merge(&report);
    }
    Ok((walk, parse))
}

/// Main orchestrator: Walking → Parsing → Sending → Done.
/// Walk → path queue → parser workers (decode + dedup) → record queue → batch sender → index.
pub fn feed_records(
    root: &Path,
    opts: &Opts,
    decoder: Arc<dyn MessageDecoder>,
    store: &dyn IndexStore,
    cancel: &CancelToken,
    on_batch_progress: Option<Box<dyn Fn(usize) + Send>>,
) -> Result<RunSummary> {
    let root = check_root_and_canonicalize(root)?;
    let tuning = pipeline::PipelineTuning::from_opts(opts);
    debug!("tuning: {:?}", tuning);

    let pipeline::PipelineHandles {
        record_rx,
        walk_handle,
        worker_handles,
    } = run_pipeline(&root, opts, &tuning, decoder, cancel);

    debug!("stage: sending (batch size {})", tuning.batch_size);
    let send = run_batch_sender(
        record_rx,
        BatchSenderParams {
            store,
            batch_size: tuning.batch_size,
            cancel,
            on_batch_progress,
        },
    );

    let (walk, parse) = shutdown_pipeline_handles(walk_handle, worker_handles)?;
    debug!("stage: done");

    Ok(summarize(&walk, &parse, &send, cancel.is_cancelled()))
}
