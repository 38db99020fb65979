//! Pipeline context and tuning: queues between stages and the settings each stage runs with.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crate::utils::config::{DEFAULT_WORKERS, WorkerThreadLimits};
use crate::{Opts, Record, Task};

use super::cancel::CancelToken;
use super::parse::ParseReport;
use super::walk::WalkReport;

/// Thread counts and queue sizes for one run. Every value is at least 1.
#[derive(Clone, Debug)]
pub struct PipelineTuning {
    pub walkers: usize,
    pub workers: usize,
    pub batch_size: usize,
    /// Capacity of the path and record queues.
    pub queue_cap: usize,
}

impl PipelineTuning {
    pub fn from_opts(opts: &Opts) -> Self {
        let walkers = opts
            .walkers
            .unwrap_or_else(|| WorkerThreadLimits::current().walker_threads());
        Self {
            walkers: walkers.max(1),
            workers: opts.workers.unwrap_or(DEFAULT_WORKERS).max(1),
            batch_size: opts.batch_size.max(1),
            queue_cap: opts.queue_cap.max(1),
        }
    }
}

/// Shared, read-only context for the walker threads.
pub struct PipelineContext {
    pub root: PathBuf,
    pub exclude: Vec<String>,
    pub cancel: CancelToken,
}

/// Queues for the pipeline. The walker gets `path_tx`; parser workers get `path_rx` and `record_tx`;
/// the batch sender gets `record_rx`.
pub struct PipelineChannels {
    pub path_tx: Sender<Task>,
    pub path_rx: Receiver<Task>,
    pub record_tx: Sender<Record>,
    pub record_rx: Receiver<Record>,
    pub ctx: PipelineContext,
}

pub fn create_pipeline_channels(
    root: &Path,
    opts: &Opts,
    tuning: &PipelineTuning,
    cancel: &CancelToken,
) -> PipelineChannels {
    let (path_tx, path_rx) = bounded::<Task>(tuning.queue_cap);
    let (record_tx, record_rx) = bounded::<Record>(tuning.queue_cap);

    let ctx = PipelineContext {
        root: root.to_path_buf(),
        exclude: opts.exclude.clone(),
        cancel: cancel.clone(),
    };

    PipelineChannels {
        path_tx,
        path_rx,
        record_tx,
        record_rx,
        ctx,
    }
}

/// Handles returned by [`run_pipeline`](super::run_pipeline): the sender stage drains `record_rx`,
/// then the orchestrator joins the walk and worker threads.
pub struct PipelineHandles {
    pub record_rx: Receiver<Record>,
    pub walk_handle: JoinHandle<WalkReport>,
    pub worker_handles: Vec<JoinHandle<ParseReport>>,
}
