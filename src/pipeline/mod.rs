//! Pipeline components: queues, walk, parse, dedup, batch send, and the orchestrator that
//! sequences their shutdown.

pub mod cancel;
pub mod context;
pub mod dedup;
pub mod orchestrator;
pub mod parse;
pub mod sender;
pub mod summary;
pub mod walk;

pub use cancel::{CancelToken, QueueStop};
pub use context::{
    PipelineChannels, PipelineContext, PipelineHandles, PipelineTuning, create_pipeline_channels,
};
pub use dedup::Deduplicator;
pub use orchestrator::{feed_records, run_pipeline, shutdown_pipeline_handles};
pub use parse::{ParseReport, ParserShared, spawn_parser_workers};
pub use sender::{BatchSenderParams, SendReport, encode_batch, run_batch_sender};
pub use summary::{log_run_summary, summarize};
pub use walk::{WalkOutcome, WalkReport, run_walk, run_walk_loop, spawn_walk_thread};
