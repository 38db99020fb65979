//! Public and internal types for the mailfeed API and pipeline.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::config::{DEFAULT_BATCH_SIZE, DEFAULT_INDEX_NAME, DEFAULT_QUEUE_CAP};

/// A discovered file path awaiting decode. Consumed by exactly one parser worker.
pub type Task = PathBuf;

/// One decoded message, ready for indexing.
///
/// Field names on the wire match the index mapping (`messageId`, `date`, `from`, `to`, `subject`, `body`).
/// `date` is already normalized by the decoder; nothing downstream mutates a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(
        rename = "messageId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<String>,
    pub date: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Record {
    /// Derive the membership key used by the deduplicator.
    pub fn dedup_key(&self, kind: DedupKeyKind) -> DedupKey {
        match kind {
            DedupKeyKind::Date => DedupKey(format!("date:{}", self.date)),
            DedupKeyKind::MessageId => match self.message_id.as_deref() {
                Some(id) => DedupKey(format!("id:{id}")),
                None => DedupKey(format!("date:{}", self.date)),
            },
        }
    }
}

/// Which record field the deduplicator keys on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupKeyKind {
    /// Normalized `Date` header.
    #[default]
    Date,
    /// `Message-ID` header; messages without one fall back to their date.
    MessageId,
}

/// Membership key derived from a [`Record`]. Lives only for one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DedupKey(pub String);

/// Post-run counters, aggregated by the orchestrator after every stage has joined.
///
/// For a run that was not cancelled:
/// `discovered == parsed + decode_errors` and `parsed == duplicates + records_sent + records_lost`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Regular files emitted by the walker.
    pub discovered: usize,
    /// Directories scanned (including the root).
    pub directories: usize,
    /// Directories or entries that could not be read; their subtrees were abandoned.
    pub traversal_errors: usize,
    /// Tasks decoded into records.
    pub parsed: usize,
    /// Tasks the decoder rejected.
    pub decode_errors: usize,
    /// Records dropped because their dedup key was already seen.
    pub duplicates: usize,
    /// Successful bulk-insert calls.
    pub batches_sent: usize,
    /// Records inside successful bulk-insert calls.
    pub records_sent: usize,
    /// Failed bulk-insert calls.
    pub send_errors: usize,
    /// Records inside failed bulk-insert calls (dropped, never retried).
    pub records_lost: usize,
    /// True when the run was stopped by its cancel token.
    pub cancelled: bool,
}

impl RunSummary {
    /// Total non-fatal failures across all stages.
    pub fn failures(&self) -> usize {
        self.traversal_errors + self.decode_errors + self.send_errors
    }

    /// True when every discovered task and every parsed record is accounted for.
    pub fn is_balanced(&self) -> bool {
        self.discovered == self.parsed + self.decode_errors
            && self.parsed == self.duplicates + self.records_sent + self.records_lost
    }
}

/// Lib-only options for [`feed_dir`](crate::feed_dir). Connection settings are not here; the caller
/// passes an [`IndexStore`](crate::engine::IndexStore).
#[derive(Clone, Debug)]
pub struct FeedOpts {
    /// Parser worker count. When None, uses the default pool size.
    pub workers: Option<usize>,
    /// Walker thread count. When None, derived from available threads and the FD limit.
    pub walkers: Option<usize>,
    /// Records per bulk-insert call.
    pub batch_size: usize,
    /// Capacity of the path and record queues.
    pub queue_cap: usize,
    /// Deduplicate on this key; None disables the stage.
    pub dedup: Option<DedupKeyKind>,
    /// Exclude patterns (glob syntax, matched on file name or full path).
    pub exclude: Vec<String>,
}

impl Default for FeedOpts {
    fn default() -> Self {
        Self {
            workers: None,
            walkers: None,
            batch_size: DEFAULT_BATCH_SIZE,
            queue_cap: DEFAULT_QUEUE_CAP,
            dedup: Some(DedupKeyKind::Date),
            exclude: Vec::new(),
        }
    }
}

impl From<&FeedOpts> for Opts {
    fn from(o: &FeedOpts) -> Self {
        Opts {
            workers: o.workers,
            walkers: o.walkers,
            batch_size: o.batch_size,
            queue_cap: o.queue_cap,
            dedup: o.dedup.is_some(),
            dedup_key: o.dedup.unwrap_or_default(),
            exclude: o.exclude.clone(),
            index: DEFAULT_INDEX_NAME.to_string(),
            verbose: false,
        }
    }
}

/// Full options (CLI). Use [`FeedOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Parser worker count override.
    pub workers: Option<usize>,
    /// Walker thread count override.
    pub walkers: Option<usize>,
    /// Records per bulk-insert call.
    pub batch_size: usize,
    /// Capacity of the path and record queues.
    pub queue_cap: usize,
    /// Run the dedup stage.
    pub dedup: bool,
    /// Key for the dedup stage.
    pub dedup_key: DedupKeyKind,
    /// Exclude patterns (glob syntax).
    pub exclude: Vec<String>,
    /// Target index name.
    pub index: String,
    /// Show progress counter and debug logs.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Opts::from(&FeedOpts::default())
    }
}
