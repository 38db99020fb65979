//! First-seen-wins filter shared by all parser workers.

use dashmap::DashSet;

use crate::{DedupKey, DedupKeyKind, Record};

/// Concurrent set of keys already forwarded in this run. Dropped with the run.
pub struct Deduplicator {
    kind: DedupKeyKind,
    seen: DashSet<DedupKey>,
}

impl Deduplicator {
    pub fn new(kind: DedupKeyKind) -> Self {
        Self {
            kind,
            seen: DashSet::new(),
        }
    }

    pub fn kind(&self) -> DedupKeyKind {
        self.kind
    }

    /// True if `record` is the first with its key. Check and insert happen under one shard lock,
    /// so two workers racing on the same key cannot both get `true`.
    pub fn admit(&self, record: &Record) -> bool {
        self.seen.insert(record.dedup_key(self.kind))
    }

    /// Distinct keys admitted so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
