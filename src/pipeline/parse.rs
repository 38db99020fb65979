use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::decoder::MessageDecoder;
use crate::{Record, Task};

use super::cancel::CancelToken;
use super::dedup::Deduplicator;

/// Per-worker counters, returned through the worker's join handle and merged by the orchestrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Tasks taken off the path queue.
    pub attempted: usize,
    pub parsed: usize,
    pub decode_errors: usize,
    /// Parsed records dropped by the deduplicator.
    pub duplicates: usize,
}

impl ParseReport {
    pub fn merge(&mut self, other: &ParseReport) {
        self.attempted += other.attempted;
        self.parsed += other.parsed;
        self.decode_errors += other.decode_errors;
        self.duplicates += other.duplicates;
    }
}

/// Everything a parser worker needs besides its queue ends.
#[derive(Clone)]
pub struct ParserShared {
    pub decoder: Arc<dyn MessageDecoder>,
    pub dedup: Option<Arc<Deduplicator>>,
    pub cancel: CancelToken,
}

/// Single parser worker: take paths until the path queue is closed and drained, decode each,
/// forward new records. A failed decode is counted and skipped; it never stops the worker.
fn parser_worker_loop(
    path_rx: Receiver<Task>,
    record_tx: Sender<Record>,
    shared: ParserShared,
) -> ParseReport {
    let mut report = ParseReport::default();
    while let Ok(path) = shared.cancel.recv(&path_rx) {
        report.attempted += 1;
        let record = match shared.decoder.decode(&path) {
            Ok(record) => record,
            Err(err) => {
                warn!("{}", err);
                report.decode_errors += 1;
                continue;
            }
        };
        report.parsed += 1;
        if let Some(dedup) = shared.dedup.as_deref()
            && !dedup.admit(&record)
        {
            debug!("duplicate {:?} key, dropping {}", dedup.kind(), path.display());
            report.duplicates += 1;
            continue;
        }
        if shared.cancel.send(&record_tx, record).is_err() {
            break;
        }
    }
    drop(record_tx);
    report
}

/// Spawn `workers` parser workers. Each holds a clone of `record_tx`; the caller must drop its own
/// sender after this so the record queue closes when the last worker exits.
pub fn spawn_parser_workers(
    path_rx: Receiver<Task>,
    record_tx: &Sender<Record>,
    shared: &ParserShared,
    workers: usize,
) -> Vec<JoinHandle<ParseReport>> {
    (0..workers.max(1))
        .map(|_| {
            let path_rx = path_rx.clone();
            let record_tx = record_tx.clone();
            let shared = shared.clone();
            thread::spawn(move || parser_worker_loop(path_rx, record_tx, shared))
        })
        .collect()
}
