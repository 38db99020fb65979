//! Batch sender: single consumer of the record queue. Flushes every `batch_size` records and once
//! more for the remainder after the queue is closed and drained.
//!
//! A failed bulk insert drops that batch (logged and counted); there is no retry.

use crossbeam_channel::Receiver;
use log::{debug, info, warn};

use crate::Record;
use crate::engine::zinc::{IndexStore, IndexStoreError};

use super::cancel::{CancelToken, QueueStop};

/// Sender counters, read after the sender returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SendReport {
    pub received: usize,
    pub batches_sent: usize,
    pub records_sent: usize,
    pub send_errors: usize,
    pub records_lost: usize,
    /// Stopped by the cancel token rather than by queue close.
    pub cancelled: bool,
}

/// Parameters for [`run_batch_sender`].
pub struct BatchSenderParams<'a> {
    pub store: &'a dyn IndexStore,
    pub batch_size: usize,
    pub cancel: &'a CancelToken,
    /// Called with the record count after each successful bulk insert.
    pub on_batch_progress: Option<Box<dyn Fn(usize) + Send>>,
}

/// Serialize records as NDJSON: one JSON object per line, newline after each.
pub fn encode_batch(batch: &[Record]) -> Result<String, serde_json::Error> {
    let mut out = String::with_capacity(batch.len() * 256);
    for record in batch {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Encode and insert one batch, updating `report`. Never fails the run.
fn flush_batch(batch: &[Record], params: &BatchSenderParams<'_>, report: &mut SendReport) {
    let n = batch.len();
    let result = encode_batch(batch)
        .map_err(IndexStoreError::from)
        .and_then(|payload| params.store.bulk_insert(payload));
    match result {
        Ok(()) => {
            report.batches_sent += 1;
            report.records_sent += n;
            debug!("sender: batch {} ({} records) inserted", report.batches_sent, n);
            if let Some(cb) = params.on_batch_progress.as_deref() {
                cb(n);
            }
        }
        Err(err) => {
            warn!("bulk insert of {} records failed, batch dropped: {}", n, err);
            report.send_errors += 1;
            report.records_lost += n;
        }
    }
}

/// Drain `record_rx` into batches until it is closed and empty (or the run is cancelled),
/// then flush the partial batch. On cancel, records already received are still flushed.
pub fn run_batch_sender(record_rx: Receiver<Record>, params: BatchSenderParams<'_>) -> SendReport {
    let batch_size = params.batch_size.max(1);
    let mut report = SendReport::default();
    let mut batch = Vec::with_capacity(batch_size);

    loop {
        match params.cancel.recv(&record_rx) {
            Ok(record) => {
                report.received += 1;
                batch.push(record);
                if batch.len() >= batch_size {
                    flush_batch(&batch, &params, &mut report);
                    batch.clear();
                }
            }
            Err(QueueStop::Closed) => break,
            Err(QueueStop::Cancelled) => {
                info!("Ingest cancelled; flushing {} records already received...", batch.len());
                report.cancelled = true;
                break;
            }
        }
    }

    if !batch.is_empty() {
        flush_batch(&batch, &params, &mut report);
    }
    report
}
