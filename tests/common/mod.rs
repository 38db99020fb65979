//! Shared fixtures: an in-memory index store and message-file helpers.

#![allow(dead_code)]

use mailfeed::engine::{IndexStatus, IndexStore, IndexStoreError};
use mailfeed::{DedupKeyKind, FeedOpts, Record};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Records every bulk payload. Calls listed in `fail_calls` (1-based) return an error instead.
#[derive(Default)]
pub struct MemoryStore {
    payloads: Mutex<Vec<String>>,
    calls: AtomicUsize,
    fail_calls: Vec<usize>,
    fail_search: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_calls: calls.to_vec(),
            ..Self::default()
        }
    }

    pub fn failing_search() -> Self {
        Self {
            fail_search: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }

    /// Record count of each successful bulk insert, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.payloads().iter().map(|p| p.lines().count()).collect()
    }

    pub fn records(&self) -> Vec<Record> {
        self.payloads()
            .iter()
            .flat_map(|p| p.lines().map(str::to_string).collect::<Vec<_>>())
            .map(|line| serde_json::from_str(&line).unwrap())
            .collect()
    }
}

impl IndexStore for MemoryStore {
    fn create_index_if_absent(&self) -> Result<IndexStatus, IndexStoreError> {
        Ok(IndexStatus::AlreadyExists)
    }

    fn bulk_insert(&self, ndjson: String) -> Result<(), IndexStoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_calls.contains(&call) {
            return Err(IndexStoreError::Status {
                op: "bulk insert",
                status: 500,
                body: "simulated failure".to_string(),
            });
        }
        self.payloads.lock().unwrap().push(ndjson);
        Ok(())
    }

    fn search(&self, term: &str) -> Result<Value, IndexStoreError> {
        if self.fail_search {
            return Err(IndexStoreError::Status {
                op: "search",
                status: 502,
                body: "index unavailable".to_string(),
            });
        }
        Ok(json!({ "hits": { "total": { "value": 0 } }, "term": term }))
    }
}

/// Write a minimal valid message with the given date and subject.
pub fn write_message(dir: &Path, name: &str, date: &str, subject: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let text = format!(
        "Message-ID: <{subject}@example.com>\r\n\
         Date: {date}\r\n\
         From: alice@example.com\r\n\
         To: bob@example.com\r\n\
         Subject: {subject}\r\n\
         \r\n\
         Body of {subject}\r\n"
    );
    std::fs::write(&path, text).unwrap();
    path
}

/// A file the decoder must reject.
pub fn write_garbage(dir: &Path, name: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, "this is not a mail message at all\nno headers here\n").unwrap();
    path
}

/// Distinct RFC 2822 date for index `i`.
pub fn unique_date(i: usize) -> String {
    format!(
        "Mon, 1 Jan 2001 {:02}:{:02}:{:02} +0000",
        (i / 3600) % 24,
        (i / 60) % 60,
        i % 60
    )
}

pub fn opts(workers: usize, batch_size: usize, dedup: Option<DedupKeyKind>) -> FeedOpts {
    FeedOpts {
        workers: Some(workers),
        walkers: Some(4),
        batch_size,
        queue_cap: 16,
        dedup,
        exclude: Vec::new(),
    }
}

/// Build `count` messages spread over a nested tree (three levels, fan-out 3). Returns the subjects.
pub fn build_tree(root: &Path, count: usize) -> Vec<String> {
    let mut subjects = Vec::with_capacity(count);
    for i in 0..count {
        let dir = root
            .join(format!("user{}", i % 3))
            .join(format!("folder{}", (i / 3) % 3))
            .join(format!("sub{}", (i / 9) % 2));
        let subject = format!("msg-{i}");
        write_message(&dir, &format!("{i}."), &unique_date(i), &subject);
        subjects.push(subject);
    }
    subjects
}
