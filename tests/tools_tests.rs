use mailfeed::engine::{
    check_root_and_canonicalize, glob_match, is_os_hidden_file, is_root_reserved_file,
    should_include_in_walk,
};
use mailfeed::pipeline::{CancelToken, Deduplicator, QueueStop};
use mailfeed::{DedupKeyKind, Record, RunSummary};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

// --- glob_match ---

#[test]
fn test_glob_match_literal() {
    assert!(glob_match("inbox", "inbox"));
    assert!(!glob_match("inbox", "inbo"));
    assert!(!glob_match("inbox", "inboxes"));
}

#[test]
fn test_glob_match_star() {
    assert!(glob_match("*.bak", "old.bak"));
    assert!(glob_match("*.bak", ".bak"));
    assert!(!glob_match("*.bak", "old.bak1"));
    assert!(glob_match("*", ""));
    assert!(glob_match("a**b", "ab"));
    assert!(glob_match("*/drafts/*", "/mail/drafts/1."));
}

#[test]
fn test_glob_match_question() {
    assert!(glob_match("?.", "1."));
    assert!(!glob_match("?.", "12."));
    assert!(!glob_match("?", ""));
}

#[test]
fn test_glob_match_unicode() {
    assert!(glob_match("caf?", "café"));
}

// --- should_include_in_walk ---

#[test]
fn test_include_skips_root_and_os_junk() {
    let root = PathBuf::from("/mail");
    assert!(!should_include_in_walk(&root, &root, &[]));
    assert!(!should_include_in_walk(&root.join(".DS_Store"), &root, &[]));
    assert!(!should_include_in_walk(&root.join("._1."), &root, &[]));
    assert!(should_include_in_walk(&root.join("1."), &root, &[]));
}

#[test]
fn test_include_exclude_by_name_or_path() {
    let root = PathBuf::from("/mail");
    let exclude = vec!["deleted_items".to_string(), "*/sent/*".to_string()];
    assert!(!should_include_in_walk(&root.join("deleted_items"), &root, &exclude));
    assert!(!should_include_in_walk(&root.join("allen-p/sent/1."), &root, &exclude));
    assert!(should_include_in_walk(&root.join("allen-p/inbox/1."), &root, &exclude));
}

#[test]
fn test_reserved_files_only_at_root() {
    let root = PathBuf::from("/mail");
    assert!(is_root_reserved_file(&root.join(".env"), &root));
    assert!(is_root_reserved_file(&root.join(".mailfeed.toml"), &root));
    assert!(!is_root_reserved_file(&root.join("inbox/.env"), &root));
    assert!(!should_include_in_walk(&root.join(".env"), &root, &[]));
    assert!(should_include_in_walk(&root.join("inbox/.mailfeed.toml"), &root, &[]));
}

#[test]
fn test_os_hidden_files() {
    assert!(is_os_hidden_file(&PathBuf::from("/x/Thumbs.db")));
    assert!(is_os_hidden_file(&PathBuf::from("/x/.Trash-1000")));
    assert!(!is_os_hidden_file(&PathBuf::from("/x/inbox")));
}

#[test]
fn test_check_root() {
    let tmp = tempfile::TempDir::new().unwrap();
    assert!(check_root_and_canonicalize(tmp.path()).is_ok());
    let file = tmp.path().join("f");
    std::fs::write(&file, "x").unwrap();
    assert!(check_root_and_canonicalize(&file).is_err());
    assert!(check_root_and_canonicalize(&tmp.path().join("missing")).is_err());
}

// --- CancelToken ---

#[test]
fn test_cancel_token_queue_ops() {
    let token = CancelToken::new();
    let (tx, rx) = crossbeam_channel::bounded::<u32>(1);
    assert_eq!(token.send(&tx, 1), Ok(()));
    assert_eq!(token.recv(&rx), Ok(1));

    drop(tx);
    assert_eq!(token.recv(&rx), Err(QueueStop::Closed));

    token.cancel();
    assert!(token.is_cancelled());
    let (tx2, rx2) = crossbeam_channel::bounded::<u32>(1);
    assert_eq!(token.send(&tx2, 2), Err(QueueStop::Cancelled));
    assert_eq!(token.recv(&rx2), Err(QueueStop::Cancelled));
}

#[test]
fn test_cancel_wakes_blocked_receiver() {
    let token = CancelToken::new();
    let (_tx, rx) = crossbeam_channel::bounded::<u32>(1);
    let waiter = {
        let token = token.clone();
        thread::spawn(move || token.recv(&rx))
    };
    thread::sleep(std::time::Duration::from_millis(50));
    token.cancel();
    assert_eq!(waiter.join().unwrap(), Err(QueueStop::Cancelled));
}

#[test]
fn test_cancel_wakes_blocked_sender() {
    let token = CancelToken::new();
    let (tx, _rx) = crossbeam_channel::bounded::<u32>(0);
    let waiter = {
        let token = token.clone();
        thread::spawn(move || token.send(&tx, 7))
    };
    thread::sleep(std::time::Duration::from_millis(50));
    token.cancel();
    token.cancel();
    assert_eq!(waiter.join().unwrap(), Err(QueueStop::Cancelled));
}

// --- Deduplicator ---

#[test]
fn test_dedup_admits_each_key_once_across_threads() {
    let dedup = Arc::new(Deduplicator::new(DedupKeyKind::Date));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dedup = Arc::clone(&dedup);
            thread::spawn(move || {
                (0..100)
                    .filter(|i| {
                        dedup.admit(&Record {
                            message_id: None,
                            date: format!("d{}", i % 25),
                            from: String::new(),
                            to: String::new(),
                            subject: String::new(),
                            body: String::new(),
                        })
                    })
                    .count()
            })
        })
        .collect();
    let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(admitted, 25);
    assert_eq!(dedup.len(), 25);
}

// --- RunSummary ---

#[test]
fn test_summary_balance() {
    let s = RunSummary {
        discovered: 10,
        parsed: 9,
        decode_errors: 1,
        duplicates: 2,
        records_sent: 5,
        records_lost: 2,
        send_errors: 1,
        ..Default::default()
    };
    assert!(s.is_balanced());
    assert_eq!(s.failures(), 2);
}
