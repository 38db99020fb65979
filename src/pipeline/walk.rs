//! Directory walk: jwalk's parallel traversal (its own rayon pool, sized by `walkers`) feeds the
//! path queue from a single walk thread.
//!
//! Excluded entries are pruned as each directory is read, so excluded directories are never
//! descended. A directory that cannot be read abandons only its own subtree.

use crossbeam_channel::Sender;
use jwalk::{Parallelism, WalkDir};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::Task;
use crate::engine::tools::should_include_in_walk;

use super::cancel::{CancelToken, QueueStop};
use super::context::PipelineContext;

/// Walk counters, read after the walk has joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Regular files sent on the path queue.
    pub files: usize,
    /// Directories reached, the root included.
    pub directories: usize,
    /// Unreadable directories or entries.
    pub errors: usize,
}

/// One result from a directory walk.
#[derive(Debug)]
pub enum WalkOutcome {
    /// A directory; `error` is set when its children could not be listed.
    Dir { path: PathBuf, error: Option<String> },
    /// A regular file, or a symlink resolving to one.
    File(PathBuf),
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a jwalk result into a [`WalkOutcome`]. Sockets, fifos, and links to anything but a
/// regular file yield `None`.
pub fn to_outcome_jwalk(
    r: Result<jwalk::DirEntry<((), ())>, jwalk::Error>,
) -> Option<WalkOutcome> {
    match r {
        Ok(entry) => {
            let file_type = entry.file_type();
            let path = entry.path();
            if file_type.is_dir() {
                Some(WalkOutcome::Dir {
                    path,
                    error: entry.read_children_error.as_ref().map(|e| e.to_string()),
                })
            } else if file_type.is_file() || (file_type.is_symlink() && is_file_target(&path)) {
                Some(WalkOutcome::File(path))
            } else {
                None
            }
        }
        Err(err) => Some(WalkOutcome::Err {
            msg: err.to_string(),
            path: err.path().map(PathBuf::from),
        }),
    }
}

/// Linked directories are not descended; a link to a regular file is emitted.
fn is_file_target(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

fn jwalk_iter(ctx: &PipelineContext, walkers: usize) -> impl Iterator<Item = WalkOutcome> {
    let root = ctx.root.clone();
    let exclude = ctx.exclude.clone();
    WalkDir::new(&ctx.root)
        .follow_links(false)
        .skip_hidden(false)
        .parallelism(Parallelism::RayonNewPool(walkers.max(1)))
        .process_read_dir(move |_depth, _dir, _state, children| {
            children.retain(|child| match child {
                Ok(entry) => should_include_in_walk(&entry.path(), &root, &exclude),
                Err(_) => true,
            });
        })
        .into_iter()
        .filter_map(to_outcome_jwalk)
}

/// Spawn the walk thread. It owns the only `path_tx`; the path queue closes when it returns.
pub fn spawn_walk_thread(
    path_tx: Sender<Task>,
    ctx: PipelineContext,
    walkers: usize,
) -> JoinHandle<WalkReport> {
    thread::spawn(move || run_walk(path_tx, ctx, walkers))
}

/// Walk `ctx.root` with `walkers` traversal threads, sending every regular file to `path_tx`.
pub fn run_walk(path_tx: Sender<Task>, ctx: PipelineContext, walkers: usize) -> WalkReport {
    let iter = jwalk_iter(&ctx, walkers);
    run_walk_loop(path_tx, &ctx.cancel, iter)
}

/// Consume `iter`: count directories and errors, send files to `path_tx`. Stops early when the
/// run is cancelled or nobody is reading paths any more. Drops `path_tx` before returning.
pub fn run_walk_loop<I>(path_tx: Sender<Task>, cancel: &CancelToken, iter: I) -> WalkReport
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut report = WalkReport::default();
    for outcome in iter {
        if cancel.is_cancelled() {
            break;
        }
        match outcome {
            WalkOutcome::Dir { path, error } => {
                report.directories += 1;
                if let Some(msg) = error {
                    warn!("skipping {}: {}", path.display(), msg);
                    report.errors += 1;
                }
            }
            WalkOutcome::File(path) => match cancel.send(&path_tx, path) {
                Ok(()) => report.files += 1,
                Err(QueueStop::Cancelled) => break,
                Err(QueueStop::Closed) => {
                    warn!("walk: path queue closed early; stopping");
                    break;
                }
            },
            WalkOutcome::Err { msg, path } => {
                match path {
                    Some(p) => warn!("skipping {}: {}", p.display(), msg),
                    None => warn!("walk error: {}", msg),
                }
                report.errors += 1;
            }
        }
    }
    drop(path_tx);
    debug!(
        "walk: done, {} files in {} directories ({} errors)",
        report.files, report.directories, report.errors
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, unbounded};

    fn dir(p: &str) -> WalkOutcome {
        WalkOutcome::Dir {
            path: PathBuf::from(p),
            error: None,
        }
    }

    fn file(p: &str) -> WalkOutcome {
        WalkOutcome::File(PathBuf::from(p))
    }

    #[test]
    fn test_loop_counts_errors_and_keeps_going() {
        let (tx, rx) = unbounded();
        let outcomes = vec![
            dir("/m"),
            file("/m/1."),
            WalkOutcome::Dir {
                path: PathBuf::from("/m/locked"),
                error: Some("permission denied".into()),
            },
            WalkOutcome::Err {
                msg: "gone".into(),
                path: None,
            },
            dir("/m/inbox"),
            file("/m/inbox/2."),
        ];
        let report = run_walk_loop(tx, &CancelToken::new(), outcomes.into_iter());
        assert_eq!(
            report,
            WalkReport {
                files: 2,
                directories: 3,
                errors: 2
            }
        );
        let sent: Vec<_> = rx.iter().collect();
        assert_eq!(sent, vec![PathBuf::from("/m/1."), PathBuf::from("/m/inbox/2.")]);
    }

    #[test]
    fn test_loop_stops_when_cancelled() {
        let (tx, rx) = unbounded();
        let cancel = CancelToken::new();
        cancel.cancel();
        let report = run_walk_loop(tx, &cancel, vec![dir("/m"), file("/m/1.")].into_iter());
        assert_eq!(report, WalkReport::default());
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_loop_stops_when_queue_closed() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let report = run_walk_loop(tx, &CancelToken::new(), vec![file("/a"), file("/b")].into_iter());
        assert_eq!(report.files, 0);
    }
}
