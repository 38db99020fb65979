//! Progress counter for records sent to the index (verbose mode only).

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> ProgressBar {
    let bar = Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " records"
    )));
    refresh_bar(&bar);
    bar
}

/// Force a refresh of the bar (e.g. so the counter shows "0 records" immediately).
pub fn refresh_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.refresh();
    }
}

/// Advance the bar by `n`. Only the sender thread calls this, so the lock is uncontended.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.lock() {
        let _ = pb.update(n);
    }
}

/// Create a progress callback function that advances the bar by `n` on each call.
pub fn progress_callback(bar: &Option<ProgressBar>) -> Option<Box<dyn Fn(usize) + Send>> {
    bar.as_ref().map(|bar| {
        let bar = Arc::clone(bar);
        Box::new(move |n: usize| update_progress_bar(&bar, n)) as Box<dyn Fn(usize) + Send>
    })
}
