//! File descriptor limit detection for capping walker threads (Unix).

/// Estimated descriptors held per walker thread: one open directory handle plus a file the
/// parser workers may have open at the same time.
pub const FDS_PER_WALKER: usize = 4;

/// Fraction of the process FD limit the walker may claim; parsers and the HTTP client need the rest.
const FD_LIMIT_FRACTION: f64 = 0.5;

/// Returns the soft limit for max open file descriptors, or `None` if unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Walker threads that fit in half the FD limit. `None` when there is no limit to respect.
pub fn max_walkers_by_fd_limit() -> Option<usize> {
    let limit = max_open_fds()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    Some((usable / FDS_PER_WALKER).max(1))
}
