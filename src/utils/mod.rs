pub mod config;
pub mod fd_limit;
pub(crate) mod feed_toml;
pub mod logger;

pub use config::*;
pub use fd_limit::{FDS_PER_WALKER, max_open_fds, max_walkers_by_fd_limit};
pub use logger::{Colors, setup_logging};
