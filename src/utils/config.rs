//! Application configuration constants and environment-provided connection settings.
//! Tuning and thresholds in one place.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

use crate::utils::fd_limit::max_walkers_by_fd_limit;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    settings_filename: String,
    env_filename: &'static str,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                settings_filename: format!(".{pkg}.toml"),
                env_filename: ".env",
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }

    pub fn env_filename(&self) -> &str {
        self.env_filename
    }

    /// Our own settings and dotenv files. The walker skips them directly under the scan root only.
    pub fn root_reserved_files(&self) -> [&str; 2] {
        [self.settings_filename(), self.env_filename()]
    }
}

// ---- Worker threads ----

/// Parser pool size when not overridden.
pub const DEFAULT_WORKERS: usize = 10;

/// Thread limits for the walker pool.
/// Use [`WorkerThreadLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Minimum walker threads.
    pub floor: usize,
    /// Maximum walker threads; directory reads stop scaling well past this.
    pub walker_max: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_THREADS,
            walker_max: Self::WALKER_MAX_THREADS,
        }
    }
}

impl WorkerThreadLimits {
    pub const FLOOR_THREADS: usize = 2;
    pub const WALKER_MAX_THREADS: usize = 12;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// Walker thread count: available threads clamped to [floor, walker_max], then capped by the FD limit.
    pub fn walker_threads(&self) -> usize {
        let wanted = self.all_threads.clamp(self.floor, self.walker_max);
        match max_walkers_by_fd_limit() {
            Some(cap) => wanted.min(cap).max(1),
            None => wanted,
        }
    }
}

// ---- Queues / batching ----

/// Records per bulk-insert call when not overridden.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Capacity of the bounded path and record queues. Producers block when full.
pub const DEFAULT_QUEUE_CAP: usize = 500;

// ---- Index ----

/// Index name used when none is configured.
pub const DEFAULT_INDEX_NAME: &str = "email";

/// Listen address for the search server.
pub const DEFAULT_SERVE_ADDR: &str = "0.0.0.0:8080";

/// Upper bound on hits requested per search.
pub const SEARCH_MAX_RESULTS: usize = 500;

/// Per-request timeout for the index service (seconds). Bulk payloads can be large.
pub const HTTP_TIMEOUT_SECS: u64 = 120;

// ---- Environment ----

/// Environment variable names read at startup.
pub struct EnvKeys;

impl EnvKeys {
    pub const HOST: &'static str = "SEARCHING_SERVER_ADDRESS";
    pub const PORT: &'static str = "SEARCHING_SERVER_PORT";
    pub const USERNAME: &'static str = "ZINCSEARCH_USERNAME";
    pub const PASSWORD: &'static str = "ZINCSEARCH_PASSWORD";
    pub const ROOT: &'static str = "MAILFEED_ROOT";
    pub const WORKERS: &'static str = "MAILFEED_WORKERS";
    pub const BATCH_SIZE: &'static str = "MAILFEED_BATCH_SIZE";
}

/// Fatal startup configuration problems. Raised before any pipeline stage starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set or empty")]
    MissingEnv(&'static str),

    #[error("{key} has invalid value {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Connection settings for the index service.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ConnectionConfig {
    /// Read connection settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read connection settings through `lookup`. Empty or whitespace-only values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnv(key))
        };
        let host = required(EnvKeys::HOST)?;
        let port_raw = required(EnvKeys::PORT)?;
        let port = port_raw.parse::<u16>().map_err(|_| ConfigError::InvalidEnv {
            key: EnvKeys::PORT,
            value: port_raw.clone(),
        })?;
        Ok(Self {
            host,
            port,
            username: required(EnvKeys::USERNAME)?,
            password: required(EnvKeys::PASSWORD)?,
        })
    }

    /// Base URL of the index service, e.g. `http://localhost:4080`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Parse an optional positive integer from the environment. Unset or empty is `Ok(None)`.
pub fn env_usize(key: &'static str) -> Result<Option<usize>, ConfigError> {
    parse_usize(key, std::env::var(key).ok())
}

pub(crate) fn parse_usize(
    key: &'static str,
    raw: Option<String>,
) -> Result<Option<usize>, ConfigError> {
    match raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value: v }),
    }
}

/// Load `.env` from the current directory, then from `dir` if given. Existing variables win.
pub fn load_dotenv(dir: Option<&Path>) {
    let _ = dotenvy::dotenv();
    if let Some(dir) = dir {
        let env_path = dir.join(PackagePaths::get().env_filename());
        if env_path.is_file() {
            let _ = dotenvy::from_path(&env_path);
        }
    }
}
