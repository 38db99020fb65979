use colored::{ColoredString, Colorize};
use env_logger::Builder;
use log::Level;
use std::io::Write;

pub fn setup_logging(verbose: bool) {
    use log::LevelFilter;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // try_init: library callers and tests may already have a logger installed.
    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level) // Our crate: use requested level
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        Level::Error => "ERROR".red(),
                        _ => unreachable!(),
                    };
                    let path = record.target().to_string().white();
                    format!("[{} {} {}] {}", name.cyan(), level_str, path, record.args())
                }
                _ => format!("[{}] {}", name.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}

/// Colors for the run summary.
pub struct Colors;

impl Colors {
    pub const OK: &'static str = "green";
    pub const DROPPED: &'static str = "yellow";
    pub const FAILED: &'static str = "red";

    /// Colorize `text` with a named color; zero counts stay plain so problems stand out.
    pub fn colorize(color: &str, text: &str, count: usize) -> ColoredString {
        if count == 0 {
            return text.normal();
        }
        match color {
            Self::OK => text.green(),
            Self::DROPPED => text.yellow(),
            Self::FAILED => text.red().bold(),
            _ => text.normal(),
        }
    }
}
