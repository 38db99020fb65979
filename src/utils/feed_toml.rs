//! Load `.mailfeed.toml` from the scanned root (CLI only). Lib callers inject config via FeedOpts.

use serde::Deserialize;
use std::path::Path;

use crate::utils::config::PackagePaths;
use crate::{DedupKeyKind, Opts};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FeedToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    workers: Option<usize>,
    walkers: Option<usize>,
    batch_size: Option<usize>,
    queue_cap: Option<usize>,
    index: Option<String>,
    dedup: Option<bool>,
    dedup_key: Option<DedupKeyKind>,
    exclude: Option<Vec<String>>,
    verbose: Option<bool>,
}

/// Load `.mailfeed.toml` from `dir` if present. Returns None if missing, unreadable, or malformed (logged).
pub(crate) fn load_feed_toml(dir: &Path) -> Option<FeedToml> {
    let path = dir.join(PackagePaths::get().settings_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_feed_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_feed_toml(s: &str) -> Result<FeedToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before env and CLI.
pub(crate) fn apply_file_to_opts(file: &FeedToml, opts: &mut Opts) {
    let sec = &file.settings;
    if let Some(n) = sec.workers {
        opts.workers = Some(n);
    }
    if let Some(n) = sec.walkers {
        opts.walkers = Some(n);
    }
    apply_file_opt!(sec, opts, batch_size => batch_size);
    apply_file_opt!(sec, opts, queue_cap => queue_cap);
    apply_file_opt!(sec, opts, index => index);
    apply_file_opt!(sec, opts, dedup => dedup);
    apply_file_opt!(sec, opts, dedup_key => dedup_key);
    apply_file_opt!(sec, opts, exclude => exclude);
    apply_file_opt!(sec, opts, verbose => verbose);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_partial_file() {
        let file = parse_feed_toml(
            r#"
            [settings]
            workers = 4
            batch_size = 250
            dedup_key = "message-id"
            exclude = ["*.bak"]
            "#,
        )
        .unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.workers, Some(4));
        assert_eq!(opts.batch_size, 250);
        assert_eq!(opts.dedup_key, DedupKeyKind::MessageId);
        assert_eq!(opts.exclude, vec!["*.bak".to_string()]);
        assert!(opts.dedup);
        assert_eq!(opts.index, "email");
    }

    #[test]
    fn test_missing_section_is_empty() {
        let file = parse_feed_toml("").unwrap();
        let mut opts = Opts::default();
        let before = opts.clone();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.batch_size, before.batch_size);
        assert_eq!(opts.workers, before.workers);
    }

    #[test]
    fn test_bad_dedup_key_rejected() {
        assert!(parse_feed_toml("[settings]\ndedup_key = \"subject\"\n").is_err());
    }
}
