//! Path and filter utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;

/// Check if a file should be excluded based on OS-specific metadata files
pub fn is_os_hidden_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            // macOS
            ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
            // Windows
            "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" | "$RECYCLE.BIN" => true,
            // Linux
            ".directory" => true,
            _ => {
                // macOS resource forks and Linux trash dirs
                name.starts_with("._") || name.starts_with(".Trash-")
            }
        }
    } else {
        false
    }
}

/// Returns true if the walker should emit (file) or descend into (dir) `path`.
pub fn should_include_in_walk(path: &Path, root: &Path, exclude_patterns: &[String]) -> bool {
    if path == root {
        return false;
    }
    if is_os_hidden_file(path) || is_root_reserved_file(path, root) {
        return false;
    }
    if exclude_patterns.is_empty() {
        return true;
    }
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return true,
    };
    let path_str = path.to_str().unwrap_or("");
    !exclude_patterns
        .iter()
        .any(|pattern| glob_match(pattern, name) || glob_match(pattern, path_str))
}

/// The settings or dotenv file sitting directly in `root`. Same-named files deeper down are mail.
pub fn is_root_reserved_file(path: &Path, root: &Path) -> bool {
    path.parent() == Some(root)
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| PackagePaths::get().root_reserved_files().contains(&name))
}

/// Glob matching on chars: `*` matches any run (including empty), `?` matches one char.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_match_chars(&pattern, &text)
}

fn glob_match_chars(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => {
            // Collapse runs of '*'; a trailing star matches everything.
            let rest = trim_leading_stars(rest);
            if rest.is_empty() {
                return true;
            }
            (0..=text.len()).any(|i| glob_match_chars(rest, &text[i..]))
        }
        Some(('?', rest)) => !text.is_empty() && glob_match_chars(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && glob_match_chars(rest, &text[1..]),
    }
}

fn trim_leading_stars(p: &[char]) -> &[char] {
    let n = p.iter().take_while(|c| **c == '*').count();
    &p[n..]
}

/// Canonicalize the scan root and require it to be a readable directory.
pub fn check_root_and_canonicalize(path: &Path) -> Result<PathBuf> {
    let root = path
        .canonicalize()
        .with_context(|| format!("canonicalize root {}", path.display()))?;
    let meta = std::fs::metadata(&root).context("read root metadata")?;
    if !meta.is_dir() {
        anyhow::bail!("Root {} is not a directory", root.display());
    }
    Ok(root)
}
