//! Environment variable scanner.
//!
//! Walks a directory of configuration sources and collects every
//! double-quoted uppercase identifier (`"DB_HOST"`, `"API_KEY"`). This is a
//! textual heuristic: string literals that merely look like variable names
//! are picked up as well, and that is accepted.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use walkdir::WalkDir;

/// Quoted token: an uppercase letter followed by one or more of `[A-Z0-9_]`.
static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([A-Z][A-Z0-9_]+)""#).expect("valid env var pattern"));

/// Errors from the variable scanner.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("config directory not found: {0}")]
    RootNotFound(PathBuf),

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Scan `root` recursively and return the sorted, deduplicated variable names.
///
/// Only files whose extension is listed in `extensions` are read. Any walk
/// or read failure aborts the whole scan.
pub fn scan_env_vars(root: &Path, extensions: &[String]) -> Result<Vec<String>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }

    let mut names = BTreeSet::new();
    let mut files = 0usize;

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| ScanError::Walk {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }

        let content = std::fs::read_to_string(entry.path()).map_err(|e| ScanError::ReadFile {
            path: entry.path().to_path_buf(),
            source: e,
        })?;
        files += 1;
        names.extend(extract_env_vars(&content));
    }

    tracing::debug!(root = %root.display(), files, names = names.len(), "scanned config sources");
    Ok(names.into_iter().collect())
}

/// Extract every quoted uppercase identifier from raw text, in order of appearance.
pub fn extract_env_vars(content: &str) -> impl Iterator<Item = String> + '_ {
    ENV_VAR_PATTERN
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
}
