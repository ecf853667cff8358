//! Dump files: one snapshot per file, stored as pretty-printed JSON.
//!
//! Key order, sequence order, `null`, non-ASCII text, exact float bits and
//! the integer/float distinction all survive a write/read round trip. Writes
//! go through a temporary file in the destination directory that is renamed
//! into place, so a failed write never leaves a truncated dump behind.
//!
//! The JSON reader refuses documents nested deeper than [`MAX_DEPTH`]
//! containers, so the writer refuses them too.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::Snapshot;

/// Deepest container nesting a dump may hold, the top-level mapping included.
pub const MAX_DEPTH: usize = 127;

/// Errors while writing or reading a dump.
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("failed to read dump {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write dump {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("snapshot is nested {depth} levels deep; dumps allow at most {max}")]
    TooDeep { depth: usize, max: usize },

    #[error("could not parse dump {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Serialize a snapshot to dump text.
pub fn to_string(snapshot: &Snapshot) -> Result<String, DumpError> {
    let depth = snapshot.depth();
    if depth > MAX_DEPTH {
        return Err(DumpError::TooDeep {
            depth,
            max: MAX_DEPTH,
        });
    }
    let mut text = serde_json::to_string_pretty(snapshot).map_err(DumpError::Serialize)?;
    text.push('\n');
    Ok(text)
}

/// Parse dump text. `origin` only labels errors.
pub fn from_str(text: &str, origin: &Path) -> Result<Snapshot, DumpError> {
    serde_json::from_str(text).map_err(|e| DumpError::Parse {
        path: origin.to_path_buf(),
        source: e,
    })
}

/// Write `snapshot` to `path`, replacing any existing file atomically.
///
/// Missing parent directories are created.
pub fn write_dump(snapshot: &Snapshot, path: &Path) -> Result<(), DumpError> {
    let text = to_string(snapshot)?;
    let write_err = |source: std::io::Error| DumpError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(text.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    tracing::info!(path = %path.display(), components = snapshot.len(), "dump written");
    Ok(())
}

/// Read a dump written by [`write_dump`] (or equivalent JSON).
pub fn read_dump(path: &Path) -> Result<Snapshot, DumpError> {
    let text = std::fs::read_to_string(path).map_err(|e| DumpError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    let snapshot = from_str(&text, path)?;
    tracing::debug!(path = %path.display(), components = snapshot.len(), "dump read");
    Ok(snapshot)
}

/// Default dump file name: `config_dump_<env>_<YYYYMMDDHHMMSS>.json`.
pub fn default_dump_name(env_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}.{}",
        crate::constants::DUMP_PREFIX,
        env_name,
        now.format(crate::constants::DUMP_TIMESTAMP_FORMAT),
        crate::constants::DUMP_EXTENSION,
    )
}
