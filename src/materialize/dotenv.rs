//! Dotenv override files: one `NAME=value` pair per line.
//!
//! Blank lines, `#` comments and lines without `=` are skipped. Values are
//! taken verbatim (no quote stripping or interpolation). A repeated name
//! overwrites the earlier value.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

/// Errors while loading a dotenv file.
#[derive(Error, Debug)]
pub enum DotenvError {
    #[error("failed to read dotenv file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Parse dotenv text into an ordered name → value mapping.
pub fn parse_dotenv(content: &str) -> IndexMap<String, String> {
    let mut vars = IndexMap::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        vars.insert(name.to_string(), value.trim_end_matches('\r').to_string());
    }

    vars
}

/// Read and parse a dotenv file.
pub fn load_dotenv(path: &Path) -> Result<IndexMap<String, String>, DotenvError> {
    let content = std::fs::read_to_string(path).map_err(|e| DotenvError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    let vars = parse_dotenv(&content);
    tracing::debug!(path = %path.display(), vars = vars.len(), "loaded dotenv overrides");
    Ok(vars)
}
