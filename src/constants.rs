//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and dump naming so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "confdiff";

/// Crate version, baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.confdiff.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".confdiff.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "confdiff";

/// Default directory holding the application's configuration sources.
pub const DEFAULT_SOURCE_DIR: &str = "config";

/// Environment identifier used in dump names when nothing else is set.
pub const DEFAULT_ENV_NAME: &str = "dev";

/// Prefix of default-named dump files.
pub const DUMP_PREFIX: &str = "config_dump";

/// Extension of dump files.
pub const DUMP_EXTENSION: &str = "json";

/// Condensed UTC timestamp used in dump names (seconds, no separators).
pub const DUMP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_NAME: &str = "CONFDIFF_ENV";
pub const ENV_CONFIG_DIR: &str = "CONFDIFF_CONFIG_DIR";
pub const ENV_COLOR: &str = "CONFDIFF_COLOR";
