//! Tool configuration loading and layering.
//!
//! Handles `.confdiff.toml` loading, environment variable overrides,
//! and the defaults CLI flags fall back to.

pub mod loader;

pub use loader::{Config, ConfigError, DumpConfig, RenderConfig, ScanConfig};
