//! Shared types used across all modules.
//!
//! This module defines the snapshot tree and the change records produced
//! when two snapshots are compared. Other modules import from here rather
//! than reaching into each other's internals.

pub mod change;
pub mod snapshot;

pub use change::{Change, ChangeKind, Path, Segment, Summary};
pub use snapshot::{Node, Snapshot};

/// How scanned environment variables get their values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Read the current value from the environment.
    #[default]
    Live,
    /// Use deterministic placeholders for reproducible dumps.
    Static,
}
