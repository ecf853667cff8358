//! Change records produced by the structural diff engine.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::snapshot::{Node, is_identifier};

/// One step into a snapshot: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Segment::Key(key) => serializer.serialize_str(key),
            Segment::Index(i) => serializer.serialize_u64(*i as u64),
        }
    }
}

/// Location of a value inside a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path extended by a mapping key.
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(key.to_string()));
        Self(segments)
    }

    /// A new path extended by a sequence index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    /// Build a key-only path, e.g. `["app_a", "timeout"]`.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|k| Segment::Key(k.into())).collect())
    }
}

impl fmt::Display for Path {
    /// `app_a.hosts[1]."weird key"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Index(n) => write!(f, "[{n}]")?,
                Segment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    if is_identifier(key) {
                        f.write_str(key)?;
                    } else {
                        write!(f, "{key:?}")?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// What happened at a path.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    /// Present only in the newer snapshot.
    Added { new: Node },
    /// Present only in the older snapshot.
    Removed { old: Node },
    /// Present in both with different values.
    Changed { old: Node, new: Node },
}

impl ChangeKind {
    /// Lowercase label: `added`, `removed` or `changed`.
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Added { .. } => "added",
            ChangeKind::Removed { .. } => "removed",
            ChangeKind::Changed { .. } => "changed",
        }
    }
}

/// A single diff result entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub path: Path,
    pub kind: ChangeKind,
}

impl Change {
    pub fn added(path: Path, new: Node) -> Self {
        Self {
            path,
            kind: ChangeKind::Added { new },
        }
    }

    pub fn removed(path: Path, old: Node) -> Self {
        Self {
            path,
            kind: ChangeKind::Removed { old },
        }
    }

    pub fn changed(path: Path, old: Node, new: Node) -> Self {
        Self {
            path,
            kind: ChangeKind::Changed { old, new },
        }
    }
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kind", self.kind.label())?;
        map.serialize_entry("path", &self.path)?;
        match &self.kind {
            ChangeKind::Added { new } => map.serialize_entry("new", new)?,
            ChangeKind::Removed { old } => map.serialize_entry("old", old)?,
            ChangeKind::Changed { old, new } => {
                map.serialize_entry("old", old)?;
                map.serialize_entry("new", new)?;
            }
        }
        map.end()
    }
}

/// Counts per change kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

impl Summary {
    /// Compute summary from a list of changes.
    pub fn from_changes(changes: &[Change]) -> Self {
        let mut s = Summary::default();
        for c in changes {
            s.total += 1;
            match c.kind {
                ChangeKind::Added { .. } => s.added += 1,
                ChangeKind::Removed { .. } => s.removed += 1,
                ChangeKind::Changed { .. } => s.changed += 1,
            }
        }
        s
    }
}
