//! Configuration sources: producers of the live configuration tree.
//!
//! [`TomlDirSource`] reads every `*.toml` file directly under a directory
//! (sorted by name), deep-merges them and resolves env references:
//!
//! ```toml
//! [repo]
//! port = { env = "DB_PORT", default = 5432 }
//! host = { env = "DB_HOST" }   # null when unset
//! ```
//!
//! Each top-level table is a component. Subdirectories are not read, so
//! per-environment overlays can live in nested folders without being merged
//! in; the variable scanner still walks them. Non-finite floats (`nan`,
//! `inf`) are rejected because a dump cannot hold them.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;
use toml::{Table, Value};

use crate::env::Env;
use crate::models::{Node, Path as KeyPath, Snapshot};

/// Errors while loading configuration sources.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("config directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("failed to read config source {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config source {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("top-level key `{0}` is not a component table")]
    NotAComponent(String),

    #[error("{path} is {value}; only finite numbers can be dumped")]
    NonFiniteFloat { path: String, value: f64 },
}

/// Something that can evaluate the application's configuration.
pub trait ConfigSource {
    /// Produce a snapshot, resolving environment lookups through `env`.
    fn load(&self, env: &Env) -> Result<Snapshot, SourceError>;
}

/// A directory of TOML configuration files.
#[derive(Debug, Clone)]
pub struct TomlDirSource {
    dir: PathBuf,
}

impl TomlDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// TOML files directly under the directory, sorted by file name.
    fn files(&self) -> Result<Vec<PathBuf>, SourceError> {
        if !self.dir.is_dir() {
            return Err(SourceError::DirNotFound(self.dir.clone()));
        }
        let read_err = |source| SourceError::ReadFile {
            path: self.dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl ConfigSource for TomlDirSource {
    fn load(&self, env: &Env) -> Result<Snapshot, SourceError> {
        let mut merged = Table::new();
        for path in self.files()? {
            let table = load_table(&path)?;
            tracing::debug!(path = %path.display(), keys = table.len(), "loaded config source");
            merged = deep_merge(merged, table);
        }

        let mut snapshot = Snapshot::new();
        for (name, value) in merged {
            let Value::Table(settings) = value else {
                return Err(SourceError::NotAComponent(name));
            };
            let component = KeyPath::root().key(&name);
            let settings = settings
                .into_iter()
                .map(|(key, value)| {
                    let node = to_node(value, env, &component.key(&key))?;
                    Ok((key, node))
                })
                .collect::<Result<IndexMap<String, Node>, SourceError>>()?;
            snapshot.insert_component(name, settings);
        }
        Ok(snapshot)
    }
}

fn load_table(path: &Path) -> Result<Table, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|e| SourceError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    content.parse::<Table>().map_err(|e| SourceError::ParseFile {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a table for the same key, recurse.
/// Otherwise, `overlay`'s value wins.
fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        let merged = match (base.get_mut(&key), overlay_val) {
            (Some(Value::Table(base_tbl)), Value::Table(overlay_tbl)) => {
                Value::Table(deep_merge(std::mem::take(base_tbl), overlay_tbl))
            }
            (_, overlay_val) => overlay_val,
        };
        // existing keys keep their position
        base.insert(key, merged);
    }
    base
}

/// Convert a TOML value, resolving `{ env = "NAME", default = ... }` tables.
///
/// `path` locates `value` and only labels errors.
fn to_node(value: Value, env: &Env, path: &KeyPath) -> Result<Node, SourceError> {
    let node = match value {
        Value::String(s) => Node::String(s),
        Value::Integer(i) => Node::Integer(i),
        Value::Float(f) if !f.is_finite() => {
            return Err(SourceError::NonFiniteFloat {
                path: path.to_string(),
                value: f,
            });
        }
        Value::Float(f) => Node::Float(f),
        Value::Boolean(b) => Node::Bool(b),
        Value::Datetime(dt) => Node::String(dt.to_string()),
        Value::Array(items) => Node::Sequence(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| to_node(v, env, &path.index(i)))
                .collect::<Result<_, _>>()?,
        ),
        Value::Table(mut table) => match env_reference(&table) {
            Some(name) => match env.var(&name) {
                Ok(value) => Node::String(value),
                Err(_) => match table.remove("default") {
                    Some(default) => to_node(default, env, path)?,
                    None => Node::Null,
                },
            },
            None => Node::Mapping(
                table
                    .into_iter()
                    .map(|(k, v)| {
                        let node = to_node(v, env, &path.key(&k))?;
                        Ok((k, node))
                    })
                    .collect::<Result<_, SourceError>>()?,
            ),
        },
    };
    Ok(node)
}

/// The variable name if `table` is exactly `{ env = "..." }` plus an optional `default`.
fn env_reference(table: &Table) -> Option<String> {
    let name = table.get("env")?.as_str()?;
    let extra = table.keys().any(|k| k != "env" && k != "default");
    (!extra).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(toml_str: &str) -> Table {
        toml_str.parse::<Table>().unwrap()
    }

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn merge_nested_tables_recurse() {
        let base = table("[db]\nurl = \"postgres://old\"\npool = 5\n");
        let overlay = table("[db]\npool = 20\n");
        let merged = deep_merge(base, overlay);
        let db = merged["db"].as_table().unwrap();
        assert_eq!(db["url"].as_str().unwrap(), "postgres://old");
        assert_eq!(db["pool"].as_integer().unwrap(), 20);
    }

    #[test]
    fn merge_overlay_scalar_replaces_table() {
        let merged = deep_merge(table("[db]\nurl = \"x\"\n"), table("db = \"flat\"\n"));
        assert_eq!(merged["db"].as_str().unwrap(), "flat");
    }

    #[test]
    fn merge_keeps_first_seen_order() {
        let merged = deep_merge(
            table("[web]\nport = 1\n[repo]\npool = 1\n"),
            table("[extra]\nx = 1\n[web]\nport = 2\n"),
        );
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["web", "repo", "extra"]);
    }

    #[test]
    fn env_reference_detection() {
        assert_eq!(env_reference(&table("env = \"DB_HOST\"")), Some("DB_HOST".into()));
        assert_eq!(
            env_reference(&table("env = \"DB_PORT\"\ndefault = 5432")),
            Some("DB_PORT".into())
        );
        assert_eq!(env_reference(&table("env = \"X\"\nother = 1")), None);
        assert_eq!(env_reference(&table("env = 3")), None);
        assert_eq!(env_reference(&table("name = \"x\"")), None);
    }

    #[test]
    fn to_node_resolves_env_and_defaults() {
        let env = Env::mock([("DB_HOST", "db.internal")]);
        let node = to_node(
            Value::Table(table(
                "host = { env = \"DB_HOST\" }\nport = { env = \"DB_PORT\", default = 5432 }\nuser = { env = \"DB_USER\" }\n",
            )),
            &env,
            &KeyPath::root().key("repo"),
        )
        .unwrap();
        assert_eq!(
            node,
            Node::mapping([
                ("host", Node::from("db.internal")),
                ("port", Node::from(5432)),
                ("user", Node::Null),
            ])
        );
    }

    #[test]
    fn load_merges_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "10-base.toml", "[web]\nport = 4000\nhost = \"0.0.0.0\"\n");
        write(dir.path(), "20-prod.toml", "[web]\nport = 443\n\n[repo]\npool = 10\n");
        write(dir.path(), "README.md", "ignored");

        let snapshot = TomlDirSource::new(dir.path())
            .load(&Env::mock(Vec::<(&str, &str)>::new()))
            .unwrap();

        let web = snapshot.component("web").unwrap();
        assert_eq!(web["port"], Node::Integer(443));
        assert_eq!(web["host"], Node::from("0.0.0.0"));
        assert_eq!(snapshot.component("repo").unwrap()["pool"], Node::Integer(10));
    }

    #[test]
    fn load_uses_overlay_values() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "runtime.toml", "[repo]\nport = { env = \"DB_PORT\" }\n");

        let overlay: IndexMap<String, Option<String>> =
            [("DB_PORT".to_string(), Some("1234".to_string()))].into_iter().collect();
        let env = Env::mock(Vec::<(&str, &str)>::new()).overlay(&overlay);

        let snapshot = TomlDirSource::new(dir.path()).load(&env).unwrap();
        assert_eq!(snapshot.component("repo").unwrap()["port"], Node::from("1234"));
    }

    #[test]
    fn load_rejects_top_level_scalar() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.toml", "loose = 1\n");
        let err = TomlDirSource::new(dir.path())
            .load(&Env::mock(Vec::<(&str, &str)>::new()))
            .unwrap_err();
        assert!(matches!(err, SourceError::NotAComponent(ref k) if k == "loose"));
    }

    #[test]
    fn load_rejects_non_finite_floats_with_their_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "limits.toml", "[m]\nratio = 0.5\nbounds = [1.0, inf]\n");
        let err = TomlDirSource::new(dir.path())
            .load(&Env::mock(Vec::<(&str, &str)>::new()))
            .unwrap_err();
        assert!(
            matches!(err, SourceError::NonFiniteFloat { ref path, .. } if path == "m.bounds[1]"),
            "got: {err}"
        );

        write(dir.path(), "limits.toml", "[m]\nnested = { ratio = nan }\n");
        let err = TomlDirSource::new(dir.path())
            .load(&Env::mock(Vec::<(&str, &str)>::new()))
            .unwrap_err();
        assert!(err.to_string().contains("m.nested.ratio"), "got: {err}");
    }

    #[test]
    fn load_ignores_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "base.toml", "[web]\nport = 4000\n");
        std::fs::create_dir(dir.path().join("prod")).unwrap();
        write(&dir.path().join("prod"), "web.toml", "[web]\nport = 443\n");

        let snapshot = TomlDirSource::new(dir.path())
            .load(&Env::mock(Vec::<(&str, &str)>::new()))
            .unwrap();
        assert_eq!(snapshot.component("web").unwrap()["port"], Node::Integer(4000));
    }

    #[test]
    fn load_missing_dir() {
        let err = TomlDirSource::new("/tmp/confdiff_no_config_dir")
            .load(&Env::mock(Vec::<(&str, &str)>::new()))
            .unwrap_err();
        assert!(matches!(err, SourceError::DirNotFound(_)));
    }

    #[test]
    fn load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.toml", "not valid {{ toml");
        let err = TomlDirSource::new(dir.path())
            .load(&Env::mock(Vec::<(&str, &str)>::new()))
            .unwrap_err();
        assert!(err.to_string().contains("parse"), "got: {err}");
    }
}
