//! Env materialization: turn scanned variable names into concrete values.
//!
//! Live mode reads the current environment; static mode assigns
//! deterministic placeholders so two dumps of the same source tree are
//! identical. Explicit overrides (usually from a dotenv file) always win.

pub mod dotenv;

use indexmap::IndexMap;

use crate::env::Env;
use crate::models::Mode;

pub use dotenv::{DotenvError, load_dotenv, parse_dotenv};

/// Final name → value mapping. `None` means unset.
pub type EnvMapping = IndexMap<String, Option<String>>;

/// A predicate on a variable name.
#[derive(Debug, Clone, Copy)]
enum Rule {
    EndsWith(&'static str),
    Contains(&'static str),
    Always,
}

impl Rule {
    fn matches(self, name: &str) -> bool {
        match self {
            Rule::EndsWith(suffix) => name.ends_with(suffix),
            Rule::Contains(needle) => name.contains(needle),
            Rule::Always => true,
        }
    }
}

/// Placeholder rules, evaluated top to bottom; the first match wins.
///
/// `_IDS` sits before `_ID` and the order must not change: dumps are
/// compared byte-for-byte across runs.
const PLACEHOLDER_RULES: &[(Rule, &str)] = &[
    (Rule::EndsWith("_PORT"), "1234"),
    (Rule::EndsWith("_POOL_SIZE"), "3"),
    (Rule::EndsWith("_IDS"), "321,123"),
    (Rule::EndsWith("_ID"), "123"),
    (Rule::Contains("ENABLE"), "true"),
    (Rule::Always, "LOREMIPSUM"),
];

/// Deterministic placeholder for a variable name.
pub fn placeholder(name: &str) -> &'static str {
    PLACEHOLDER_RULES
        .iter()
        .find(|(rule, _)| rule.matches(name))
        .map_or("LOREMIPSUM", |(_, value)| *value)
}

/// Compute the value of every scanned name, then layer `overrides` on top.
///
/// Override entries replace same-named entries unconditionally (a `None`
/// included). Override names that were not scanned are appended in the
/// order they appear in `overrides`.
pub fn materialize(
    names: &[String],
    mode: Mode,
    overrides: Option<&IndexMap<String, String>>,
    env: &Env,
) -> EnvMapping {
    let mut mapping: EnvMapping = names
        .iter()
        .map(|name| {
            let value = match mode {
                Mode::Live => env.var(name).ok(),
                Mode::Static => Some(placeholder(name).to_string()),
            };
            (name.clone(), value)
        })
        .collect();

    if let Some(overrides) = overrides {
        for (name, value) in overrides {
            mapping.insert(name.clone(), Some(value.clone()));
        }
    }

    tracing::debug!(
        ?mode,
        names = names.len(),
        overrides = overrides.map_or(0, IndexMap::len),
        "materialized environment"
    );
    mapping
}

/// Format a mapping as `NAME=value` lines; unset names are marked.
pub fn format_mapping(mapping: &EnvMapping) -> String {
    let mut out = String::new();
    for (name, value) in mapping {
        match value {
            Some(value) => out.push_str(&format!("{name}={value}\n")),
            None => out.push_str(&format!("{name}= # unset\n")),
        }
    }
    out
}
