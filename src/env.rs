//! Environment variable abstraction for testability.
//!
//! Production code uses [`Env::real()`] which delegates to [`std::env::var`].
//! Tests use [`Env::mock()`] backed by a `HashMap`. Materialized values are
//! applied with [`Env::overlay()`], which layers them over the base lookup
//! instead of calling [`std::env::set_var`].

use std::collections::HashMap;

/// Environment variable reader.
///
/// Wraps lookups so that production code hits `std::env` while tests
/// can supply a controlled set of values.
#[derive(Clone, Debug, Default)]
pub struct Env {
    base: Option<HashMap<String, String>>,
    overlay: HashMap<String, String>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self::default()
    }

    /// Create an `Env` backed by explicit key-value pairs.
    #[cfg(test)]
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            base: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            overlay: HashMap::new(),
        }
    }

    /// Return a copy of this `Env` with `vars` layered on top.
    ///
    /// `None` values are skipped: an unset variable stays whatever the
    /// base lookup says it is.
    pub fn overlay<'a>(&self, vars: impl IntoIterator<Item = (&'a String, &'a Option<String>)>) -> Self {
        let mut layered = self.clone();
        for (name, value) in vars {
            if let Some(value) = value {
                layered.overlay.insert(name.clone(), value.clone());
            }
        }
        layered
    }

    /// Look up an environment variable by name.
    pub fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        if let Some(value) = self.overlay.get(name) {
            return Ok(value.clone());
        }
        match &self.base {
            Some(map) => map.get(name).cloned().ok_or(std::env::VarError::NotPresent),
            None => std::env::var(name),
        }
    }

    /// Returns `true` if the variable is present.
    pub fn is_set(&self, name: &str) -> bool {
        self.var(name).is_ok()
    }
}
