//! JSON output renderer.
//!
//! Outputs an array of `{"kind", "path", "old"?, "new"?}` objects.

use crate::models::change::Change;
use crate::output::{OutputRenderer, RenderError};

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, changes: &[Change]) -> Result<String, RenderError> {
        Ok(serde_json::to_string_pretty(changes)?)
    }
}
