//! Output renderers: terminal text and JSON.

pub mod json;
pub mod terminal;

use thiserror::Error;

use crate::models::change::Change;

/// Errors while rendering changes.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("could not encode changes as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trait for rendering diff results to an output format.
pub trait OutputRenderer {
    /// Render changes to a string, preserving their order.
    fn render(&self, changes: &[Change]) -> Result<String, RenderError>;
}
