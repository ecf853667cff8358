//! Terminal renderer: one line per change, then a summary.
//!
//! ```text
//! ~ changed  app_a.timeout: 30 -> 60
//! + added    app_b: {enabled: true}
//! 2 changes: 1 added, 0 removed, 1 changed
//! ```
//!
//! With color on, tokens get one of three treatments: symbolic (cyan),
//! text (green) or numeric (yellow). Punctuation is never styled.

use colored::Colorize;

use crate::models::change::{Change, ChangeKind, Path, Segment, Summary};
use crate::models::snapshot::{Node, Snapshot, is_identifier};
use crate::output::{OutputRenderer, RenderError};

/// Terminal output renderer.
pub struct TerminalRenderer {
    pub color: bool,
}

impl TerminalRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

#[derive(Debug, Clone, Copy)]
enum Style {
    Symbolic,
    Text,
    Numeric,
}

impl OutputRenderer for TerminalRenderer {
    fn render(&self, changes: &[Change]) -> Result<String, RenderError> {
        if changes.is_empty() {
            return Ok("No differences found.\n".to_string());
        }

        let mut output = String::new();
        for change in changes {
            let path = self.path(&change.path);
            let line = match &change.kind {
                ChangeKind::Added { new } => {
                    format!("+ {} {path}: {}", self.label(&change.kind), self.value(new))
                }
                ChangeKind::Removed { old } => {
                    format!("- {} {path}: {}", self.label(&change.kind), self.value(old))
                }
                ChangeKind::Changed { old, new } => format!(
                    "~ {} {path}: {} -> {}",
                    self.label(&change.kind),
                    self.value(old),
                    self.value(new)
                ),
            };
            output.push_str(&line);
            output.push('\n');
        }

        let summary = Summary::from_changes(changes);
        output.push_str(&format!(
            "{} {}: {} added, {} removed, {} changed\n",
            summary.total,
            if summary.total == 1 { "change" } else { "changes" },
            summary.added,
            summary.removed,
            summary.changed,
        ));
        Ok(output)
    }
}

impl TerminalRenderer {
    /// Render a whole snapshot: a `component:` header per component, then
    /// one indented `key: value` line per setting.
    pub fn render_snapshot(&self, snapshot: &Snapshot) -> String {
        let mut output = String::new();
        for (name, settings) in snapshot.as_map() {
            output.push_str(&format!("{}:\n", self.key(name)));
            if let Some(settings) = settings.as_mapping() {
                for (key, value) in settings {
                    output.push_str(&format!("  {}: {}\n", self.key(key), self.value(value)));
                }
            }
        }
        output
    }

    fn paint(&self, style: Style, token: &str) -> String {
        if !self.color {
            return token.to_string();
        }
        match style {
            Style::Symbolic => token.cyan().to_string(),
            Style::Text => token.green().to_string(),
            Style::Numeric => token.yellow().to_string(),
        }
    }

    /// Kind label padded to a fixed column; padding stays outside the styling.
    fn label(&self, kind: &ChangeKind) -> String {
        let label = kind.label();
        let pad = " ".repeat("removed".len() + 1 - label.len());
        format!("{}{pad}", self.paint(Style::Symbolic, label))
    }

    fn key(&self, key: &str) -> String {
        if is_identifier(key) {
            self.paint(Style::Symbolic, key)
        } else {
            self.paint(Style::Text, &quote(key))
        }
    }

    fn path(&self, path: &Path) -> String {
        let mut out = String::new();
        for (i, segment) in path.segments().iter().enumerate() {
            match segment {
                Segment::Index(n) => {
                    out.push_str(&format!("[{}]", self.paint(Style::Numeric, &n.to_string())));
                }
                Segment::Key(key) => {
                    if i > 0 {
                        out.push('.');
                    }
                    out.push_str(&self.key(key));
                }
            }
        }
        out
    }

    fn value(&self, node: &Node) -> String {
        match node {
            Node::Null => self.paint(Style::Symbolic, "null"),
            Node::Bool(b) => self.paint(Style::Symbolic, &b.to_string()),
            Node::Integer(i) => self.paint(Style::Numeric, &i.to_string()),
            Node::Float(f) => self.paint(Style::Numeric, &format_float(*f)),
            Node::String(s) => self.paint(Style::Text, &quote(s)),
            Node::Sequence(items) => {
                let items: Vec<String> = items.iter().map(|item| self.value(item)).collect();
                format!("[{}]", items.join(", "))
            }
            Node::Mapping(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", self.key(k), self.value(v)))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{text:?}"))
}

/// `Display` for floats, keeping a trailing `.0` on whole numbers.
fn format_float(f: f64) -> String {
    let text = f.to_string();
    if f.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}
