//! In-memory model for specification documents.
//!
//! A document is a parsed YAML tree plus the kind discriminator used to
//! select its schema. Mapping and sequence order is preserved by
//! `serde_yaml::Mapping`, so validation errors and rendered output follow
//! the author's field order.

use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Kind discriminator for agent specifications.
pub const KIND_AGENT: &str = "agent";
/// Kind discriminator for recipe specifications.
pub const KIND_RECIPE: &str = "recipe";

/// A parsed specification document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Declared or inferred kind. Unknown kinds are kept verbatim so the
    /// structural validator can report them instead of crashing.
    pub kind: String,

    /// Path the document was loaded from.
    pub source: PathBuf,

    /// The parsed YAML tree.
    pub body: Value,
}

impl Document {
    pub fn new(kind: impl Into<String>, source: impl Into<PathBuf>, body: Value) -> Self {
        Self {
            kind: kind.into(),
            source: source.into(),
            body,
        }
    }

    /// The document's `id` field, falling back to the file stem when the
    /// field is missing or not a string.
    pub fn id(&self) -> String {
        self.body
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(&self.source))
    }

    /// A string field looked up at the top level of the document.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.body.get(field).and_then(Value::as_str)
    }

    /// The parent directory name, used as the agent's domain in listings.
    pub fn domain(&self) -> String {
        self.source
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string()
    }

    /// Top-level `tags` entries, empty when the field is absent.
    pub fn tags(&self) -> Vec<String> {
        self.body
            .get("tags")
            .and_then(Value::as_sequence)
            .map(|seq| {
                seq.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Determine a document's kind.
///
/// Precedence: an explicit top-level `kind` field, then the directory hint
/// from the loader (`agents/` vs `recipes/`), then presence of a `graph`
/// field. Shape inference alone is a last resort; an explicit discriminator
/// always wins so a document is never silently misclassified.
pub fn determine_kind(body: &Value, hint: Option<&str>) -> String {
    if let Some(kind) = body.get("kind").and_then(Value::as_str) {
        return kind.to_string();
    }
    if let Some(hint) = hint {
        return hint.to_string();
    }
    if body.get("graph").is_some() {
        KIND_RECIPE.to_string()
    } else {
        KIND_AGENT.to_string()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}
