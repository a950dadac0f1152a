//! Validation result types shared by the structural and semantic passes.

pub mod semantic;

use crate::document::{Document, KIND_AGENT};
use std::collections::BTreeMap;
use std::fmt;

/// How serious a single validation finding is.
///
/// Warnings are reported but do not fail a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding, anchored at a dotted field path.
#[derive(Debug, Clone)]
pub struct Issue {
    /// Dotted path into the document, e.g. `model.provider` or
    /// `graph.0.stage`. Empty for document-level findings.
    pub path: String,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "field '{}': {}", self.path, self.message)
        }
    }
}

/// Aggregated findings from one validation pass over one document.
///
/// Created fresh per call and never mutated after being returned. Every
/// check contributes its findings; nothing short-circuits, so a single pass
/// surfaces every problem at once.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    issues: Vec<Issue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(Issue {
            path: path.into(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    pub fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(Issue {
            path: path.into(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }

    /// True when no error-severity issue was recorded.
    pub fn passed(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }
}

/// Read-only snapshot of the sibling documents used for cross-document
/// semantic checks.
///
/// Assembled once by the pipeline driver from the structurally valid
/// documents, then shared immutably. Semantic validation is a pure function
/// of (document, snapshot).
#[derive(Debug, Clone, Default)]
pub struct ContextSnapshot {
    agent_ids: BTreeMap<String, usize>,
}

impl ContextSnapshot {
    /// Build a snapshot from structurally valid documents.
    ///
    /// Identifier comparison is case-sensitive.
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut agent_ids = BTreeMap::new();
        for doc in documents {
            if doc.kind == KIND_AGENT {
                *agent_ids.entry(doc.id()).or_insert(0) += 1;
            }
        }
        Self { agent_ids }
    }

    pub fn has_agent(&self, id: &str) -> bool {
        self.agent_ids.contains_key(id)
    }

    /// How many sibling agents declare this identifier.
    pub fn agent_count(&self, id: &str) -> usize {
        self.agent_ids.get(id).copied().unwrap_or(0)
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = &str> {
        self.agent_ids.keys().map(String::as_str)
    }
}

/// Proof that a document passed both validation passes.
///
/// Only the pipeline (and in-crate tests) can construct this, so rendering
/// an unvalidated document is unrepresentable rather than a runtime check.
#[derive(Debug, Clone, Copy)]
pub struct Validated<'a> {
    document: &'a Document,
}

impl<'a> Validated<'a> {
    pub(crate) fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }
}
