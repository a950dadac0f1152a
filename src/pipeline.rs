//! Batch pipeline: structural validation, semantic validation, rendering.
//!
//! The pipeline never short-circuits. Every document in a batch is taken
//! through every stage it qualifies for, and every requested target is
//! attempted independently, so one broken specification or one failing
//! template never hides the others' results.

use crate::document::Document;
use crate::error::Result;
use crate::render::{renderer, RenderedArtifact, Renderer};
use crate::schema::{structural, SchemaStore};
use crate::validation::{ContextSnapshot, Validated, ValidationResult};
use std::path::PathBuf;

/// Outcome of rendering one document for one target.
#[derive(Debug)]
pub enum RenderOutcome {
    Rendered(RenderedArtifact),
    Failed { target: String, message: String },
}

/// Everything the pipeline determined about one document.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub id: String,
    pub source: PathBuf,
    pub kind: String,
    pub structural: ValidationResult,
    /// Absent when the document never reached the semantic stage.
    pub semantic: Option<ValidationResult>,
    pub renders: Vec<RenderOutcome>,
}

impl DocumentOutcome {
    pub fn is_valid(&self) -> bool {
        self.structural.passed()
            && self.semantic.as_ref().map(ValidationResult::passed).unwrap_or(false)
    }

    pub fn error_count(&self) -> usize {
        self.structural.error_count()
            + self.semantic.as_ref().map(ValidationResult::error_count).unwrap_or(0)
    }
}

pub struct Pipeline {
    schemas: SchemaStore,
    semantic: crate::validation::semantic::SemanticValidator,
    renderer: Renderer,
}

impl Pipeline {
    pub fn new(schemas: SchemaStore) -> Result<Self> {
        let semantic = crate::validation::semantic::SemanticValidator::new(&schemas);
        let renderer = Renderer::new()?;
        Ok(Self {
            schemas,
            semantic,
            renderer,
        })
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Validate a batch, then render the semantically valid documents for
    /// each requested target. Pass an empty target list to validate only.
    pub fn process(&self, documents: &[Document], targets: &[&str]) -> Vec<DocumentOutcome> {
        // Structural stage first for the whole batch: the cross-document
        // context must only see documents whose shape is trustworthy.
        let structural: Vec<ValidationResult> = documents
            .iter()
            .map(|document| self.structural(document))
            .collect();

        let context = ContextSnapshot::from_documents(
            documents
                .iter()
                .zip(&structural)
                .filter(|(_, result)| result.passed())
                .map(|(document, _)| document),
        );

        let mut outcomes = Vec::with_capacity(documents.len());
        for (document, structural) in documents.iter().zip(structural) {
            let semantic = structural
                .passed()
                .then(|| self.semantic.validate(document, &context));

            let fully_valid =
                semantic.as_ref().map(ValidationResult::passed).unwrap_or(false);
            let renders = if fully_valid {
                self.render_all(document, targets)
            } else {
                Vec::new()
            };

            outcomes.push(DocumentOutcome {
                id: document.id(),
                source: document.source.clone(),
                kind: document.kind.clone(),
                structural,
                semantic,
                renders,
            });
        }
        outcomes
    }

    /// Supporting artifacts a target emits once per collection rather than
    /// once per document.
    pub fn support_artifacts(
        &self,
        outcomes: &[DocumentOutcome],
        documents: &[Document],
        target: &str,
    ) -> Vec<RenderedArtifact> {
        if target != "langgraph" {
            return Vec::new();
        }
        let valid: Vec<Validated<'_>> = documents
            .iter()
            .zip(outcomes)
            .filter(|(document, outcome)| {
                document.kind == crate::document::KIND_AGENT && outcome.is_valid()
            })
            .map(|(document, _)| Validated::new(document))
            .collect();
        if valid.is_empty() {
            return Vec::new();
        }
        renderer::langgraph_support(&valid)
    }

    fn structural(&self, document: &Document) -> ValidationResult {
        match self.schemas.get(&document.kind) {
            Some(schema) => structural::validate_structure(document, schema),
            None => {
                let mut result = ValidationResult::new();
                result.error(
                    "kind",
                    format!("unknown specification kind '{}'", document.kind),
                );
                result
            }
        }
    }

    /// Targets that consume a different kind are skipped, not failed: a
    /// recipe in the workspace is no reason for `render claude` to report
    /// an error.
    fn render_all(&self, document: &Document, targets: &[&str]) -> Vec<RenderOutcome> {
        targets
            .iter()
            .filter(|target| {
                self.renderer
                    .target_kind(target)
                    .map(|kind| kind == document.kind)
                    .unwrap_or(true)
            })
            .map(|target| {
                match self.renderer.render(Validated::new(document), target) {
                    Ok(artifact) => RenderOutcome::Rendered(artifact),
                    Err(e) => RenderOutcome::Failed {
                        target: target.to_string(),
                        message: e.to_string(),
                    },
                }
            })
            .collect()
    }
}
