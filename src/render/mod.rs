//! Artifact rendering: one registered template per output target.

pub mod renderer;
pub mod template;

pub use renderer::Renderer;
pub use template::TemplateSpec;

use std::path::PathBuf;

/// One rendered artifact for a (specification, target) pair.
///
/// Immutable once produced; the caller owns it and decides whether and
/// where to write it. `path` is the intended destination relative to the
/// target's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub target: String,
    pub path: PathBuf,
    pub content: String,
}
