//! Discovers and parses specification files from workspace directories.

use crate::document::{self, Document, KIND_AGENT, KIND_RECIPE};
use crate::error::{AgentsmithError, Result};
use std::path::{Path, PathBuf};

/// Recursively collect `.yaml`/`.yml` files under `dir`, skipping any
/// `_templates` directories. Sorted for stable output ordering.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for pattern in ["**/*.yaml", "**/*.yml"] {
        let full = dir.join(pattern);
        let full = full
            .to_str()
            .ok_or_else(|| AgentsmithError::InvalidConfig(format!(
                "non-UTF-8 path: {}",
                dir.display()
            )))?;
        for entry in glob::glob(full)
            .map_err(|e| AgentsmithError::InvalidConfig(e.to_string()))?
        {
            let path = entry.map_err(std::io::Error::from)?;
            if path
                .components()
                .any(|c| c.as_os_str() == "_templates")
            {
                continue;
            }
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse one file into a document. The directory name the file sits under
/// serves as the kind hint when the document carries no explicit `kind`.
pub fn load_file(path: &Path, hint: Option<&str>) -> Result<Document> {
    let raw = std::fs::read_to_string(path)?;
    let body: serde_yaml::Value =
        serde_yaml::from_str(&raw).map_err(|e| AgentsmithError::YamlParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let kind = document::determine_kind(&body, hint);
    Ok(Document::new(kind, path, body))
}

/// Load every specification from the standard workspace layout: agents
/// from `agents_dir`, recipes from `recipes_dir`.
pub fn load_workspace(agents_dir: &Path, recipes_dir: &Path) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for path in discover(agents_dir)? {
        documents.push(load_file(&path, Some(KIND_AGENT))?);
    }
    for path in discover(recipes_dir)? {
        documents.push(load_file(&path, Some(KIND_RECIPE))?);
    }
    Ok(documents)
}
