use crate::config::Config;
use crate::error::{AgentsmithError, Result};
use std::path::{Path, PathBuf};

/// An agent specification workspace rooted somewhere on disk.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Detect the workspace root starting from the current directory.
    /// Priority: nearest ancestor carrying an .agentsmith.toml or an
    /// agents/ directory, then the current directory itself.
    pub fn detect() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            AgentsmithError::WorkspaceDetection(format!("Failed to get current directory: {}", e))
        })?;
        Ok(Self::detect_from(&cwd))
    }

    pub fn detect_from(start: &Path) -> Self {
        let mut dir = start;
        loop {
            if dir.join(".agentsmith.toml").is_file() || dir.join("agents").is_dir() {
                return Self {
                    root: dir.to_path_buf(),
                };
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => {
                    return Self {
                        root: start.to_path_buf(),
                    }
                }
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn agents_dir(&self, config: &Config) -> PathBuf {
        self.root.join(&config.paths.agents_dir)
    }

    pub fn recipes_dir(&self, config: &Config) -> PathBuf {
        self.root.join(&config.paths.recipes_dir)
    }

    pub fn schemas_dir(&self, config: &Config) -> PathBuf {
        self.root.join(&config.paths.schemas_dir)
    }

    pub fn output_dir(&self, config: &Config, target: &str) -> PathBuf {
        self.root.join(&config.paths.output_dir).join(target)
    }
}
