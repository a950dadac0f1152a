use crate::cli::{Cli, Commands};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub init: InitConfig,

    /// Verbose mode - show per-field validation details (not stored in config file)
    #[serde(skip)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_agents_dir")]
    pub agents_dir: PathBuf,

    #[serde(default = "default_recipes_dir")]
    pub recipes_dir: PathBuf,

    #[serde(default = "default_schemas_dir")]
    pub schemas_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            agents_dir: default_agents_dir(),
            recipes_dir: default_recipes_dir(),
            schemas_dir: default_schemas_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_agents_dir() -> PathBuf {
    PathBuf::from("agents")
}

fn default_recipes_dir() -> PathBuf {
    PathBuf::from("recipes")
}

fn default_schemas_dir() -> PathBuf {
    PathBuf::from("schemas")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    /// Default owner written into scaffolded agents
    #[serde(default)]
    pub owner: String,

    /// Default domain directory for scaffolded agents
    #[serde(default = "default_domain")]
    pub domain: String,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            domain: default_domain(),
        }
    }
}

fn default_domain() -> String {
    "general".to_string()
}

impl Config {
    /// Load configuration with precedence:
    /// 1. CLI flags (applied later via with_cli_overrides)
    /// 2. Environment variables
    /// 3. Project config (.agentsmith.toml in workspace root)
    /// 4. Global config (~/.agentsmith.toml)
    /// 5. Built-in defaults
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = home_dir() {
            let global_config = home.join(".agentsmith.toml");
            if global_config.exists() {
                config = config.merge(Self::from_file(&global_config)?);
            }
        }

        let project_config = workspace_root.join(".agentsmith.toml");
        if project_config.exists() {
            config = config.merge(Self::from_file(&project_config)?);
        }

        config = config.merge_env();

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(mut self, other: Self) -> Self {
        if other.paths.agents_dir != default_agents_dir() {
            self.paths.agents_dir = other.paths.agents_dir;
        }
        if other.paths.recipes_dir != default_recipes_dir() {
            self.paths.recipes_dir = other.paths.recipes_dir;
        }
        if other.paths.schemas_dir != default_schemas_dir() {
            self.paths.schemas_dir = other.paths.schemas_dir;
        }
        if other.paths.output_dir != default_output_dir() {
            self.paths.output_dir = other.paths.output_dir;
        }

        if !other.init.owner.is_empty() {
            self.init.owner = other.init.owner;
        }
        if other.init.domain != default_domain() {
            self.init.domain = other.init.domain;
        }

        self
    }

    /// Apply environment variable overrides
    fn merge_env(mut self) -> Self {
        if let Ok(dir) = std::env::var("AGENTSMITH_OUTPUT_DIR") {
            if !dir.is_empty() {
                self.paths.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(owner) = std::env::var("AGENTSMITH_OWNER") {
            if !owner.is_empty() {
                self.init.owner = owner;
            }
        }
        self
    }

    /// Apply CLI overrides (highest precedence)
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        self.verbose = cli.verbose;

        match &cli.command {
            Commands::Render {
                output_dir: Some(dir),
                ..
            } => {
                self.paths.output_dir = dir.clone();
            }
            Commands::Init {
                domain: Some(domain),
                ..
            } => {
                self.init.domain = domain.clone();
            }
            _ => {}
        }

        self
    }
}

/// Get the home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.paths.agents_dir, PathBuf::from("agents"));
        assert_eq!(config.paths.output_dir, PathBuf::from("generated"));
        assert_eq!(config.init.domain, "general");
        assert!(config.init.owner.is_empty());
    }

    #[test]
    fn test_merge_config() {
        let mut base = Config::default();
        base.paths.output_dir = PathBuf::from("dist");

        let mut override_cfg = Config::default();
        override_cfg.init.owner = "platform@example.com".to_string();

        let merged = base.merge(override_cfg);
        assert_eq!(merged.paths.output_dir, PathBuf::from("dist")); // Kept from base
        assert_eq!(merged.init.owner, "platform@example.com"); // From override
    }

    #[test]
    fn test_config_parsing() {
        let toml = r#"
            [paths]
            agents_dir = "specs/agents"
            output_dir = "out"

            [init]
            owner = "team@example.com"
            domain = "engineering"
        "#;

        let config: Config = toml::from_str(toml).expect("Failed to parse config");
        assert_eq!(config.paths.agents_dir, PathBuf::from("specs/agents"));
        assert_eq!(config.paths.output_dir, PathBuf::from("out"));
        assert_eq!(config.paths.recipes_dir, PathBuf::from("recipes")); // default survives
        assert_eq!(config.init.owner, "team@example.com");
        assert_eq!(config.init.domain, "engineering");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("AGENTSMITH_OUTPUT_DIR", "/tmp/rendered");
        std::env::set_var("AGENTSMITH_OWNER", "env@example.com");

        let config = Config::default().merge_env();
        assert_eq!(config.paths.output_dir, PathBuf::from("/tmp/rendered"));
        assert_eq!(config.init.owner, "env@example.com");

        std::env::remove_var("AGENTSMITH_OUTPUT_DIR");
        std::env::remove_var("AGENTSMITH_OWNER");
    }

    #[test]
    #[serial]
    fn test_empty_env_vars_are_ignored() {
        std::env::set_var("AGENTSMITH_OUTPUT_DIR", "");

        let config = Config::default().merge_env();
        assert_eq!(config.paths.output_dir, PathBuf::from("generated"));

        std::env::remove_var("AGENTSMITH_OUTPUT_DIR");
    }
}
