use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentsmithError {
    #[error("Schema definition error in '{schema}': {message}")]
    SchemaDefinition { schema: String, message: String },

    #[error("Template registration failed: {0}")]
    TemplateRegistration(#[from] handlebars::TemplateError),

    #[error("Unknown render target: {0}")]
    UnknownTarget(String),

    #[error("Render failed for target '{target}': {message}")]
    Render { target: String, message: String },

    #[error("Agent '{0}' not found")]
    AgentNotFound(String),

    #[error("YAML parse error in {path}: {message}")]
    YamlParse { path: PathBuf, message: String },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Workspace detection failed: {0}")]
    WorkspaceDetection(String),

    #[error("File already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("{invalid} of {total} specification file(s) failed validation")]
    ValidationFailed { invalid: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AgentsmithError>;
