use thiserror::Error;

/// The main error type for sitekit operations
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("glob error: {0}")]
    Glob(#[from] globset::Error),

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("task '{task}' references unknown child '{child}'")]
    UnknownChild { task: String, child: String },

    #[error("unknown task '{0}'")]
    UnknownTask(String),

    #[error("{tool}: {detail}")]
    Collaborator { tool: String, detail: String },

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// Result type alias for sitekit operations
pub type SiteResult<T> = Result<T, SiteError>;
