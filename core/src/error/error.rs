use thiserror::Error;

use super::executor::ExecutorError;
use super::project::ProjectError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("plan error: {0}")]
    Plan(#[from] ExecutorError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot determine home directory")]
    NoHomeDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for an error that escaped command dispatch.
    ///
    /// 11: config error, 20: io / project files, 30: invalid plan, 50: uncategorized
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 11,
            Self::Project(_) => 20,
            Self::Io(_) => 20,
            Self::Command(_) => 20,
            Self::Plan(_) => 30,
            Self::Anyhow(_) => 50,
        }
    }
}
