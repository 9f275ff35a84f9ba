use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("project not found: {0}")]
    NotFound(String),
    #[error("project already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid project name: {0:?}")]
    InvalidName(String),
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("failed to serialize project: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
