#[allow(clippy::module_inception)]
pub mod error;
pub mod executor;
pub mod project;

pub use error::{CliError, ConfigError};
pub use executor::ExecutorError;
pub use project::ProjectError;
