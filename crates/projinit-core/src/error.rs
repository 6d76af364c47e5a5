//! Error types for projinit-core

use thiserror::Error;

/// Result type alias using projinit-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading a catalog or creating a project.
///
/// Only [`Error::ConfigNotFound`] and [`Error::MalformedConfig`] abort a run.
/// Everything else is collected into a
/// [`CreationReport`](crate::creator::CreationReport) and logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No candidate configuration location was readable
    #[error("Could not find a config file in any location: {searched}")]
    ConfigNotFound { searched: String },

    /// Configuration payload does not match the catalog shape
    #[error("Could not parse configuration: {message}")]
    MalformedConfig { message: String },

    /// Lookup miss for a project type
    #[error("{name} is not a configured project type")]
    ProjectTypeNotFound { name: String },

    /// A type reappeared while walking its own ancestry
    #[error("Cyclic inheritance detected: {chain}")]
    CyclicInheritance { chain: String },

    /// Command could not be launched or exited unsuccessfully
    #[error("Command `{command}` failed: {reason}")]
    CommandExecution { command: String, reason: String },

    /// Remote source could not be downloaded
    #[error("Failed to download {url}: {reason}")]
    FileFetch { url: String, reason: String },

    /// Local source could not be read
    #[error("Failed to read {path}: {reason}")]
    FileRead { path: String, reason: String },

    /// Destination could not be created or written
    #[error("Failed to write {path}: {reason}")]
    FileWrite { path: String, reason: String },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(searched: impl Into<String>) -> Self {
        Self::ConfigNotFound {
            searched: searched.into(),
        }
    }

    /// Create a malformed config error
    pub fn malformed_config(message: impl ToString) -> Self {
        Self::MalformedConfig {
            message: message.to_string(),
        }
    }

    /// Create a project type not found error
    pub fn project_type_not_found(name: impl Into<String>) -> Self {
        Self::ProjectTypeNotFound { name: name.into() }
    }

    /// Create a cyclic inheritance error from the names visited so far
    pub fn cyclic_inheritance<S: AsRef<str>>(chain: &[S]) -> Self {
        Self::CyclicInheritance {
            chain: chain
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(" -> "),
        }
    }

    /// Create a command execution error
    pub fn command_execution(command: impl Into<String>, reason: impl ToString) -> Self {
        Self::CommandExecution {
            command: command.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a file fetch error
    pub fn file_fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::FileFetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::FileRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a file write error
    pub fn file_write(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::FileWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error aborts the run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. } | Self::MalformedConfig { .. }
        )
    }
}
