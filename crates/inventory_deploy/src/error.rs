use std::path::PathBuf;

use inventory_core::naming::NamingError;
use thiserror::Error;

use crate::packager::PackageError;
use crate::site::SiteError;

/// Outcome classes of a single control-plane call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudError {
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("{0} was not found")]
    NotFound(String),
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },
}

impl CloudError {
    pub fn service(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Service {
            operation,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("invalid configuration: {0}")]
    Config(#[from] NamingError),
    #[error("execution role `{role}` is not available: {source}")]
    MissingRole { role: String, source: CloudError },
    #[error("{step} failed: {source}")]
    Cloud { step: String, source: CloudError },
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Site(#[from] SiteError),
    #[error("timed out waiting for {what} after {attempts} attempts")]
    Timeout { what: String, attempts: u32 },
}

impl DeployError {
    pub fn cloud(step: impl Into<String>, source: CloudError) -> Self {
        Self::Cloud {
            step: step.into(),
            source,
        }
    }
}
