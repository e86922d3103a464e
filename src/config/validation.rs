//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, StorageBackend};
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("webhook.timeout_secs must be greater than zero")]
    ZeroWebhookTimeout,
    #[error("storage.path is required for the database backend")]
    MissingDatabasePath,
    #[error("storage.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
    #[error("storage.data_dir is required for the file backend")]
    MissingDataDir,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    if config.webhook.timeout_secs == 0 {
        errors.push(ValidationError::ZeroWebhookTimeout);
    }

    match config.storage.backend {
        StorageBackend::Database => {
            let path = config.storage.path.trim();
            if path.is_empty() {
                errors.push(ValidationError::MissingDatabasePath);
            } else if path != ":memory:"
                && let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                errors.push(ValidationError::DatabasePathInvalid(path.to_string()));
            }
        }
        StorageBackend::File => {
            if config.storage.data_dir.trim().is_empty() {
                errors.push(ValidationError::MissingDataDir);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
