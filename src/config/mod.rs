//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, WebhookConfig, ConfigError)
//! - [`storage`]: Policy store backend selection (StorageConfig, StorageBackend)
//! - [`validation`]: Startup checks over a loaded config

mod storage;
mod types;
pub mod validation;

pub use storage::{DATABASE_URL_ENV, StorageBackend, StorageConfig};
pub use types::{Config, WebhookConfig};
