//! Policy store: runtime policy, ban records and the allow list.
//!
//! Two interchangeable [`Backend`]s persist the same data:
//! - [`Database`]: SQLite via sqlx
//! - [`FileBackend`]: whole-file JSON rewrites in a data directory
//!
//! [`PolicyStore`] wraps a backend and absorbs its failures: reads fall back
//! to defaults or empty results, predicates to `false`, and each failure is
//! logged.

mod file;
mod records;

pub use file::FileBackend;
pub use records::{AllowRecord, BanListing, BanRecord, UNKNOWN, whole_hours};

use crate::config::{StorageBackend, StorageConfig};
use crate::db::{Database, DbError};
use acwarden_rules::{Policy, PolicyError, PolicyKey, PolicyValue};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("file store error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed store file {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Persistence operations shared by both backends.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Stored policy entries, as raw JSON.
    async fn load_policy(&self) -> Result<Vec<(String, Value)>, StoreError>;
    /// Persist every entry of `policy`.
    async fn save_policy(&self, policy: &Policy) -> Result<(), StoreError>;

    /// Insert or replace a ban keyed by player.
    async fn upsert_ban(&self, record: &BanRecord) -> Result<(), StoreError>;
    /// Remove a ban. Returns whether one existed.
    async fn remove_ban(&self, player_id: &str) -> Result<bool, StoreError>;
    /// All bans, newest first.
    async fn list_bans(&self) -> Result<Vec<BanRecord>, StoreError>;

    /// Whether a player is on the allow list.
    async fn is_allowed(&self, player_id: &str) -> Result<bool, StoreError>;
    /// Add an allow-list entry. Returns `false` if already present.
    async fn add_allowed(&self, record: &AllowRecord) -> Result<bool, StoreError>;
    /// Remove an allow-list entry. Returns whether one existed.
    async fn remove_allowed(&self, player_id: &str) -> Result<bool, StoreError>;
    /// All allow-list entries, newest first.
    async fn list_allowed(&self) -> Result<Vec<AllowRecord>, StoreError>;
}

#[async_trait]
impl Backend for Database {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn load_policy(&self) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(self.policy().load().await?)
    }

    async fn save_policy(&self, policy: &Policy) -> Result<(), StoreError> {
        let entries = policy.entries();
        let pairs: Vec<(&str, &PolicyValue)> = entries
            .iter()
            .map(|(key, value)| (key.name(), value))
            .collect();
        self.policy().save(pairs).await?;
        Ok(())
    }

    async fn upsert_ban(&self, record: &BanRecord) -> Result<(), StoreError> {
        Ok(self.bans().upsert(record).await?)
    }

    async fn remove_ban(&self, player_id: &str) -> Result<bool, StoreError> {
        Ok(self.bans().remove(player_id).await?)
    }

    async fn list_bans(&self) -> Result<Vec<BanRecord>, StoreError> {
        Ok(self.bans().list().await?)
    }

    async fn is_allowed(&self, player_id: &str) -> Result<bool, StoreError> {
        Ok(self.allowed().contains(player_id).await?)
    }

    async fn add_allowed(&self, record: &AllowRecord) -> Result<bool, StoreError> {
        Ok(self.allowed().add(record).await?)
    }

    async fn remove_allowed(&self, player_id: &str) -> Result<bool, StoreError> {
        Ok(self.allowed().remove(player_id).await?)
    }

    async fn list_allowed(&self) -> Result<Vec<AllowRecord>, StoreError> {
        Ok(self.allowed().list().await?)
    }
}

/// Failure-absorbing facade over a [`Backend`].
#[derive(Clone)]
pub struct PolicyStore {
    backend: Arc<dyn Backend>,
}

impl PolicyStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Open the backend named by the storage configuration.
    pub async fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        let backend: Arc<dyn Backend> = match config.backend {
            StorageBackend::Database => Arc::new(Database::new(&config.path).await?),
            StorageBackend::File => Arc::new(FileBackend::open(&config.data_dir)?),
        };
        info!(backend = backend.name(), "Policy store opened");
        Ok(Self::new(backend))
    }

    /// Current policy merged over the defaults.
    ///
    /// Persists the defaults on first read. Backend failures yield the
    /// defaults.
    pub async fn get(&self) -> Policy {
        match self.load().await {
            Ok(policy) => policy,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Failed to load policy, using defaults");
                Policy::default()
            }
        }
    }

    async fn load(&self) -> Result<Policy, StoreError> {
        let entries = self.backend.load_policy().await?;
        if entries.is_empty() {
            let policy = Policy::default();
            self.backend.save_policy(&policy).await?;
            info!("Policy initialized with defaults");
            return Ok(policy);
        }

        let (policy, rejected) = Policy::from_entries(entries);
        for key in rejected {
            warn!(key = %key, "Stored policy value is invalid, using default");
        }
        Ok(policy)
    }

    /// Apply a partial update and persist it.
    ///
    /// Unknown keys are dropped. An invalid value for a known key rejects the
    /// whole update and nothing is written.
    pub async fn update(&self, partial: &Map<String, Value>) -> Result<Policy, StoreError> {
        let mut policy = self.load().await?;
        let applied = policy.apply(partial)?;
        self.backend.save_policy(&policy).await?;
        info!(keys = ?applied, "Policy updated");
        Ok(policy)
    }

    /// Set a single key by wire name.
    pub async fn set(&self, key: &str, raw: &Value) -> Result<(Policy, PolicyValue), StoreError> {
        let key = PolicyKey::from_name(key).ok_or_else(|| PolicyError::UnknownKey(key.to_string()))?;
        let mut policy = self.load().await?;
        let value = policy.set_raw(key, raw)?;
        self.backend.save_policy(&policy).await?;
        info!(key = %key, value = %value, "Policy key set");
        Ok((policy, value))
    }

    /// Record a ban. Returns `false` if it could not be persisted.
    pub async fn record_ban(&self, record: &BanRecord) -> bool {
        match self.backend.upsert_ban(record).await {
            Ok(()) => {
                crate::metrics::record_ban();
                true
            }
            Err(e) => {
                error!(player_id = %record.player_id, error = %e, "Failed to record ban");
                false
            }
        }
    }

    /// Remove a ban. Returns `false` if none existed or removal failed.
    pub async fn remove_ban(&self, player_id: &str) -> bool {
        self.backend
            .remove_ban(player_id)
            .await
            .unwrap_or_else(|e| {
                error!(player_id = %player_id, error = %e, "Failed to remove ban");
                false
            })
    }

    /// All bans, newest first. Empty on backend failure.
    pub async fn list_bans(&self) -> Vec<BanRecord> {
        self.backend.list_bans().await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to list bans");
            Vec::new()
        })
    }

    pub async fn is_allowed(&self, player_id: &str) -> bool {
        self.backend
            .is_allowed(player_id)
            .await
            .unwrap_or_else(|e| {
                warn!(player_id = %player_id, error = %e, "Failed to check allow list");
                false
            })
    }

    /// Add a player to the allow list. An existing entry is kept and counts as
    /// success; returns `false` only when the write failed.
    pub async fn add_allowed(&self, record: &AllowRecord) -> bool {
        match self.backend.add_allowed(record).await {
            Ok(true) => true,
            Ok(false) => {
                info!(player_id = %record.player_id, "Player already on allow list");
                true
            }
            Err(e) => {
                error!(player_id = %record.player_id, error = %e, "Failed to add to allow list");
                false
            }
        }
    }

    pub async fn remove_allowed(&self, player_id: &str) -> bool {
        self.backend
            .remove_allowed(player_id)
            .await
            .unwrap_or_else(|e| {
                error!(player_id = %player_id, error = %e, "Failed to remove from allow list");
                false
            })
    }

    /// All allow-list entries, newest first. Empty on backend failure.
    pub async fn list_allowed(&self) -> Vec<AllowRecord> {
        self.backend.list_allowed().await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to list allow list");
            Vec::new()
        })
    }
}
