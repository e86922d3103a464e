//! Policy store backend configuration.

use serde::Deserialize;

/// Environment variable that forces the database backend at the given path.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Which backend persists policy, bans and the allow list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON files in `data_dir`.
    #[default]
    File,
    /// SQLite database at `path`.
    Database,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// SQLite file (`:memory:` allowed).
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Directory holding the flat JSON files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl StorageConfig {
    /// Apply a `DATABASE_URL` override, if one is given.
    ///
    /// Accepts a bare path or a `sqlite:` / `sqlite://` URL.
    pub fn with_database_url(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            let path = url
                .strip_prefix("sqlite://")
                .or_else(|| url.strip_prefix("sqlite:"))
                .unwrap_or(url);
            self.backend = StorageBackend::Database;
            self.path = path.to_string();
        }
        self
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_db_path(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_db_path() -> String {
    "acwarden.db".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}
