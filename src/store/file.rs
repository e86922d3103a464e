//! Flat-file backend.
//!
//! Three JSON files in a data directory: `config.json` (object keyed by
//! policy key), `banned_accounts.json` and `allowed_accounts.json` (arrays in
//! insertion order). Every write rewrites the whole file through a temp file
//! and an atomic rename, under one in-process lock.

use super::records::sort_newest_first;
use super::{AllowRecord, Backend, BanRecord, StoreError};
use acwarden_rules::Policy;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.json";
const BANS_FILE: &str = "banned_accounts.json";
const ALLOWED_FILE: &str = "allowed_accounts.json";

/// JSON-file store rooted at a data directory.
pub struct FileBackend {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileBackend {
    /// Open (creating if needed) the data directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Raw entries of a record file, in insertion order.
    fn read_entries(&self, name: &str) -> Result<Vec<Value>, StoreError> {
        Ok(read_json::<Vec<Value>>(&self.path(name))?.unwrap_or_default())
    }
}

/// The `playerId` of a raw entry, whether or not the rest of it decodes.
fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("playerId").and_then(Value::as_str)
}

/// Decode each entry on its own. Unreadable entries are logged and skipped
/// but stay in the file.
fn decode<T: DeserializeOwned>(name: &str, entries: Vec<Value>) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let player_id = entry_id(&entry).unwrap_or_default().to_string();
            match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(file = name, player_id = %player_id, error = %e, "Skipping unreadable record");
                    None
                }
            }
        })
        .collect()
}

fn encode<T: Serialize>(record: &T) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(record).map_err(std::io::Error::other)?)
}

/// Read a JSON file. A missing file yields `None`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })
}

/// Write a JSON file atomically (temp file + rename).
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let temp_path = path.with_extension("json.tmp");
    let mut writer = BufWriter::new(File::create(&temp_path)?);
    serde_json::to_writer_pretty(&mut writer, value).map_err(std::io::Error::other)?;
    writer.flush()?;
    drop(writer);

    fs::rename(&temp_path, path)?;

    debug!(path = %path.display(), "Store file written");
    Ok(())
}

#[async_trait]
impl Backend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load_policy(&self) -> Result<Vec<(String, Value)>, StoreError> {
        let _guard = self.lock.lock();
        let stored = read_json::<Map<String, Value>>(&self.path(CONFIG_FILE))?;
        Ok(stored.map(|map| map.into_iter().collect()).unwrap_or_default())
    }

    async fn save_policy(&self, policy: &Policy) -> Result<(), StoreError> {
        let map: Map<String, Value> = policy
            .entries()
            .into_iter()
            .map(|(key, value)| (key.name().to_string(), value.to_json()))
            .collect();

        let _guard = self.lock.lock();
        write_json(&self.path(CONFIG_FILE), &map)
    }

    async fn upsert_ban(&self, record: &BanRecord) -> Result<(), StoreError> {
        let entry = encode(record)?;
        let _guard = self.lock.lock();
        let mut bans = self.read_entries(BANS_FILE)?;
        bans.retain(|b| entry_id(b) != Some(record.player_id.as_str()));
        bans.push(entry);
        write_json(&self.path(BANS_FILE), &bans)
    }

    async fn remove_ban(&self, player_id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock();
        let mut bans = self.read_entries(BANS_FILE)?;
        let before = bans.len();
        bans.retain(|b| entry_id(b) != Some(player_id));
        if bans.len() == before {
            return Ok(false);
        }
        write_json(&self.path(BANS_FILE), &bans)?;
        Ok(true)
    }

    async fn list_bans(&self) -> Result<Vec<BanRecord>, StoreError> {
        let entries = {
            let _guard = self.lock.lock();
            self.read_entries(BANS_FILE)?
        };
        let mut bans: Vec<BanRecord> = decode(BANS_FILE, entries);
        sort_newest_first(&mut bans, |b| b.banned_at);
        Ok(bans)
    }

    async fn is_allowed(&self, player_id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock();
        Ok(self
            .read_entries(ALLOWED_FILE)?
            .iter()
            .any(|a| entry_id(a) == Some(player_id)))
    }

    async fn add_allowed(&self, record: &AllowRecord) -> Result<bool, StoreError> {
        let entry = encode(record)?;
        let _guard = self.lock.lock();
        let mut allowed = self.read_entries(ALLOWED_FILE)?;
        if allowed.iter().any(|a| entry_id(a) == Some(record.player_id.as_str())) {
            return Ok(false);
        }
        allowed.push(entry);
        write_json(&self.path(ALLOWED_FILE), &allowed)?;
        Ok(true)
    }

    async fn remove_allowed(&self, player_id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock();
        let mut allowed = self.read_entries(ALLOWED_FILE)?;
        let before = allowed.len();
        allowed.retain(|a| entry_id(a) != Some(player_id));
        if allowed.len() == before {
            return Ok(false);
        }
        write_json(&self.path(ALLOWED_FILE), &allowed)?;
        Ok(true)
    }

    async fn list_allowed(&self) -> Result<Vec<AllowRecord>, StoreError> {
        let entries = {
            let _guard = self.lock.lock();
            self.read_entries(ALLOWED_FILE)?
        };
        let mut allowed: Vec<AllowRecord> = decode(ALLOWED_FILE, entries);
        sort_newest_first(&mut allowed, |a| a.added_at);
        Ok(allowed)
    }
}
