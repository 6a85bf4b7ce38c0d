//! Persistence boundary for the lock subsystem
//!
//! Two logical records exist: the `security_settings` configuration and the
//! `last_activity` stamp. `FileStore` keeps both inside one JSON document so
//! that `clear` removes them together; a persisted state with one record
//! present and the other deleted cannot be produced.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LockError, Result};
use crate::settings::SecuritySettings;

/// Document file name
const LOCK_FILE_NAME: &str = "lock.json";

/// Configuration directory under ~/.config
const CONFIG_DIR_NAME: &str = "quill";

/// Key-value persistence consumed by the session gate.
///
/// Reads treat an unreadable or absent record as "not configured"; writes
/// surface failures so setup and disable never silently report success.
pub trait LockStore {
    /// Read the persisted security settings, if any
    fn load_settings(&self) -> Result<Option<SecuritySettings>>;

    /// Replace the persisted security settings wholesale
    fn save_settings(&mut self, settings: &SecuritySettings) -> Result<()>;

    /// Read the last-activity stamp (epoch milliseconds), if any
    fn load_last_activity(&self) -> Result<Option<u64>>;

    /// Overwrite the last-activity stamp
    fn save_last_activity(&mut self, timestamp_ms: u64) -> Result<()>;

    /// Delete both records together. Must never leave one behind.
    fn clear(&mut self) -> Result<()>;
}

/// On-disk document holding both records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LockDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    security_settings: Option<SecuritySettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_activity: Option<u64>,
}

/// File-backed store under the user's config directory
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open the store at the default location, creating the config
    /// directory if needed.
    pub fn open_default() -> Result<Self> {
        let dir = Self::config_dir()
            .ok_or_else(|| LockError::Storage("could not determine config directory".into()))?;
        fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(LOCK_FILE_NAME),
        })
    }

    /// Open the store at an explicit path (tests, embedders)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// The configuration directory, honoring XDG_CONFIG_HOME
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join(CONFIG_DIR_NAME));
        }

        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
    }

    /// Path of the backing file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_document(&self) -> LockDocument {
        if !self.path.exists() {
            return LockDocument::default();
        }

        match fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse lock file, treating as not configured: {}", e);
                LockDocument::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read lock file, treating as not configured: {}", e);
                LockDocument::default()
            }
        }
    }

    /// Replace the document atomically: write a sibling temp file, then
    /// rename. The temp file carries restrictive permissions from the
    /// moment it exists; the credential is never readable by other users.
    fn write_document(&self, document: &LockDocument) -> Result<()> {
        let contents = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            // A stale temp file would keep whatever mode it was created
            // with, so start from scratch
            match fs::remove_file(&tmp_path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }

            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(0o600)
                .open(&tmp_path)?;
            file.write_all(contents.as_bytes())?;
        }

        #[cfg(not(unix))]
        fs::write(&tmp_path, contents)?;

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl LockStore for FileStore {
    fn load_settings(&self) -> Result<Option<SecuritySettings>> {
        Ok(self.read_document().security_settings)
    }

    fn save_settings(&mut self, settings: &SecuritySettings) -> Result<()> {
        let mut document = self.read_document();
        document.security_settings = Some(settings.clone());
        self.write_document(&document)
    }

    fn load_last_activity(&self) -> Result<Option<u64>> {
        Ok(self.read_document().last_activity)
    }

    fn save_last_activity(&mut self, timestamp_ms: u64) -> Result<()> {
        let mut document = self.read_document();
        document.last_activity = Some(timestamp_ms);
        self.write_document(&document)
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and embedders with their own persistence
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    settings: Option<SecuritySettings>,
    last_activity: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with pre-existing records
    pub fn with_records(settings: Option<SecuritySettings>, last_activity: Option<u64>) -> Self {
        Self {
            settings,
            last_activity,
        }
    }
}

impl LockStore for MemoryStore {
    fn load_settings(&self) -> Result<Option<SecuritySettings>> {
        Ok(self.settings.clone())
    }

    fn save_settings(&mut self, settings: &SecuritySettings) -> Result<()> {
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn load_last_activity(&self) -> Result<Option<u64>> {
        Ok(self.last_activity)
    }

    fn save_last_activity(&mut self, timestamp_ms: u64) -> Result<()> {
        self.last_activity = Some(timestamp_ms);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.settings = None;
        self.last_activity = None;
        Ok(())
    }
}
