use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{SessionStore, StoreError};

const SESSION_FILE: &str = "session.json";

/// Session store persisted as a flat JSON object in the portal config
/// directory. Every call re-reads the file so separate CLI invocations see
/// each other's writes.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: Option<PathBuf>,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// `PORTAL_CONFIG_DIR`, else `$HOME/.config/pickleball/portal`. With
    /// neither available the store reports itself unavailable.
    pub fn from_env() -> Self {
        let dir = if let Ok(custom_dir) = std::env::var("PORTAL_CONFIG_DIR") {
            Some(PathBuf::from(custom_dir))
        } else {
            std::env::var("HOME").ok().map(|home| {
                PathBuf::from(home)
                    .join(".config")
                    .join("pickleball")
                    .join("portal")
            })
        };
        Self { dir }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn file(&self) -> Result<PathBuf, StoreError> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(SESSION_FILE))
            .ok_or(StoreError::Unavailable)
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let file = self.file()?;
        if !file.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(file)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let file = self.file()?;
        if let Some(parent) = file.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(file, content)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
