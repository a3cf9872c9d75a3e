use bevy::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use super::error::SaveError;

// ═══════════════════════════════════════════════════════════════════════
// STORAGE PORT
// ═══════════════════════════════════════════════════════════════════════

/// A string key-value store: the browser's localStorage, or a stand-in.
pub trait SaveStorage: Send + Sync + 'static {
    fn get_item(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), SaveError>;
    fn remove_item(&mut self, key: &str) -> Result<(), SaveError>;
}

// ═══════════════════════════════════════════════════════════════════════
// IN-MEMORY BACKEND
// ═══════════════════════════════════════════════════════════════════════

/// Map-backed store. A byte quota and an "unavailable" switch let tests
/// reproduce the browser's failure modes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    quota_bytes: Option<usize>,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total of key and value lengths may not exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota_bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// Every call fails, like localStorage in a locked-down browser.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    fn check_available(&self) -> Result<(), SaveError> {
        if self.unavailable {
            Err(SaveError::StorageUnavailable("memory storage disabled".into()))
        } else {
            Ok(())
        }
    }
}

impl SaveStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SaveError> {
        self.check_available()?;
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        self.check_available()?;
        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(SaveError::QuotaExceeded {
                    key: key.to_string(),
                    bytes: value.len(),
                });
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), SaveError> {
        self.check_available()?;
        self.items.remove(key);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FILESYSTEM BACKEND (native)
// ═══════════════════════════════════════════════════════════════════════

/// One `<key>.json` file per key.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `saves/` next to the executable.
    pub fn in_executable_dir() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(exe_dir.join("saves"))
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SaveStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SaveError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.key_path(key);
        // Write to a temp file first, then rename for atomicity
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), SaveError> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LOCALSTORAGE BACKEND (wasm32)
// ═══════════════════════════════════════════════════════════════════════

/// The browser's localStorage. Looked up on every call so the handle never
/// has to be held across threads.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, SaveError> {
        let window = web_sys::window()
            .ok_or_else(|| SaveError::StorageUnavailable("no window".into()))?;
        window
            .local_storage()
            .map_err(|e| SaveError::StorageUnavailable(format!("{:?}", e)))?
            .ok_or_else(|| SaveError::StorageUnavailable("localStorage disabled".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SaveError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| SaveError::StorageUnavailable(format!("{:?}", e)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        // setItem only throws for QuotaExceededError or a revoked store
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| SaveError::QuotaExceeded {
                key: key.to_string(),
                bytes: value.len(),
            })
    }

    fn remove_item(&mut self, key: &str) -> Result<(), SaveError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| SaveError::StorageUnavailable(format!("{:?}", e)))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ADAPTER
// ═══════════════════════════════════════════════════════════════════════

/// Wraps a backend and turns every failure into a logged return value.
///
/// A failed read is reported as "no save"; a failed write as `false`.
#[derive(Resource)]
pub struct StorageAdapter {
    backend: Box<dyn SaveStorage>,
}

impl StorageAdapter {
    pub fn new(backend: impl SaveStorage) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn platform_default() -> Self {
        Self::new(LocalStorage)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn platform_default() -> Self {
        let storage = FileStorage::in_executable_dir();
        info!("[Save] Saves directory: {}", storage.dir().display());
        Self::new(storage)
    }

    pub fn read(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Reading save '{}' FAILED: {}. Treating as no save.", key, e);
                None
            }
        }
    }

    pub fn read_json(&self, key: &str) -> Option<Value> {
        let raw = self.read(key)?;
        match decode(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Reading save '{}' FAILED: {}. Treating as no save.", key, e);
                None
            }
        }
    }

    pub fn write(&mut self, key: &str, raw: &str) -> bool {
        match self.backend.set_item(key, raw) {
            Ok(()) => true,
            Err(e) => {
                warn!("Writing save '{}' FAILED: {}", key, e);
                false
            }
        }
    }

    pub fn write_json<T: Serialize>(&mut self, key: &str, record: &T) -> bool {
        match serde_json::to_string(record) {
            Ok(raw) => self.write(key, &raw),
            Err(e) => {
                warn!("Serializing save '{}' FAILED: {}", key, e);
                false
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        match self.backend.remove_item(key) {
            Ok(()) => true,
            Err(e) => {
                warn!("Removing save '{}' FAILED: {}", key, e);
                false
            }
        }
    }
}

fn decode(raw: &str) -> Result<Value, SaveError> {
    Ok(serde_json::from_str(raw)?)
}
