use bevy::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

/// Canonical key: lean shape, no version stamp.
pub const SAVE_KEY: &str = "veggie-farm";
/// Legacy key: versioned shape, read only when the canonical key is empty.
pub const LEGACY_SAVE_KEY: &str = "veggie-farm-versioned";

/// Persistence settings. Key names must stay stable across releases.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveSettings {
    pub save_key: String,
    pub legacy_key: String,
    /// 0 disables autosave.
    pub autosave_interval_secs: f32,
    pub export_prefix: String,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            save_key: SAVE_KEY.to_string(),
            legacy_key: LEGACY_SAVE_KEY.to_string(),
            autosave_interval_secs: 30.0,
            export_prefix: "veggie-farm-save".to_string(),
        }
    }
}

impl SaveSettings {
    /// Read settings from a RON file, falling back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!("Could not read {}: {}. Using default save settings.", path.display(), e);
                return Self::default();
            }
        };
        Self::from_ron(&text).unwrap_or_else(|e| {
            warn!("Malformed {}: {}. Using default save settings.", path.display(), e);
            Self::default()
        })
    }

    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}
