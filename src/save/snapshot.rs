use bevy::prelude::*;
use serde_json::Value;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::SaveError;
use super::lean::{to_lean_save, to_versioned_save};
use super::migrate::migrate;
use super::settings::SaveSettings;
use super::storage::StorageAdapter;
use super::validate::validate;
use crate::shared::*;

/// An exported save: the versioned record plus the file name to offer it
/// under.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub filename: String,
    pub record: Value,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(&self.record).map_err(|e| SaveError::Encode(e.to_string()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
pub fn current_timestamp() -> u64 {
    (web_sys::js_sys::Date::now() / 1000.0) as u64
}

pub fn snapshot_filename(prefix: &str, unix_seconds: u64) -> String {
    format!("{}-{}.json", prefix, unix_seconds)
}

/// The current state as a stamped, verbose record.
pub fn export_snapshot(progress: &GameProgress, settings: &SaveSettings) -> Result<Snapshot, SaveError> {
    let record = serde_json::to_value(to_versioned_save(progress))
        .map_err(|e| SaveError::Encode(e.to_string()))?;
    Ok(Snapshot {
        filename: snapshot_filename(&settings.export_prefix, current_timestamp()),
        record,
    })
}

/// Validates, migrates and persists an externally supplied save under the
/// canonical key. Returns whether it was persisted. Nothing is written for
/// a rejected payload; the caller is expected to reload from storage after
/// an accepted one.
pub fn import_snapshot(
    adapter: &mut StorageAdapter,
    settings: &SaveSettings,
    registry: &SchemaRegistry,
    raw: &str,
) -> bool {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("[Save] Import rejected: not JSON ({})", e);
            return false;
        }
    };
    let validated = match validate(&value) {
        Ok(validated) => validated,
        Err(e) => {
            warn!("[Save] Import rejected: {}", e);
            return false;
        }
    };

    let (progress, report) = migrate(validated.as_value(), registry);
    info!(
        "[Save] Import accepted ({:?} record, v{} -> v{})",
        report.shape, report.original_version, report.final_version
    );
    adapter.write_json(&settings.save_key, &to_lean_save(&progress, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::storage::MemoryStorage;
    use serde_json::json;

    fn setup() -> (StorageAdapter, SaveSettings, SchemaRegistry) {
        (
            StorageAdapter::new(MemoryStorage::new()),
            SaveSettings::default(),
            SchemaRegistry::current(),
        )
    }

    #[test]
    fn test_filename_has_prefix_and_timestamp() {
        assert_eq!(
            snapshot_filename("veggie-farm-save", 1_700_000_000),
            "veggie-farm-save-1700000000.json"
        );
        let registry = SchemaRegistry::current();
        let snapshot =
            export_snapshot(&GameProgress::new_game(&registry), &SaveSettings::default()).unwrap();
        assert!(snapshot.filename.starts_with("veggie-farm-save-"));
        assert!(snapshot.filename.ends_with(".json"));
    }

    #[test]
    fn test_export_is_versioned_and_importable() {
        let (mut adapter, settings, registry) = setup();
        let mut progress = GameProgress::new_game(&registry);
        progress.farm.money = 777.0;

        let snapshot = export_snapshot(&progress, &settings).unwrap();
        assert_eq!(snapshot.record["canningVersion"], json!(4));
        assert!(snapshot.record["canningState"].is_object());

        let raw = snapshot.to_json_pretty().unwrap();
        assert!(import_snapshot(&mut adapter, &settings, &registry, &raw));

        let stored = adapter.read_json(&settings.save_key).expect("import should persist");
        assert_eq!(stored["money"], json!(777.0));
        assert!(stored.get("canningVersion").is_none(), "canonical key holds the lean shape");
        assert!(stored["canningProgress"].is_object());
    }

    #[test]
    fn test_rejected_import_writes_nothing() {
        let (mut adapter, settings, registry) = setup();
        assert!(!import_snapshot(&mut adapter, &settings, &registry, "not json at all"));
        assert!(!import_snapshot(&mut adapter, &settings, &registry, "null"));
        assert!(!import_snapshot(&mut adapter, &settings, &registry, "[]"));
        assert!(!import_snapshot(&mut adapter, &settings, &registry, r#"{"money": 1}"#));
        assert_eq!(adapter.read(&settings.save_key), None);
    }

    #[test]
    fn test_import_fails_when_storage_refuses_the_write() {
        let mut adapter = StorageAdapter::new(MemoryStorage::with_quota(8));
        let settings = SaveSettings::default();
        let registry = SchemaRegistry::current();
        let raw = r#"{"money":1,"experience":0,"knowledge":0,"day":1,"maxPlots":4,"farmTier":1,"veggies":[]}"#;
        assert!(!import_snapshot(&mut adapter, &settings, &registry, raw));
    }

    #[test]
    fn test_import_migrates_old_records() {
        let (mut adapter, settings, registry) = setup();
        let raw = json!({
            "money": 5, "experience": 0, "knowledge": 0, "day": 2,
            "maxPlots": 4, "farmTier": 1,
            "veggies": [{ "name": "Beets", "stash": 3 }],
            "canningState": {
                "recipes": [],
                "upgrades": [{ "id": "speed", "level": 2 }],
                "activeProcesses": []
            }
        })
        .to_string();
        assert!(import_snapshot(&mut adapter, &settings, &registry, &raw));
        let stored = adapter.read_json(&settings.save_key).unwrap();
        assert_eq!(stored["canningProgress"]["upgradeLevels"]["speed"], json!(2));
        assert_eq!(stored["canningProgress"]["upgradeLevels"]["canner"], json!(0));
        assert_eq!(stored["veggies"][0]["stash"], json!(3));
    }
}
