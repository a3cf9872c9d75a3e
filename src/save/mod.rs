use bevy::prelude::*;

use crate::shared::*;

mod error;
pub mod lean;
pub mod migrate;
mod settings;
mod snapshot;
mod storage;
pub mod validate;
pub mod version;

pub use error::SaveError;
pub use lean::{compact, expand, to_lean_save, to_versioned_save};
pub use migrate::migrate;
pub use settings::{SaveSettings, LEGACY_SAVE_KEY, SAVE_KEY};
pub use snapshot::{export_snapshot, import_snapshot, snapshot_filename, Snapshot};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{MemoryStorage, SaveStorage, StorageAdapter};
pub use validate::{is_valid_save, validate, ValidatedSave, ValidationError};
pub use version::{MigrationReport, SaveShape, SchemaVersion, CURRENT_CANNING_VERSION};

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Sent by UI (or the autosave timer) to persist the current state.
#[derive(Event, Debug, Clone, Default)]
pub struct SaveRequestEvent;

/// Sent by SavePlugin after a save completes (success or failure).
#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

/// Sent to reload the state from storage, discarding in-memory changes.
#[derive(Event, Debug, Clone, Default)]
pub struct LoadRequestEvent;

/// Sent by SavePlugin after a load completes.
#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    /// False when nothing was stored and a new game was started instead.
    pub found_save: bool,
    pub report: Option<MigrationReport>,
}

/// Sent by UI with the text of a user-supplied save file.
#[derive(Event, Debug, Clone)]
pub struct ImportSnapshotEvent {
    pub raw: String,
}

#[derive(Event, Debug, Clone)]
pub struct ImportCompleteEvent {
    pub accepted: bool,
}

/// Sent by UI to request a downloadable snapshot.
#[derive(Event, Debug, Clone, Default)]
pub struct ExportSnapshotEvent;

/// Sent by SavePlugin with the snapshot for the UI to offer as a file.
#[derive(Event, Debug, Clone)]
pub struct SnapshotExportedEvent {
    pub filename: String,
    pub json: String,
}

/// Sent to throw away all progress and start over.
#[derive(Event, Debug, Clone, Default)]
pub struct NewGameEvent;

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// Repeating autosave timer; `None` when autosave is disabled.
#[derive(Resource, Debug, Clone, Default)]
pub struct AutosaveTimer(pub Option<Timer>);

impl AutosaveTimer {
    pub fn from_settings(settings: &SaveSettings) -> Self {
        if settings.autosave_interval_secs > 0.0 {
            Self(Some(Timer::from_seconds(
                settings.autosave_interval_secs,
                TimerMode::Repeating,
            )))
        } else {
            Self(None)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        // Tests and embedders may provide their own backend or settings
        if !app.world().contains_resource::<StorageAdapter>() {
            app.insert_resource(StorageAdapter::platform_default());
        }
        if !app.world().contains_resource::<SaveSettings>() {
            app.init_resource::<SaveSettings>();
        }

        app
            .init_resource::<AutosaveTimer>()
            .add_event::<SaveRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_event::<LoadRequestEvent>()
            .add_event::<LoadCompleteEvent>()
            .add_event::<ImportSnapshotEvent>()
            .add_event::<ImportCompleteEvent>()
            .add_event::<ExportSnapshotEvent>()
            .add_event::<SnapshotExportedEvent>()
            .add_event::<NewGameEvent>()
            // The registry is populated by now; hydrate the game state
            .add_systems(OnEnter(GameState::Playing), load_on_enter)
            .add_systems(
                Update,
                (
                    handle_new_game,
                    handle_import_snapshot,
                    handle_load_request,
                    tick_autosave,
                    handle_save_request,
                    handle_export_snapshot,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LOAD / STORE
// ═══════════════════════════════════════════════════════════════════════

/// Reads the canonical key, falling back to the legacy key. A legacy record
/// is migrated and immediately rewritten under the canonical key. With no
/// save at all a new game is returned alongside `None`.
pub fn load_progress(
    adapter: &mut StorageAdapter,
    settings: &SaveSettings,
    registry: &SchemaRegistry,
) -> (GameProgress, Option<MigrationReport>) {
    if let Some(raw) = adapter.read_json(&settings.save_key) {
        let (progress, report) = migrate(&raw, registry);
        return (progress, Some(report));
    }

    if let Some(raw) = adapter.read_json(&settings.legacy_key) {
        info!(
            "No save under '{}'; migrating legacy save '{}'",
            settings.save_key, settings.legacy_key
        );
        let (progress, report) = migrate(&raw, registry);
        if !store_progress(adapter, settings, registry, &progress) {
            warn!("Legacy save migrated but could not be rewritten; it will be migrated again next load");
        }
        return (progress, Some(report));
    }

    (GameProgress::new_game(registry), None)
}

/// Writes the lean shape under the canonical key.
pub fn store_progress(
    adapter: &mut StorageAdapter,
    settings: &SaveSettings,
    registry: &SchemaRegistry,
    progress: &GameProgress,
) -> bool {
    adapter.write_json(&settings.save_key, &to_lean_save(progress, registry))
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn load_on_enter(
    mut commands: Commands,
    mut adapter: ResMut<StorageAdapter>,
    settings: Res<SaveSettings>,
    registry: Res<SchemaRegistry>,
    mut complete_events: EventWriter<LoadCompleteEvent>,
) {
    info!("Loading save '{}'...", settings.save_key);
    let (progress, report) = load_progress(&mut adapter, &settings, &registry);
    log_load(&report);
    commands.insert_resource(progress);
    commands.insert_resource(AutosaveTimer::from_settings(&settings));
    complete_events.send(LoadCompleteEvent {
        found_save: report.is_some(),
        report,
    });
}

fn log_load(report: &Option<MigrationReport>) {
    match report {
        Some(report) if report.was_migrated() => info!(
            "Load succeeded after {} migration step(s): {}",
            report.steps_applied,
            report.step_descriptions.join("; ")
        ),
        Some(_) => info!("Load succeeded."),
        None => info!("No save found. Starting a new game."),
    }
}

fn handle_load_request(
    mut load_events: EventReader<LoadRequestEvent>,
    mut complete_events: EventWriter<LoadCompleteEvent>,
    mut adapter: ResMut<StorageAdapter>,
    settings: Res<SaveSettings>,
    registry: Res<SchemaRegistry>,
    mut progress: ResMut<GameProgress>,
) {
    // Several requests in one frame collapse into a single reload
    if load_events.read().count() == 0 {
        return;
    }
    info!("Reloading from '{}'...", settings.save_key);
    let (loaded, report) = load_progress(&mut adapter, &settings, &registry);
    log_load(&report);
    *progress = loaded;
    complete_events.send(LoadCompleteEvent {
        found_save: report.is_some(),
        report,
    });
}

fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    mut complete_events: EventWriter<SaveCompleteEvent>,
    mut adapter: ResMut<StorageAdapter>,
    settings: Res<SaveSettings>,
    registry: Res<SchemaRegistry>,
    progress: Res<GameProgress>,
) {
    if save_events.read().count() == 0 {
        return;
    }
    info!("Saving to '{}'...", settings.save_key);
    if store_progress(&mut adapter, &settings, &registry, &progress) {
        info!("Save succeeded.");
        complete_events.send(SaveCompleteEvent {
            success: true,
            error_message: None,
        });
    } else {
        warn!("Save to '{}' FAILED; progress since the last save is at risk", settings.save_key);
        complete_events.send(SaveCompleteEvent {
            success: false,
            error_message: Some(format!("could not write '{}'", settings.save_key)),
        });
    }
}

fn handle_import_snapshot(
    mut import_events: EventReader<ImportSnapshotEvent>,
    mut complete_events: EventWriter<ImportCompleteEvent>,
    mut load_writer: EventWriter<LoadRequestEvent>,
    mut adapter: ResMut<StorageAdapter>,
    settings: Res<SaveSettings>,
    registry: Res<SchemaRegistry>,
) {
    for ev in import_events.read() {
        let accepted = import_snapshot(&mut adapter, &settings, &registry, &ev.raw);
        complete_events.send(ImportCompleteEvent { accepted });
        if accepted {
            // Full reload from the persisted copy, never a hot swap
            load_writer.send(LoadRequestEvent);
        }
    }
}

fn handle_export_snapshot(
    mut export_events: EventReader<ExportSnapshotEvent>,
    mut exported: EventWriter<SnapshotExportedEvent>,
    settings: Res<SaveSettings>,
    progress: Res<GameProgress>,
) {
    if export_events.read().count() == 0 {
        return;
    }
    let result = export_snapshot(&progress, &settings)
        .and_then(|snapshot| Ok((snapshot.to_json_pretty()?, snapshot.filename)));
    match result {
        Ok((json, filename)) => {
            info!("Exported snapshot {}", filename);
            exported.send(SnapshotExportedEvent { filename, json });
        }
        Err(e) => warn!("Export FAILED: {}", e),
    }
}

fn handle_new_game(
    mut new_game_events: EventReader<NewGameEvent>,
    mut save_writer: EventWriter<SaveRequestEvent>,
    registry: Res<SchemaRegistry>,
    mut progress: ResMut<GameProgress>,
) {
    if new_game_events.read().count() == 0 {
        return;
    }
    info!("Starting a new game; previous progress is discarded.");
    *progress = GameProgress::new_game(&registry);
    save_writer.send(SaveRequestEvent);
}

fn tick_autosave(
    time: Res<Time>,
    mut timer: ResMut<AutosaveTimer>,
    mut save_writer: EventWriter<SaveRequestEvent>,
) {
    let Some(timer) = timer.0.as_mut() else {
        return;
    };
    timer.tick(time.delta());
    if timer.just_finished() {
        debug!("Autosave");
        save_writer.send(SaveRequestEvent);
    }
}
