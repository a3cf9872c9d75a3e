//! The version ladder: any persisted record, however old or damaged, in;
//! a current-schema `GameProgress` out.
//!
//! The record is first read leniently into a draft (every field optional,
//! every malformed piece dropped), then each ladder step whose target is
//! above the draft's version runs in order, then the draft is hydrated
//! through the lean codec. Nothing in here fails.

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use super::lean::{estimate_total_time, expand, merge_veggies};
use super::version::{MigrationReport, SaveShape, SchemaVersion, CURRENT_CANNING_VERSION};
use crate::data::CANONICAL_UPGRADE_IDS;
use crate::shared::*;

// ──────────────────────────────────────────────────────────────────────────────
// DRAFT
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct DraftProcess {
    recipe_id: String,
    remaining_time: u32,
    /// Missing in records older than `ProcessTotals`.
    total_time: Option<u32>,
    automated: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct CanningDraft {
    upgrade_levels: BTreeMap<String, u32>,
    unlocked_recipes: BTreeSet<String>,
    completions: BTreeMap<String, u32>,
    processes: Vec<DraftProcess>,
    total_items_canned: u64,
    canning_experience: f64,
    /// Missing in records older than `AutoConfig`.
    auto_canning: Option<AutoCanningConfig>,
    /// Processing times stored on verbose recipes.
    saved_recipe_times: BTreeMap<String, u32>,
}

#[derive(Debug, Clone)]
struct SaveDraft {
    version: SchemaVersion,
    farm: FarmProgress,
    veggies: Vec<VeggieRecord>,
    canning: Option<CanningDraft>,
}

// ──────────────────────────────────────────────────────────────────────────────
// LADDER
// ──────────────────────────────────────────────────────────────────────────────

struct MigrationStep {
    /// Runs when the draft's version is below this.
    target: SchemaVersion,
    description: &'static str,
    apply: fn(&mut SaveDraft, &SchemaRegistry),
}

fn migration_ladder() -> [MigrationStep; 4] {
    [
        MigrationStep {
            target: SchemaVersion::CanningState,
            description: "Bootstrap canning state and merge upgrade levels by id",
            apply: bootstrap_canning,
        },
        MigrationStep {
            target: SchemaVersion::ProcessTotals,
            description: "Backfill totalTime on active processes",
            apply: backfill_process_totals,
        },
        MigrationStep {
            target: SchemaVersion::AutoConfig,
            description: "Backfill auto-canning config and veggie auto-purchasers",
            apply: backfill_auto_config,
        },
        MigrationStep {
            target: SchemaVersion::CannerUpgrade,
            description: "Add missing canonical upgrades at level 0",
            apply: backfill_canonical_upgrades,
        },
    ]
}

fn bootstrap_canning(draft: &mut SaveDraft, registry: &SchemaRegistry) {
    let canning = draft.canning.get_or_insert_with(CanningDraft::default);
    let saved = std::mem::take(&mut canning.upgrade_levels);
    canning.upgrade_levels = registry
        .upgrades
        .iter()
        .map(|def| (def.id.clone(), saved.get(&def.id).copied().unwrap_or(0)))
        .collect();
}

fn backfill_process_totals(draft: &mut SaveDraft, registry: &SchemaRegistry) {
    let Some(canning) = draft.canning.as_mut() else {
        return;
    };
    for process in &mut canning.processes {
        if process.total_time.is_some_and(|t| t > 0) {
            continue;
        }
        process.total_time = Some(estimate_total_time(
            registry,
            &process.recipe_id,
            canning.saved_recipe_times.get(&process.recipe_id).copied(),
            process.remaining_time,
        ));
    }
}

fn backfill_auto_config(draft: &mut SaveDraft, registry: &SchemaRegistry) {
    if let Some(canning) = draft.canning.as_mut() {
        canning.auto_canning.get_or_insert_with(AutoCanningConfig::default);
    }
    for record in &mut draft.veggies {
        match record {
            VeggieRecord::Full(veggie) if veggie.auto_purchasers.is_empty() => {
                veggie.auto_purchasers = registry
                    .auto_purchasers
                    .iter()
                    .map(|def| AutoPurchaserState {
                        id: def.id.clone(),
                        name: def.name.clone(),
                        target: def.target,
                        cost: def.cost,
                        cycle_days: def.cycle_days,
                        owned: false,
                        active: false,
                        timer: 0,
                    })
                    .collect();
            }
            VeggieRecord::Lean(veggie) if veggie.auto_purchasers.is_empty() => {
                veggie.auto_purchasers = registry
                    .auto_purchasers
                    .iter()
                    .map(|def| LeanAutoPurchaser {
                        id: def.id.clone(),
                        ..LeanAutoPurchaser::default()
                    })
                    .collect();
            }
            _ => {}
        }
    }
}

fn backfill_canonical_upgrades(draft: &mut SaveDraft, _registry: &SchemaRegistry) {
    if let Some(canning) = draft.canning.as_mut() {
        for id in CANONICAL_UPGRADE_IDS {
            canning.upgrade_levels.entry(id.to_string()).or_insert(0);
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// ENTRY POINT
// ──────────────────────────────────────────────────────────────────────────────

/// Brings a record of any vintage up to the current schema.
pub fn migrate(raw: &Value, registry: &SchemaRegistry) -> (GameProgress, MigrationReport) {
    let empty = Map::new();
    let object = raw.as_object().unwrap_or_else(|| {
        warn!("[Save] Record is not an object; starting from defaults");
        &empty
    });

    let (shape, canning) = read_canning(object);
    let stamp = object.get("canningVersion").and_then(as_u32);
    let original_version = match (stamp, shape) {
        (Some(stamp), _) => stamp,
        // Lean records are written by current code and carry no stamp
        (None, SaveShape::Lean) => CURRENT_CANNING_VERSION,
        (None, _) => SchemaVersion::Legacy.number(),
    };
    if original_version > CURRENT_CANNING_VERSION {
        warn!(
            "[Save] Record claims schema v{} but this build knows v{}; reading it as current",
            original_version, CURRENT_CANNING_VERSION
        );
    }

    let start = SchemaVersion::from_stamp(original_version);
    let mut draft = SaveDraft {
        version: start,
        farm: read_farm(object),
        veggies: read_veggies(object, registry),
        canning,
    };

    let mut steps_applied = 0;
    let mut step_descriptions = Vec::new();
    for step in migration_ladder() {
        if draft.version < step.target {
            (step.apply)(&mut draft, registry);
            draft.version = step.target;
            steps_applied += 1;
            step_descriptions.push(step.description);
        }
    }
    draft.version = SchemaVersion::CURRENT;

    if steps_applied > 0 {
        info!(
            "[Save] Migrated save {} -> {} ({} steps)",
            start,
            SchemaVersion::CURRENT,
            steps_applied
        );
    }

    let progress = hydrate(draft, registry);
    let report = MigrationReport {
        original_version,
        final_version: progress.schema_version,
        steps_applied,
        step_descriptions,
        shape,
    };
    (progress, report)
}

fn hydrate(draft: SaveDraft, registry: &SchemaRegistry) -> GameProgress {
    let mut farm = draft.farm;
    let overall_experience = farm.experience;
    let veggies = merge_veggies(&draft.veggies, overall_experience, registry);
    if farm.active_veggie >= veggies.len() {
        farm.active_veggie = 0;
    }

    let lean = draft.canning.map(into_lean).unwrap_or_default();
    let canning = expand(&lean, &veggies, overall_experience, registry);

    GameProgress {
        farm,
        veggies,
        canning,
        schema_version: draft.version.number(),
    }
}

fn into_lean(draft: CanningDraft) -> LeanCanningProgress {
    LeanCanningProgress {
        upgrade_levels: draft.upgrade_levels,
        unlocked_recipes: draft.unlocked_recipes,
        completions: draft.completions,
        active_processes: draft
            .processes
            .into_iter()
            .map(|p| LeanProcess {
                recipe_id: p.recipe_id,
                remaining_time: p.remaining_time,
                total_time: p.total_time.unwrap_or(0),
                automated: p.automated,
            })
            .collect(),
        total_items_canned: draft.total_items_canned,
        canning_experience: draft.canning_experience,
        auto_canning_config: draft.auto_canning.unwrap_or_default(),
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// LENIENT READERS
// ──────────────────────────────────────────────────────────────────────────────

fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    object.get(key).and_then(|v| Deserialize::deserialize(v).ok())
}

/// Non-negative, finite numbers only. Fractions are rounded.
fn as_u32(value: &Value) -> Option<u32> {
    let n = value.as_f64()?;
    (n.is_finite() && n >= 0.0).then(|| n.round().min(u32::MAX as f64) as u32)
}

fn as_u64(value: &Value) -> Option<u64> {
    let n = value.as_f64()?;
    (n.is_finite() && n >= 0.0).then(|| n.round().min(u64::MAX as f64) as u64)
}

fn string_set(value: Option<&Value>) -> BTreeSet<String> {
    value
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

fn count_map(value: Option<&Value>) -> BTreeMap<String, u32> {
    value
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(id, n)| as_u32(n).map(|n| (id.clone(), n)))
                .collect()
        })
        .unwrap_or_default()
}

/// Each scalar is read on its own; a bad one falls back to its default.
fn read_farm(object: &Map<String, Value>) -> FarmProgress {
    let d = FarmProgress::default();
    FarmProgress {
        money: field(object, "money").unwrap_or(d.money),
        experience: field(object, "experience").unwrap_or(d.experience),
        knowledge: field(object, "knowledge").unwrap_or(d.knowledge),
        day: object.get("day").and_then(as_u32).unwrap_or(d.day),
        active_veggie: field(object, "activeVeggie").unwrap_or(d.active_veggie),
        max_plots: object.get("maxPlots").and_then(as_u32).unwrap_or(d.max_plots),
        farm_tier: object.get("farmTier").and_then(as_u32).unwrap_or(d.farm_tier),
        farm_cost: field(object, "farmCost").unwrap_or(d.farm_cost),
        almanac_level: object.get("almanacLevel").and_then(as_u32).unwrap_or(d.almanac_level),
        almanac_cost: field(object, "almanacCost").unwrap_or(d.almanac_cost),
        irrigation_owned: field(object, "irrigationOwned").unwrap_or(d.irrigation_owned),
        heirloom_owned: field(object, "heirloomOwned").unwrap_or(d.heirloom_owned),
        auto_sell_owned: field(object, "autoSellOwned").unwrap_or(d.auto_sell_owned),
        greenhouse_owned: field(object, "greenhouseOwned").unwrap_or(d.greenhouse_owned),
    }
}

fn read_veggies(object: &Map<String, Value>, registry: &SchemaRegistry) -> Vec<VeggieRecord> {
    let Some(entries) = object.get("veggies").and_then(Value::as_array) else {
        return Vec::new();
    };
    let records: Vec<VeggieRecord> = entries
        .iter()
        .filter_map(|entry| read_veggie(entry, registry))
        .collect();
    if records.len() < entries.len() {
        warn!(
            "[Save] Dropped {} veggie record(s) with neither a name nor an id",
            entries.len() - records.len()
        );
    }
    records
}

/// `name` marks a full record, otherwise `id` marks a lean one. Past the
/// marker every field is read on its own like the farm scalars.
fn read_veggie(value: &Value, registry: &SchemaRegistry) -> Option<VeggieRecord> {
    let object = value.as_object()?;
    let count = |key: &str| object.get(key).and_then(as_u64).unwrap_or(0);
    let level = |key: &str| object.get(key).and_then(as_u32).unwrap_or(0);
    let growth = field(object, "growth").unwrap_or(0.0);
    let unlocked = field(object, "unlocked").unwrap_or(false);
    let sprinkler_owned = field(object, "sprinklerOwned").unwrap_or(false);
    let purchasers = object.get("autoPurchasers").and_then(Value::as_array);

    if object.contains_key("name") {
        let name = object.get("name")?.as_str()?.to_string();
        let d = VeggieState::default();
        return Some(VeggieRecord::Full(VeggieState {
            name,
            growth,
            growth_rate: field(object, "growthRate").unwrap_or(d.growth_rate),
            stash: count("stash"),
            seeds: count("seeds"),
            seed_cost: field(object, "seedCost").unwrap_or(d.seed_cost),
            sale_price: field(object, "salePrice").unwrap_or(d.sale_price),
            experience_to_unlock: field(object, "experienceToUnlock").unwrap_or(d.experience_to_unlock),
            unlocked,
            fertilizer_level: level("fertilizerLevel"),
            harvester_level: level("harvesterLevel"),
            better_seeds_level: level("betterSeedsLevel"),
            additional_plots: level("additionalPlots"),
            sprinkler_owned,
            auto_purchasers: purchasers
                .into_iter()
                .flatten()
                .filter_map(|entry| read_full_auto_purchaser(entry, registry))
                .collect(),
        }));
    }

    let id = object.get("id")?.as_str()?.to_string();
    Some(VeggieRecord::Lean(LeanVeggie {
        id,
        growth,
        stash: count("stash"),
        seeds: count("seeds"),
        unlocked,
        fertilizer_level: level("fertilizerLevel"),
        harvester_level: level("harvesterLevel"),
        better_seeds_level: level("betterSeedsLevel"),
        additional_plots: level("additionalPlots"),
        sprinkler_owned,
        auto_purchasers: purchasers
            .into_iter()
            .flatten()
            .filter_map(read_lean_auto_purchaser)
            .collect(),
    }))
}

fn read_lean_auto_purchaser(value: &Value) -> Option<LeanAutoPurchaser> {
    let object = value.as_object()?;
    Some(LeanAutoPurchaser {
        id: object.get("id")?.as_str()?.to_string(),
        owned: field(object, "owned").unwrap_or(false),
        active: field(object, "active").unwrap_or(false),
        timer: object.get("timer").and_then(as_u32).unwrap_or(0),
    })
}

/// Static fields come from the registry; ids it no longer defines are
/// dropped here rather than at expansion.
fn read_full_auto_purchaser(value: &Value, registry: &SchemaRegistry) -> Option<AutoPurchaserState> {
    let saved = read_lean_auto_purchaser(value)?;
    let def = registry.auto_purchaser(&saved.id)?;
    Some(AutoPurchaserState {
        id: saved.id,
        name: def.name.clone(),
        target: def.target,
        cost: def.cost,
        cycle_days: def.cycle_days,
        owned: saved.owned,
        active: saved.active,
        timer: saved.timer,
    })
}

fn read_process(value: &Value) -> Option<DraftProcess> {
    let object = value.as_object()?;
    let recipe_id = object.get("recipeId")?.as_str()?.to_string();
    Some(DraftProcess {
        recipe_id,
        remaining_time: object.get("remainingTime").and_then(as_u32).unwrap_or(0),
        total_time: object.get("totalTime").and_then(as_u32).filter(|&t| t > 0),
        automated: field(object, "automated").unwrap_or(false),
    })
}

fn read_processes(value: Option<&Value>) -> Vec<DraftProcess> {
    value
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(read_process).collect())
        .unwrap_or_default()
}

/// Auto-canning config merged key by key over the defaults.
fn read_auto_canning(value: Option<&Value>) -> Option<AutoCanningConfig> {
    let object = value?.as_object()?;
    let d = AutoCanningConfig::default();
    Some(AutoCanningConfig {
        enabled: field(object, "enabled").unwrap_or(d.enabled),
        selected_recipes: object
            .get("selectedRecipes")
            .map(|v| string_set(Some(v)))
            .unwrap_or(d.selected_recipes),
        priority_order: field(object, "priorityOrder").unwrap_or(d.priority_order),
        only_use_excess: field(object, "onlyUseExcess").unwrap_or(d.only_use_excess),
        excess_threshold: object
            .get("excessThreshold")
            .and_then(as_u32)
            .unwrap_or(d.excess_threshold),
    })
}

fn read_canning(object: &Map<String, Value>) -> (SaveShape, Option<CanningDraft>) {
    if let Some(verbose) = object.get("canningState").filter(|v| !v.is_null()) {
        let draft = read_verbose_canning(verbose);
        if draft.is_none() {
            warn!("[Save] canningState is malformed; resetting canning progress");
        }
        return (SaveShape::Versioned, draft);
    }
    if let Some(lean) = object.get("canningProgress").filter(|v| !v.is_null()) {
        let draft = read_lean_canning(lean);
        if draft.is_none() {
            warn!("[Save] canningProgress is malformed; resetting canning progress");
        }
        return (SaveShape::Lean, draft);
    }
    (SaveShape::FarmOnly, None)
}

fn read_verbose_canning(value: &Value) -> Option<CanningDraft> {
    let object = value.as_object()?;
    let mut draft = CanningDraft {
        unlocked_recipes: string_set(object.get("unlockedRecipes")),
        processes: read_processes(object.get("activeProcesses")),
        total_items_canned: object.get("totalItemsCanned").and_then(as_u64).unwrap_or(0),
        canning_experience: field(object, "canningExperience").unwrap_or(0.0),
        auto_canning: read_auto_canning(object.get("autoCanningConfig")),
        ..CanningDraft::default()
    };

    for upgrade in object.get("upgrades").and_then(Value::as_array).into_iter().flatten() {
        let Some(id) = upgrade.get("id").and_then(Value::as_str) else {
            continue;
        };
        let level = upgrade.get("level").and_then(as_u32).unwrap_or(0);
        draft.upgrade_levels.insert(id.to_string(), level);
    }

    for recipe in object.get("recipes").and_then(Value::as_array).into_iter().flatten() {
        let Some(recipe) = recipe.as_object() else {
            continue;
        };
        let Some(id) = recipe.get("id").and_then(Value::as_str) else {
            continue;
        };
        if field(recipe, "unlocked").unwrap_or(false) {
            draft.unlocked_recipes.insert(id.to_string());
        }
        if let Some(n) = recipe.get("timesCompleted").and_then(as_u32).filter(|&n| n > 0) {
            draft.completions.insert(id.to_string(), n);
        }
        if let Some(t) = recipe.get("processingTime").and_then(as_u32).filter(|&t| t > 0) {
            draft.saved_recipe_times.insert(id.to_string(), t);
        }
    }

    Some(draft)
}

fn read_lean_canning(value: &Value) -> Option<CanningDraft> {
    let object = value.as_object()?;
    Some(CanningDraft {
        upgrade_levels: count_map(object.get("upgradeLevels")),
        unlocked_recipes: string_set(object.get("unlockedRecipes")),
        completions: count_map(object.get("completions")),
        processes: read_processes(object.get("activeProcesses")),
        total_items_canned: object.get("totalItemsCanned").and_then(as_u64).unwrap_or(0),
        canning_experience: field(object, "canningExperience").unwrap_or(0.0),
        auto_canning: read_auto_canning(object.get("autoCanningConfig")),
        saved_recipe_times: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canning::{advance_processes, purchase_upgrade, start_process};
    use crate::save::lean::{compact, to_lean_save, to_versioned_save};
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::current()
    }

    /// A consistent mid-game state built through the normal gameplay paths.
    fn played_progress(registry: &SchemaRegistry) -> GameProgress {
        let mut progress = GameProgress::new_game(registry);
        progress.farm.money = 50_000.0;
        progress.farm.experience = 6_000.0;
        progress.farm.knowledge = 12.5;
        progress.farm.day = 48;
        progress.farm.greenhouse_owned = true;
        progress.veggies = merge_veggies(&[], 6_000.0, registry);
        progress.veggies[1].stash = 33;
        progress.veggies[1].auto_purchasers[0].owned = true;

        let mut lean = compact(&progress.canning);
        lean.canning_experience = 600.0;
        lean.total_items_canned = 19;
        lean.completions.insert("pickled_beets".into(), 4);
        progress.canning = expand(&lean, &progress.veggies, 6_000.0, registry);

        purchase_upgrade(&mut progress, "automation").unwrap();
        purchase_upgrade(&mut progress, "speed").unwrap();
        start_process(&mut progress.canning, "pickled_beets", false).unwrap();
        start_process(&mut progress.canning, "garlic_pickles", true).unwrap();
        advance_processes(&mut progress.canning, 5);
        progress
    }

    fn verbose_save(canning_state: Value, canning_version: Option<u32>) -> Value {
        let mut save = json!({
            "money": 120.0,
            "experience": 6000.0,
            "knowledge": 3.0,
            "day": 9,
            "maxPlots": 6,
            "farmTier": 2,
            "veggies": [{ "name": "Beets", "stash": 5, "unlocked": true }],
            "canningState": canning_state
        });
        if let Some(version) = canning_version {
            save["canningVersion"] = json!(version);
        }
        save
    }

    #[test]
    fn test_ladder_targets_are_contiguous() {
        let ladder = migration_ladder();
        for (step, version) in ladder.iter().zip(SchemaVersion::ALL.iter().skip(1)) {
            assert_eq!(step.target, *version);
        }
        assert_eq!(ladder.last().map(|s| s.target), Some(SchemaVersion::CURRENT));
    }

    #[test]
    fn test_current_versioned_record_is_unchanged() {
        let registry = registry();
        let progress = played_progress(&registry);
        let raw = serde_json::to_value(to_versioned_save(&progress)).unwrap();

        let (migrated, report) = migrate(&raw, &registry);

        assert_eq!(report.steps_applied, 0);
        assert_eq!(report.shape, SaveShape::Versioned);
        assert_eq!(migrated, progress);
    }

    #[test]
    fn test_current_lean_record_is_unchanged() {
        let registry = registry();
        let progress = played_progress(&registry);
        let raw = serde_json::to_value(to_lean_save(&progress, &registry)).unwrap();

        let (migrated, report) = migrate(&raw, &registry);

        assert_eq!(report.original_version, CURRENT_CANNING_VERSION);
        assert_eq!(report.steps_applied, 0);
        assert_eq!(report.shape, SaveShape::Lean);
        assert_eq!(migrated, progress);
    }

    #[test]
    fn test_migration_is_idempotent() {
        let registry = registry();
        let old = verbose_save(
            json!({
                "upgrades": [{ "id": "speed", "level": 2 }],
                "recipes": [{ "id": "carrot_relish", "unlocked": true, "timesCompleted": 3 }],
                "activeProcesses": [{ "recipeId": "carrot_relish", "remainingTime": 10 }],
                "canningExperience": 150.0
            }),
            None,
        );
        let (once, _) = migrate(&old, &registry);
        let again_raw = serde_json::to_value(to_versioned_save(&once)).unwrap();
        let (twice, report) = migrate(&again_raw, &registry);
        assert_eq!(report.steps_applied, 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_progress_survives_every_starting_version() {
        let registry = registry();
        for version in [None, Some(0), Some(1), Some(2), Some(3), Some(4)] {
            let raw = verbose_save(
                json!({
                    "recipes": [],
                    "upgrades": [{ "id": "efficiency", "level": 3 }],
                    "activeProcesses": [],
                    "canningExperience": 500.0,
                    "totalItemsCanned": 50
                }),
                version,
            );
            let (progress, _) = migrate(&raw, &registry);
            assert_eq!(progress.canning.canning_experience, 500.0, "version {:?}", version);
            assert_eq!(progress.canning.total_items_canned, 50, "version {:?}", version);
            assert_eq!(
                progress.canning.upgrade("efficiency").map(|u| u.level),
                Some(3),
                "version {:?}",
                version
            );
            assert_eq!(progress.schema_version, CURRENT_CANNING_VERSION);
        }
    }

    #[test]
    fn test_missing_canner_is_backfilled_at_level_zero() {
        let registry = registry();
        let raw = verbose_save(
            json!({
                "recipes": [],
                "upgrades": [
                    { "id": "speed", "level": 1 },
                    { "id": "efficiency", "level": 1 },
                    { "id": "quality", "level": 1 },
                    { "id": "automation", "level": 1 }
                ],
                "activeProcesses": []
            }),
            Some(3),
        );
        let (progress, report) = migrate(&raw, &registry);
        assert_eq!(progress.canning.upgrade("canner").map(|u| u.level), Some(0));
        assert_eq!(progress.canning.upgrade("automation").map(|u| u.level), Some(1));
        assert_eq!(report.steps_applied, 1);
        assert_eq!(report.step_descriptions, vec!["Add missing canonical upgrades at level 0"]);
    }

    #[test]
    fn test_canonical_backfill_step_is_idempotent() {
        let mut draft = SaveDraft {
            version: SchemaVersion::AutoConfig,
            farm: FarmProgress::default(),
            veggies: vec![],
            canning: Some(CanningDraft::default()),
        };
        backfill_canonical_upgrades(&mut draft, &registry());
        let once = draft.canning.clone();
        backfill_canonical_upgrades(&mut draft, &registry());
        assert_eq!(draft.canning, once);
        assert_eq!(once.map(|c| c.upgrade_levels.len()), Some(CANONICAL_UPGRADE_IDS.len()));
    }

    #[test]
    fn test_legacy_save_without_canning_bootstraps_defaults() {
        let registry = registry();
        let raw = json!({
            "money": 10.0, "experience": 0.0, "knowledge": 0.0,
            "day": 3, "maxPlots": 4, "farmTier": 1, "veggies": []
        });
        let (progress, report) = migrate(&raw, &registry);
        assert_eq!(report.shape, SaveShape::FarmOnly);
        assert_eq!(report.steps_applied, 4);
        assert_eq!(progress.farm.day, 3);
        assert_eq!(progress.veggies.len(), registry.veggies.len());
        assert_eq!(progress.canning, GameProgress::new_game(&registry).canning);
    }

    #[test]
    fn test_process_totals_backfilled_from_registry() {
        let registry = registry();
        let raw = verbose_save(
            json!({
                "recipes": [{ "id": "ghost_jam", "processingTime": 77 }],
                "upgrades": [],
                "activeProcesses": [
                    { "recipeId": "carrot_relish", "remainingTime": 10 },
                    { "recipeId": "pickled_beets", "remainingTime": 0, "completed": false }
                ]
            }),
            Some(1),
        );
        let (progress, _) = migrate(&raw, &registry);
        let processes = &progress.canning.active_processes;
        assert_eq!(processes.len(), 2);
        assert_eq!(processes[0].total_time, 45);
        assert!(!processes[0].completed);
        assert!(processes[1].completed, "remainingTime 0 always means completed");
    }

    #[test]
    fn test_stamped_lean_record_runs_the_ladder() {
        let registry = registry();
        let raw = json!({
            "money": 0, "experience": 0, "knowledge": 0, "day": 1,
            "maxPlots": 4, "farmTier": 1,
            "veggies": [{ "id": "beets", "stash": 2 }],
            "canningProgress": {
                "upgradeLevels": { "speed": 4 },
                "activeProcesses": [{ "recipeId": "garlic_pickles", "remainingTime": 20 }]
            },
            "canningVersion": 1
        });
        let (progress, report) = migrate(&raw, &registry);
        assert_eq!(report.shape, SaveShape::Lean);
        assert_eq!(report.steps_applied, 3);
        assert_eq!(progress.canning.active_processes[0].total_time, 60);
        assert_eq!(progress.canning.upgrade("speed").map(|u| u.level), Some(4));
        assert_eq!(progress.veggies[0].stash, 2);
    }

    #[test]
    fn test_future_version_is_read_as_current() {
        let registry = registry();
        let raw = verbose_save(
            json!({ "recipes": [], "upgrades": [{ "id": "speed", "level": 1 }], "activeProcesses": [] }),
            Some(42),
        );
        let (progress, report) = migrate(&raw, &registry);
        assert_eq!(report.original_version, 42);
        assert_eq!(report.steps_applied, 0);
        assert_eq!(progress.schema_version, CURRENT_CANNING_VERSION);
        assert_eq!(progress.canning.upgrade("speed").map(|u| u.level), Some(1));
    }

    #[test]
    fn test_malformed_scalars_fall_back_individually() {
        let registry = registry();
        let raw = json!({
            "money": "lots",
            "experience": 250.0,
            "knowledge": null,
            "day": -4,
            "maxPlots": 9,
            "farmTier": 2,
            "veggies": "beets"
        });
        let (progress, _) = migrate(&raw, &registry);
        assert_eq!(progress.farm.money, 0.0);
        assert_eq!(progress.farm.experience, 250.0);
        assert_eq!(progress.farm.day, 1);
        assert_eq!(progress.farm.max_plots, 9);
        assert_eq!(progress.veggies.len(), registry.veggies.len());
    }

    #[test]
    fn test_malformed_canning_is_treated_as_absent() {
        let registry = registry();
        let raw = verbose_save(json!("corrupted"), Some(4));
        let (progress, _) = migrate(&raw, &registry);
        assert_eq!(progress.canning.total_items_canned, 0);
        assert_eq!(progress.canning.upgrades.len(), registry.upgrades.len());
        assert_eq!(progress.farm.money, 120.0);
    }

    #[test]
    fn test_bad_processes_and_upgrades_are_skipped_one_by_one() {
        let registry = registry();
        let raw = verbose_save(
            json!({
                "recipes": [17, { "id": "carrot_relish", "timesCompleted": 2 }],
                "upgrades": ["speed", { "id": "quality", "level": 2 }, { "level": 5 }],
                "activeProcesses": [
                    { "remainingTime": 3 },
                    { "recipeId": "carrot_relish", "remainingTime": -8.0, "totalTime": 45 }
                ]
            }),
            Some(4),
        );
        let (progress, _) = migrate(&raw, &registry);
        assert_eq!(progress.canning.upgrade("quality").map(|u| u.level), Some(2));
        assert_eq!(progress.canning.recipe("carrot_relish").map(|r| r.times_completed), Some(2));
        assert_eq!(progress.canning.active_processes.len(), 1);
        assert_eq!(progress.canning.active_processes[0].remaining_time, 0);
        assert!(progress.canning.active_processes[0].completed);
    }

    #[test]
    fn test_veggie_unlock_and_auto_purchaser_backfill() {
        let registry = registry();
        let raw = json!({
            "money": 0, "experience": 600.0, "knowledge": 0, "day": 1,
            "maxPlots": 4, "farmTier": 1,
            "veggies": [
                { "name": "Beets", "stash": 1 },
                { "name": "Tomatoes", "unlocked": true },
                { "nonsense": true }
            ]
        });
        let (progress, _) = migrate(&raw, &registry);
        let by_name = |name: &str| progress.veggies.iter().find(|v| v.name == name).unwrap();
        assert!(by_name("Radishes").unlocked, "600 xp meets the 500 threshold");
        assert!(by_name("Tomatoes").unlocked, "saved unlock is kept");
        assert!(!by_name("Onions").unlocked);
        assert!(by_name("Beets")
            .auto_purchasers
            .iter()
            .all(|a| !a.owned && a.cycle_days > 0));
        assert_eq!(by_name("Beets").auto_purchasers.len(), registry.auto_purchasers.len());
    }

    #[test]
    fn test_non_object_record_yields_new_game() {
        let registry = registry();
        let (progress, report) = migrate(&json!([1, 2, 3]), &registry);
        assert_eq!(report.shape, SaveShape::FarmOnly);
        assert_eq!(progress, GameProgress::new_game(&registry));
    }

    fn farm_with_veggies(veggies: Value) -> Value {
        json!({
            "money": 10, "experience": 0, "knowledge": 0, "day": 4,
            "maxPlots": 4, "farmTier": 1,
            "veggies": veggies
        })
    }

    #[test]
    fn test_one_bad_veggie_field_keeps_the_rest_of_the_veggie() {
        let registry = registry();
        let raw = farm_with_veggies(json!([
            { "name": "Beets", "stash": 12.5, "fertilizerLevel": 3, "seeds": 7 },
            { "id": "carrots", "growth": "fast", "stash": 8, "harvesterLevel": -2, "betterSeedsLevel": 1 }
        ]));
        let (progress, _) = migrate(&raw, &registry);

        let beets = &progress.veggies[0];
        assert_eq!(beets.stash, 13, "fractions round like the canning counters");
        assert_eq!(beets.fertilizer_level, 3);
        assert_eq!(beets.seeds, 7);

        let carrots = &progress.veggies[1];
        assert_eq!(carrots.growth, 0.0);
        assert_eq!(carrots.stash, 8);
        assert_eq!(carrots.harvester_level, 0);
        assert_eq!(carrots.better_seeds_level, 1);
    }

    #[test]
    fn test_partial_auto_purchaser_entries_are_read_by_id() {
        let registry = registry();
        let raw = farm_with_veggies(json!([{
            "name": "Beets",
            "stash": 40,
            "harvesterLevel": 2,
            "autoPurchasers": [
                { "id": "auto_fertilizer", "owned": true },
                { "id": "auto_harvester", "active": "yes", "timer": 2.4 },
                { "id": "auto_sprinkler", "owned": true },
                { "owned": true }
            ]
        }]));
        let (progress, _) = migrate(&raw, &registry);
        let beets = &progress.veggies[0];
        assert_eq!(beets.stash, 40);
        assert_eq!(beets.harvester_level, 2);
        assert_eq!(beets.auto_purchasers.len(), registry.auto_purchasers.len());

        let purchaser = |id: &str| beets.auto_purchasers.iter().find(|a| a.id == id).unwrap();
        assert!(purchaser("auto_fertilizer").owned);
        assert!(!purchaser("auto_harvester").active);
        assert_eq!(purchaser("auto_harvester").timer, 2);
        assert!(!purchaser("auto_plot").owned);
        assert_eq!(purchaser("auto_fertilizer").cost, registry.auto_purchasers[0].cost);
    }

    #[test]
    fn test_veggie_marker_decides_the_shape() {
        let registry = registry();
        let full = read_veggie(&json!({ "id": "beets", "name": "Beets", "stash": 1 }), &registry);
        assert!(matches!(full, Some(VeggieRecord::Full(ref v)) if v.name == "Beets" && v.stash == 1));

        let lean = read_veggie(&json!({ "id": "carrots", "seeds": 2 }), &registry);
        assert!(matches!(lean, Some(VeggieRecord::Lean(ref v)) if v.id == "carrots" && v.seeds == 2));

        assert!(read_veggie(&json!({ "growth": 3.0 }), &registry).is_none());
        assert!(read_veggie(&json!({ "name": 5, "id": "beets" }), &registry).is_none());
        assert!(read_veggie(&json!([1, 2]), &registry).is_none());
    }
}
