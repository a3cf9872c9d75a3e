//! Compact persisted projection of the game state and its expansion back
//! into the fully hydrated, current-schema form.
//!
//! Compaction keeps only what the player changed: levels, counts, ids and
//! flags. Expansion starts from the registry and overlays those deltas, so
//! static fields always reflect the current definitions and ids the registry
//! no longer knows are dropped.

use std::collections::{BTreeMap, BTreeSet};

use super::version::CURRENT_CANNING_VERSION;
use crate::canning::{max_simultaneous_processes, recipe_unlocked};
use crate::shared::*;

// ──────────────────────────────────────────────────────────────────────────────
// CANNING
// ──────────────────────────────────────────────────────────────────────────────

pub fn compact(state: &CanningState) -> LeanCanningProgress {
    let upgrade_levels: BTreeMap<String, u32> = state
        .upgrades
        .iter()
        .map(|u| (u.id.clone(), u.level))
        .collect();

    let mut unlocked_recipes = state.unlocked_recipes.clone();
    unlocked_recipes.extend(state.recipes.iter().filter(|r| r.unlocked).map(|r| r.id.clone()));

    let completions: BTreeMap<String, u32> = state
        .recipes
        .iter()
        .filter(|r| r.times_completed > 0)
        .map(|r| (r.id.clone(), r.times_completed))
        .collect();

    let active_processes = state
        .active_processes
        .iter()
        .map(|p| LeanProcess {
            recipe_id: p.recipe_id.clone(),
            remaining_time: p.remaining_time,
            total_time: p.total_time,
            automated: p.automated,
        })
        .collect();

    LeanCanningProgress {
        upgrade_levels,
        unlocked_recipes,
        completions,
        active_processes,
        total_items_canned: state.total_items_canned,
        canning_experience: state.canning_experience,
        auto_canning_config: state.auto_canning_config.clone(),
    }
}

/// Rebuilds the verbose canning state from registry definitions plus saved
/// deltas. `veggies` is the current veggie list, used to resolve each
/// ingredient's index. A recipe stays unlocked once it has been unlocked.
pub fn expand(
    lean: &LeanCanningProgress,
    veggies: &[VeggieState],
    overall_experience: f64,
    registry: &SchemaRegistry,
) -> CanningState {
    let upgrades: Vec<UpgradeInstance> = registry
        .upgrades
        .iter()
        .map(|def| {
            let level = lean.upgrade_levels.get(&def.id).copied().unwrap_or(0);
            UpgradeInstance::from_def(def, level)
        })
        .collect();

    let mut unlocked_recipes = BTreeSet::new();
    let recipes: Vec<RecipeInstance> = registry
        .recipes
        .iter()
        .enumerate()
        .map(|(position, def)| {
            let unlocked = lean.unlocked_recipes.contains(&def.id)
                || recipe_unlocked(
                    position,
                    def.experience_required,
                    overall_experience,
                    lean.canning_experience,
                );
            if unlocked {
                unlocked_recipes.insert(def.id.clone());
            }
            RecipeInstance {
                id: def.id.clone(),
                name: def.name.clone(),
                ingredients: resolve_ingredients(&def.ingredients, veggies),
                processing_time: def.processing_time,
                sale_price: def.sale_price,
                experience_required: def.experience_required,
                category: def.category,
                unlocked,
                times_completed: lean.completions.get(&def.id).copied().unwrap_or(0),
            }
        })
        .collect();

    let active_processes = lean
        .active_processes
        .iter()
        .filter(|p| registry.recipe(&p.recipe_id).is_some())
        .map(|p| expand_process(p, registry))
        .collect();

    let max_simultaneous_processes = max_simultaneous_processes(&upgrades);

    CanningState {
        recipes,
        upgrades,
        unlocked_recipes,
        active_processes,
        total_items_canned: lean.total_items_canned,
        canning_experience: lean.canning_experience,
        max_simultaneous_processes,
        auto_canning_config: lean.auto_canning_config.clone(),
    }
}

fn resolve_ingredients(defs: &[IngredientDef], veggies: &[VeggieState]) -> Vec<Ingredient> {
    defs.iter()
        .map(|def| Ingredient {
            veggie_name: def.veggie_name.clone(),
            veggie_index: veggies.iter().position(|v| v.name == def.veggie_name),
            quantity: def.quantity,
        })
        .collect()
}

/// Stand-in `totalTime` for a process saved without one: the recipe's
/// current time, then the time stored alongside the save, then the time
/// left. The recipe may have been retuned since the process started.
pub(crate) fn estimate_total_time(
    registry: &SchemaRegistry,
    recipe_id: &str,
    saved_time: Option<u32>,
    remaining_time: u32,
) -> u32 {
    registry
        .recipe(recipe_id)
        .map(|r| r.processing_time)
        .or(saved_time)
        .filter(|&t| t > 0)
        .unwrap_or_else(|| remaining_time.max(1))
}

fn expand_process(lean: &LeanProcess, registry: &SchemaRegistry) -> ProcessInstance {
    let total_time = if lean.total_time == 0 {
        estimate_total_time(registry, &lean.recipe_id, None, lean.remaining_time)
    } else {
        lean.total_time
    };
    let mut process = ProcessInstance {
        recipe_id: lean.recipe_id.clone(),
        remaining_time: lean.remaining_time,
        total_time,
        completed: false,
        automated: lean.automated,
    };
    process.refresh_completed();
    process
}

// ──────────────────────────────────────────────────────────────────────────────
// VEGGIES
// ──────────────────────────────────────────────────────────────────────────────

/// `None` for a veggie the registry no longer defines.
pub fn compact_veggie(veggie: &VeggieState, registry: &SchemaRegistry) -> Option<LeanVeggie> {
    let def = registry.veggie_by_name(&veggie.name)?;
    Some(LeanVeggie {
        id: def.id.clone(),
        growth: veggie.growth,
        stash: veggie.stash,
        seeds: veggie.seeds,
        unlocked: veggie.unlocked,
        fertilizer_level: veggie.fertilizer_level,
        harvester_level: veggie.harvester_level,
        better_seeds_level: veggie.better_seeds_level,
        additional_plots: veggie.additional_plots,
        sprinkler_owned: veggie.sprinkler_owned,
        auto_purchasers: veggie
            .auto_purchasers
            .iter()
            .map(|a| LeanAutoPurchaser {
                id: a.id.clone(),
                owned: a.owned,
                active: a.active,
                timer: a.timer,
            })
            .collect(),
    })
}

/// Registry defaults for one veggie: nothing grown, nothing owned.
pub fn default_veggie(
    def: &VeggieDef,
    overall_experience: f64,
    registry: &SchemaRegistry,
) -> VeggieState {
    VeggieState {
        name: def.name.clone(),
        growth_rate: def.growth_rate,
        seed_cost: def.seed_cost,
        sale_price: def.sale_price,
        experience_to_unlock: def.experience_to_unlock,
        unlocked: overall_experience >= def.experience_to_unlock,
        auto_purchasers: registry
            .auto_purchasers
            .iter()
            .map(|ap| auto_purchaser_state(ap, None))
            .collect(),
        ..VeggieState::default()
    }
}

fn auto_purchaser_state(def: &AutoPurchaserDef, saved: Option<&LeanAutoPurchaser>) -> AutoPurchaserState {
    let saved = saved.cloned().unwrap_or_default();
    AutoPurchaserState {
        id: def.id.clone(),
        name: def.name.clone(),
        target: def.target,
        cost: def.cost,
        cycle_days: def.cycle_days,
        owned: saved.owned,
        active: saved.active,
        timer: saved.timer,
    }
}

/// Overlays a saved veggie record of either shape on the registry defaults.
pub fn expand_veggie(
    def: &VeggieDef,
    saved: &VeggieRecord,
    overall_experience: f64,
    registry: &SchemaRegistry,
) -> VeggieState {
    let lean = match saved {
        VeggieRecord::Lean(lean) => lean.clone(),
        VeggieRecord::Full(full) => LeanVeggie {
            id: def.id.clone(),
            growth: full.growth,
            stash: full.stash,
            seeds: full.seeds,
            unlocked: full.unlocked,
            fertilizer_level: full.fertilizer_level,
            harvester_level: full.harvester_level,
            better_seeds_level: full.better_seeds_level,
            additional_plots: full.additional_plots,
            sprinkler_owned: full.sprinkler_owned,
            auto_purchasers: full
                .auto_purchasers
                .iter()
                .map(|a| LeanAutoPurchaser {
                    id: a.id.clone(),
                    owned: a.owned,
                    active: a.active,
                    timer: a.timer,
                })
                .collect(),
        },
    };

    let mut veggie = default_veggie(def, overall_experience, registry);
    veggie.growth = lean.growth.max(0.0);
    veggie.stash = lean.stash;
    veggie.seeds = lean.seeds;
    veggie.unlocked |= lean.unlocked;
    veggie.fertilizer_level = lean.fertilizer_level;
    veggie.harvester_level = lean.harvester_level;
    veggie.better_seeds_level = lean.better_seeds_level;
    veggie.additional_plots = lean.additional_plots;
    veggie.sprinkler_owned = lean.sprinkler_owned;
    veggie.auto_purchasers = registry
        .auto_purchasers
        .iter()
        .map(|ap| auto_purchaser_state(ap, lean.auto_purchasers.iter().find(|s| s.id == ap.id)))
        .collect();
    veggie
}

/// Builds the veggie list in registry order. Records are matched by name
/// (full) or id (lean); unknown records are dropped, missing ones get
/// defaults.
pub fn merge_veggies(
    records: &[VeggieRecord],
    overall_experience: f64,
    registry: &SchemaRegistry,
) -> Vec<VeggieState> {
    registry
        .veggies
        .iter()
        .map(|def| {
            let saved = records.iter().find(|record| match record {
                VeggieRecord::Full(full) => full.name == def.name,
                VeggieRecord::Lean(lean) => lean.id == def.id,
            });
            match saved {
                Some(record) => expand_veggie(def, record, overall_experience, registry),
                None => default_veggie(def, overall_experience, registry),
            }
        })
        .collect()
}

// ──────────────────────────────────────────────────────────────────────────────
// ROOT RECORDS
// ──────────────────────────────────────────────────────────────────────────────

impl GameProgress {
    /// A fresh farm: registry defaults everywhere, every recipe locked unless
    /// its threshold is zero, every upgrade at level 0.
    pub fn new_game(registry: &SchemaRegistry) -> Self {
        let farm = FarmProgress::default();
        let veggies = merge_veggies(&[], farm.experience, registry);
        let canning = expand(&LeanCanningProgress::default(), &veggies, farm.experience, registry);
        Self {
            farm,
            veggies,
            canning,
            schema_version: CURRENT_CANNING_VERSION,
        }
    }
}

/// Canonical persisted shape. Carries no version stamp.
pub fn to_lean_save(progress: &GameProgress, registry: &SchemaRegistry) -> LeanSave {
    LeanSave {
        farm: progress.farm.clone(),
        veggies: progress
            .veggies
            .iter()
            .filter_map(|v| compact_veggie(v, registry))
            .collect(),
        canning_progress: Some(compact(&progress.canning)),
    }
}

/// Verbose, stamped shape used for exports.
pub fn to_versioned_save(progress: &GameProgress) -> VersionedSave {
    VersionedSave {
        farm: progress.farm.clone(),
        veggies: progress.veggies.clone(),
        canning_state: Some(progress.canning.clone()),
        canning_version: Some(CURRENT_CANNING_VERSION),
    }
}
