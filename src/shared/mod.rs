//! Shared resources, records, and states for the veggie farm.
//!
//! This is the type contract. The registry definitions, the hydrated game
//! state, and the two persisted shapes all live here. Every domain module
//! imports from here; no domain reaches into another domain's internals.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

// ═══════════════════════════════════════════════════════════════════════
// TAGS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Currency {
    Money,
    Knowledge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKind {
    Speed,
    Efficiency,
    Quality,
    Automation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecipeCategory {
    Pickles,
    Preserves,
    Sauces,
    Gourmet,
}

/// What an auto-purchaser buys for its veggie each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PurchaseTarget {
    Fertilizer,
    Harvester,
    BetterSeeds,
    AdditionalPlot,
}

// ═══════════════════════════════════════════════════════════════════════
// SCHEMA REGISTRY — current definitions, never persisted
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct VeggieDef {
    pub id: String,
    pub name: String,
    pub growth_rate: f64,
    pub seed_cost: f64,
    pub sale_price: f64,
    pub experience_to_unlock: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientDef {
    pub veggie_name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDef {
    pub id: String,
    pub name: String,
    pub ingredients: Vec<IngredientDef>,
    /// Base processing time in seconds.
    pub processing_time: u32,
    pub sale_price: f64,
    pub experience_required: f64,
    pub category: RecipeCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: UpgradeKind,
    pub base_cost: f64,
    pub cost_scaling: f64,
    pub currency: Currency,
    pub max_level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutoPurchaserDef {
    pub id: String,
    pub name: String,
    pub target: PurchaseTarget,
    pub cost: f64,
    pub cycle_days: u32,
}

/// Source of truth for "what should this entity look like today".
///
/// Only the position of the first recipe carries meaning (it is the
/// bootstrap recipe gated by overall experience). Everything else is looked
/// up by id.
#[derive(Resource, Debug, Clone, Default)]
pub struct SchemaRegistry {
    pub veggies: Vec<VeggieDef>,
    pub recipes: Vec<RecipeDef>,
    pub upgrades: Vec<UpgradeDef>,
    pub auto_purchasers: Vec<AutoPurchaserDef>,
}

impl SchemaRegistry {
    pub fn recipe(&self, id: &str) -> Option<&RecipeDef> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn upgrade(&self, id: &str) -> Option<&UpgradeDef> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn veggie_by_name(&self, name: &str) -> Option<&VeggieDef> {
        self.veggies.iter().find(|v| v.name == name)
    }

    pub fn auto_purchaser(&self, id: &str) -> Option<&AutoPurchaserDef> {
        self.auto_purchasers.iter().find(|a| a.id == id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// VEGGIES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPurchaserState {
    pub id: String,
    pub name: String,
    pub target: PurchaseTarget,
    pub cost: f64,
    pub cycle_days: u32,
    pub owned: bool,
    pub active: bool,
    /// Days elapsed in the current purchase cycle.
    pub timer: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeanAutoPurchaser {
    pub id: String,
    pub owned: bool,
    pub active: bool,
    pub timer: u32,
}

/// Full ("verbose") veggie record. Identified by `name`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VeggieState {
    pub name: String,
    pub growth: f64,
    pub growth_rate: f64,
    pub stash: u64,
    pub seeds: u64,
    pub seed_cost: f64,
    pub sale_price: f64,
    pub experience_to_unlock: f64,
    pub unlocked: bool,
    pub fertilizer_level: u32,
    pub harvester_level: u32,
    pub better_seeds_level: u32,
    pub additional_plots: u32,
    pub sprinkler_owned: bool,
    pub auto_purchasers: Vec<AutoPurchaserState>,
}

/// Lean veggie record: registry id plus the mutable fields only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeanVeggie {
    pub id: String,
    pub growth: f64,
    pub stash: u64,
    pub seeds: u64,
    pub unlocked: bool,
    pub fertilizer_level: u32,
    pub harvester_level: u32,
    pub better_seeds_level: u32,
    pub additional_plots: u32,
    pub sprinkler_owned: bool,
    pub auto_purchasers: Vec<LeanAutoPurchaser>,
}

/// A persisted veggie record of either shape. A record carrying `name` is
/// full, otherwise a record carrying `id` is lean.
#[derive(Debug, Clone, PartialEq)]
pub enum VeggieRecord {
    Full(VeggieState),
    Lean(LeanVeggie),
}

// ═══════════════════════════════════════════════════════════════════════
// CANNING — verbose in-memory shape
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub veggie_name: String,
    /// Position in the current veggie list. Re-resolved on every load.
    pub veggie_index: Option<usize>,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInstance {
    pub id: String,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub processing_time: u32,
    pub sale_price: f64,
    pub experience_required: f64,
    pub category: RecipeCategory,
    pub unlocked: bool,
    pub times_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeInstance {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: UpgradeKind,
    pub level: u32,
    /// Cached; recomputed from `level` whenever the state is hydrated.
    pub cost: f64,
    /// Cached; recomputed from `level` whenever the state is hydrated.
    pub effect: f64,
    pub base_cost: f64,
    pub cost_scaling: f64,
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_level: Option<u32>,
}

/// An in-flight timed canning job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstance {
    pub recipe_id: String,
    pub remaining_time: u32,
    pub total_time: u32,
    /// Always equal to `remaining_time == 0`.
    pub completed: bool,
    pub automated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoCanningConfig {
    pub enabled: bool,
    pub selected_recipes: BTreeSet<String>,
    pub priority_order: Vec<String>,
    pub only_use_excess: bool,
    pub excess_threshold: u32,
}

impl Default for AutoCanningConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            selected_recipes: BTreeSet::new(),
            priority_order: Vec::new(),
            only_use_excess: true,
            excess_threshold: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanningState {
    pub recipes: Vec<RecipeInstance>,
    pub upgrades: Vec<UpgradeInstance>,
    pub unlocked_recipes: BTreeSet<String>,
    pub active_processes: Vec<ProcessInstance>,
    pub total_items_canned: u64,
    pub canning_experience: f64,
    pub max_simultaneous_processes: u32,
    pub auto_canning_config: AutoCanningConfig,
}

impl CanningState {
    pub fn recipe(&self, id: &str) -> Option<&RecipeInstance> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn upgrade(&self, id: &str) -> Option<&UpgradeInstance> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn upgrade_mut(&mut self, id: &str) -> Option<&mut UpgradeInstance> {
        self.upgrades.iter_mut().find(|u| u.id == id)
    }

    pub fn has_free_slot(&self) -> bool {
        (self.active_processes.len() as u32) < self.max_simultaneous_processes
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CANNING — lean persisted projection
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeanProcess {
    pub recipe_id: String,
    pub remaining_time: u32,
    pub total_time: u32,
    pub automated: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeanCanningProgress {
    pub upgrade_levels: BTreeMap<String, u32>,
    pub unlocked_recipes: BTreeSet<String>,
    /// Only non-zero completion counts are stored.
    pub completions: BTreeMap<String, u32>,
    pub active_processes: Vec<LeanProcess>,
    pub total_items_canned: u64,
    pub canning_experience: f64,
    pub auto_canning_config: AutoCanningConfig,
}

// ═══════════════════════════════════════════════════════════════════════
// ROOT STATE
// ═══════════════════════════════════════════════════════════════════════

/// Scalar progress fields shared by every persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FarmProgress {
    pub money: f64,
    pub experience: f64,
    pub knowledge: f64,
    pub day: u32,
    pub active_veggie: usize,
    pub max_plots: u32,
    pub farm_tier: u32,
    pub farm_cost: f64,
    pub almanac_level: u32,
    pub almanac_cost: f64,
    pub irrigation_owned: bool,
    pub heirloom_owned: bool,
    pub auto_sell_owned: bool,
    pub greenhouse_owned: bool,
}

impl Default for FarmProgress {
    fn default() -> Self {
        Self {
            money: 0.0,
            experience: 0.0,
            knowledge: 0.0,
            day: 1,
            active_veggie: 0,
            max_plots: 4,
            farm_tier: 1,
            farm_cost: 500.0,
            almanac_level: 0,
            almanac_cost: 10.0,
            irrigation_owned: false,
            heirloom_owned: false,
            auto_sell_owned: false,
            greenhouse_owned: false,
        }
    }
}

/// The fully hydrated, current-schema game state.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameProgress {
    pub farm: FarmProgress,
    pub veggies: Vec<VeggieState>,
    pub canning: CanningState,
    pub schema_version: u32,
}

/// Versioned persisted shape: full veggies, verbose canning, version stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedSave {
    #[serde(flatten)]
    pub farm: FarmProgress,
    pub veggies: Vec<VeggieState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canning_state: Option<CanningState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canning_version: Option<u32>,
}

/// Lean persisted shape: lean veggies, compact canning progress, no stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeanSave {
    #[serde(flatten)]
    pub farm: FarmProgress,
    pub veggies: Vec<LeanVeggie>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canning_progress: Option<LeanCanningProgress>,
}
