//! Data layer — the Schema Registry.
//!
//! This plugin runs in OnEnter(GameState::Loading), fills the SchemaRegistry
//! from the hard-coded game-design data defined in submodules, then
//! transitions the game into GameState::Playing.
//!
//! Migration and the lean codec read the registry instead of trusting any
//! persisted shape, so adding an entry here is all it takes for old saves to
//! pick it up (at level 0 / locked / unowned).

mod veggies;
mod recipes;
pub mod upgrades;
mod auto_purchasers;

use bevy::prelude::*;
use crate::shared::*;

pub use upgrades::{AUTOMATION_UPGRADE_ID, CANNER_UPGRADE_ID, CANONICAL_UPGRADE_IDS};

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_schema_registry);
    }
}

impl SchemaRegistry {
    /// The registry as shipped in this build.
    pub fn current() -> Self {
        let mut registry = SchemaRegistry::default();
        veggies::populate_veggies(&mut registry);
        recipes::populate_recipes(&mut registry);
        upgrades::populate_upgrades(&mut registry);
        auto_purchasers::populate_auto_purchasers(&mut registry);
        registry
    }
}

/// Populates the registry and then transitions to Playing.
fn load_schema_registry(
    mut registry: ResMut<SchemaRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("DataPlugin: populating schema registry…");

    *registry = SchemaRegistry::current();
    info!(
        "  Veggies: {}, Recipes: {}, Upgrades: {}, Auto-purchasers: {}",
        registry.veggies.len(),
        registry.recipes.len(),
        registry.upgrades.len(),
        registry.auto_purchasers.len()
    );

    info!("DataPlugin: registry populated. Transitioning to Playing.");
    next_state.set(GameState::Playing);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_ids_are_unique() {
        let registry = SchemaRegistry::current();
        let recipe_ids: HashSet<_> = registry.recipes.iter().map(|r| &r.id).collect();
        assert_eq!(recipe_ids.len(), registry.recipes.len());
        let upgrade_ids: HashSet<_> = registry.upgrades.iter().map(|u| &u.id).collect();
        assert_eq!(upgrade_ids.len(), registry.upgrades.len());
        let veggie_ids: HashSet<_> = registry.veggies.iter().map(|v| &v.id).collect();
        assert_eq!(veggie_ids.len(), registry.veggies.len());
    }

    #[test]
    fn test_registry_carries_every_canonical_upgrade() {
        let registry = SchemaRegistry::current();
        for id in CANONICAL_UPGRADE_IDS {
            assert!(registry.upgrade(id).is_some(), "missing canonical upgrade {id}");
        }
    }

    #[test]
    fn test_recipe_ingredients_name_known_veggies() {
        let registry = SchemaRegistry::current();
        for recipe in &registry.recipes {
            assert!(recipe.processing_time > 0, "{} has no processing time", recipe.id);
            for ingredient in &recipe.ingredients {
                assert!(
                    registry.veggie_by_name(&ingredient.veggie_name).is_some(),
                    "{} uses unknown veggie {}",
                    recipe.id,
                    ingredient.veggie_name
                );
            }
        }
    }
}
