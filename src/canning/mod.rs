use bevy::prelude::*;
use crate::shared::*;

pub mod formulas;
mod processes;
mod upgrades;

pub use formulas::{
    effective_processing_time, max_simultaneous_processes, recipe_unlocked, upgrade_cost,
    upgrade_effect, SPEED_FLOOR,
};
pub use processes::{
    advance_processes, start_process, CanningTickTimer, StartCanningEvent, StartProcessError,
};
pub use upgrades::{purchase_upgrade, PurchaseCanningUpgradeEvent, PurchaseError};

pub struct CanningPlugin;

impl Plugin for CanningPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<CanningTickTimer>()
            .add_event::<StartCanningEvent>()
            .add_event::<PurchaseCanningUpgradeEvent>()
            .add_systems(
                Update,
                (
                    // One-second countdown of in-flight processes
                    processes::tick_canning_processes,
                    processes::handle_start_canning,
                    upgrades::handle_purchase_upgrade,
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
