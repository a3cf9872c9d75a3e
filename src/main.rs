use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use std::time::Duration;

use veggie_farm::canning::CanningPlugin;
use veggie_farm::data::DataPlugin;
use veggie_farm::save::{SavePlugin, SaveSettings};
use veggie_farm::shared::*;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 30.0,
            ))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(StatesPlugin)
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<SchemaRegistry>()
        .insert_resource(load_settings())
        // Domain plugins
        .add_plugins(CanningPlugin)
        .add_plugins(SavePlugin)
        // Data loading
        .add_plugins(DataPlugin)
        .run();
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings() -> SaveSettings {
    SaveSettings::load_or_default(std::path::Path::new("veggie_farm.ron"))
}

#[cfg(target_arch = "wasm32")]
fn load_settings() -> SaveSettings {
    SaveSettings::default()
}
