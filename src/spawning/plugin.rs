//! SpawningPlugin wires terrain, spawn settings and the deposit spawner.
use bevy::prelude::*;

use crate::core::{plugin::update_simulation_clock, SimRng};

use super::{
    config::SpawnSettings,
    events::{
        AllDepositsSpawned, DepositSpawned, DepositsCleared, SpawnAreaChanged, SpawnRequest,
        SpawnRuleProcessed,
    },
    spawner::DepositSpawner,
    systems::{handle_spawn_requests, prune_spawned, setup_spawner, tick_spawn_delay},
    terrain::Terrain,
};

pub struct SpawningPlugin;

impl Plugin for SpawningPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<SpawnSettings>() {
            app.insert_resource(SpawnSettings::load_or_default());
        }
        if !app.world().contains_resource::<Terrain>() {
            let terrain = app.world().resource::<SpawnSettings>().terrain.build();
            app.insert_resource(terrain);
        }

        app.init_resource::<DepositSpawner>()
            .init_resource::<SimRng>()
            .add_message::<SpawnRequest>()
            .add_message::<DepositSpawned>()
            .add_message::<SpawnRuleProcessed>()
            .add_message::<AllDepositsSpawned>()
            .add_message::<DepositsCleared>()
            .add_message::<SpawnAreaChanged>()
            .add_systems(Startup, setup_spawner)
            .add_systems(
                Update,
                (tick_spawn_delay, prune_spawned, handle_spawn_requests)
                    .chain()
                    .after(update_simulation_clock),
            );
    }
}
