//! Startup configuration, the delayed trigger and `SpawnRequest` handling.
use std::sync::Arc;

use bevy::{ecs::system::SystemParam, prelude::*, time::TimerMode};

use crate::catalog::DataCatalog;
use crate::core::{SimRng, SimulationClock};
use crate::deposit::ResourceDeposit;

use super::{
    config::{SpawnSettings, SpawnTrigger},
    events::{
        AllDepositsSpawned, DepositSpawned, DepositsCleared, SpawnAreaChanged, SpawnRequest,
        SpawnRuleProcessed,
    },
    spawner::DepositSpawner,
    terrain::Terrain,
};

/// One-shot countdown armed by the `delayed` trigger.
#[derive(Resource)]
pub struct SpawnDelay {
    timer: Timer,
}

impl SpawnDelay {
    pub fn new(seconds: f32) -> Self {
        Self {
            timer: Timer::from_seconds(seconds.max(0.0), TimerMode::Once),
        }
    }
}

#[derive(SystemParam)]
pub struct SpawnOutputs<'w> {
    spawned: MessageWriter<'w, DepositSpawned>,
    rule_processed: MessageWriter<'w, SpawnRuleProcessed>,
    all_spawned: MessageWriter<'w, AllDepositsSpawned>,
    cleared: MessageWriter<'w, DepositsCleared>,
    area_changed: MessageWriter<'w, SpawnAreaChanged>,
}

/// Applies `SpawnSettings` to the spawner and acts on the configured trigger.
pub fn setup_spawner(
    mut commands: Commands,
    settings: Res<SpawnSettings>,
    catalog: Res<DataCatalog>,
    mut spawner: ResMut<DepositSpawner>,
    mut rng: ResMut<SimRng>,
    mut requests: MessageWriter<SpawnRequest>,
    mut area_changed: MessageWriter<SpawnAreaChanged>,
) {
    spawner.set_spawn_area(settings.area.center, settings.area.size);
    area_changed.write(SpawnAreaChanged {
        center: settings.area.center,
        size: settings.area.size,
    });
    spawner.set_density(settings.density);
    spawner.set_grid_resolution(settings.grid_resolution);
    spawner.set_max_spawn_attempts(settings.max_spawn_attempts);
    spawner.set_log_spawn_process(settings.log_spawn_process);
    rng.reseed(settings.seed);

    if settings.use_default_rules {
        spawner.load_default_rules(&catalog);
    }
    for custom in &settings.custom_rules {
        match catalog.deposit_definition(&custom.deposit) {
            Some(definition) => spawner.add_spawn_rule(custom.bind(Arc::clone(definition))),
            None => warn!(
                "Custom spawn rule for unknown deposit '{}' skipped",
                custom.deposit
            ),
        }
    }

    match spawner.validate_configuration(settings.trigger, settings.delay_seconds) {
        Ok(warnings) => {
            for warning in warnings {
                warn!("Spawn configuration: {}", warning);
            }
        }
        Err(err) => {
            error!("Invalid spawn configuration: {}. Deposits will not spawn.", err);
            return;
        }
    }

    if settings.log_spawn_process {
        spawner.log_configuration_summary();
    }

    match settings.trigger {
        SpawnTrigger::Manual => info!("Deposit spawning waits for a manual request"),
        SpawnTrigger::OnStartup => {
            requests.write(SpawnRequest::Generate);
        }
        SpawnTrigger::Delayed if settings.delay_seconds <= 0.0 => {
            requests.write(SpawnRequest::Generate);
        }
        SpawnTrigger::Delayed => {
            info!("Deposit spawning in {:.1}s", settings.delay_seconds);
            commands.insert_resource(SpawnDelay::new(settings.delay_seconds));
        }
    }
}

pub fn tick_spawn_delay(
    mut commands: Commands,
    delay: Option<ResMut<SpawnDelay>>,
    clock: Res<SimulationClock>,
    mut requests: MessageWriter<SpawnRequest>,
) {
    let Some(mut delay) = delay else {
        return;
    };
    if delay.timer.tick(clock.last_scaled_delta()).just_finished() {
        requests.write(SpawnRequest::Generate);
        commands.remove_resource::<SpawnDelay>();
    }
}

/// Forgets spawner records whose deposit entity is gone.
pub fn prune_spawned(
    mut spawner: ResMut<DepositSpawner>,
    deposits: Query<(), With<ResourceDeposit>>,
) {
    if spawner.total_spawned() == 0 {
        return;
    }
    let before = spawner.total_spawned();
    spawner.retain_existing(|entity| deposits.contains(entity));
    let removed = before - spawner.total_spawned();
    if removed > 0 {
        debug!("Dropped {} despawned deposit records", removed);
    }
}

pub fn handle_spawn_requests(
    mut commands: Commands,
    mut requests: MessageReader<SpawnRequest>,
    catalog: Res<DataCatalog>,
    terrain: Res<Terrain>,
    mut spawner: ResMut<DepositSpawner>,
    mut rng: ResMut<SimRng>,
    mut outputs: SpawnOutputs,
) {
    for request in requests.read() {
        match request {
            SpawnRequest::Generate => {
                generate(&mut commands, &catalog, &terrain, &mut spawner, &mut rng, &mut outputs);
            }
            SpawnRequest::Regenerate => {
                clear(&mut commands, &mut spawner, &mut outputs);
                generate(&mut commands, &catalog, &terrain, &mut spawner, &mut rng, &mut outputs);
            }
            SpawnRequest::Clear => clear(&mut commands, &mut spawner, &mut outputs),
            SpawnRequest::SpawnAt {
                deposit_name,
                location,
            } => {
                let Some(definition) = catalog.deposit_definition(deposit_name) else {
                    error!("Cannot spawn unknown deposit '{}'", deposit_name);
                    continue;
                };
                let entity = spawner.spawn_deposit_at(
                    &mut commands,
                    Arc::clone(definition),
                    *location,
                    &terrain,
                );
                if let Some(info) = spawner.spawned_info().last() {
                    outputs.spawned.write(DepositSpawned {
                        deposit: entity,
                        deposit_name: deposit_name.clone(),
                        location: info.location,
                        terrain_type: info.terrain_type,
                    });
                }
            }
            SpawnRequest::SetArea { center, size } => {
                spawner.set_spawn_area(*center, *size);
                outputs.area_changed.write(SpawnAreaChanged {
                    center: *center,
                    size: *size,
                });
            }
            SpawnRequest::LogSpawned => spawner.log_spawned(),
        }
    }
}

fn generate(
    commands: &mut Commands,
    catalog: &DataCatalog,
    terrain: &Terrain,
    spawner: &mut DepositSpawner,
    rng: &mut SimRng,
    outputs: &mut SpawnOutputs,
) {
    if !catalog.are_loaded() {
        error!("Cannot generate deposits: catalog is not loaded");
        return;
    }
    if spawner.has_generated() {
        warn!("Deposits were already generated; send Regenerate to start over");
        return;
    }

    let plan = spawner.plan_generation(terrain, &mut rng.0);
    for planned in plan.deposits {
        let deposit_name = planned.definition.deposit_name.clone();
        let entity = spawner.spawn_deposit(
            commands,
            planned.definition,
            planned.location,
            planned.terrain_type,
            planned.elevation,
        );
        outputs.spawned.write(DepositSpawned {
            deposit: entity,
            deposit_name,
            location: planned.location,
            terrain_type: planned.terrain_type,
        });
    }
    for outcome in plan.outcomes {
        debug!(
            "Rule {}: {}/{} after {} attempts",
            outcome.deposit_name, outcome.spawned, outcome.max, outcome.attempts
        );
        outputs.rule_processed.write(SpawnRuleProcessed {
            deposit_name: outcome.deposit_name,
            spawned: outcome.spawned,
            max: outcome.max,
        });
    }

    spawner.mark_generated();
    outputs.all_spawned.write(AllDepositsSpawned {
        deposits: spawner.all_spawned(),
    });
    spawner.log_statistics();
}

fn clear(commands: &mut Commands, spawner: &mut DepositSpawner, outputs: &mut SpawnOutputs) {
    let count = spawner.clear_all_spawned(commands);
    info!("Cleared {} spawned deposits", count);
    outputs.cleared.write(DepositsCleared { count });
}
