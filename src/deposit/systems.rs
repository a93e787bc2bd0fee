//! Systems ticking deposits and relaying their notices.
use bevy::{ecs::system::SystemParam, prelude::*, time::TimerMode};

use crate::core::plugin::SimulationClock;
use crate::storage::ResourceStorage;

use super::{
    components::{DepositAppearance, DepositNotice, ResourceDeposit},
    events::{
        DepositCommand, DepositCommandKind, DepositDepleted, DepositLevelChanged,
        ResourceExtracted,
    },
};

const DEBUG_LOG_INTERVAL_SECONDS: f32 = 1.0;

#[derive(Resource)]
pub struct DepositDebugTimer {
    timer: Timer,
}

impl Default for DepositDebugTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(DEBUG_LOG_INTERVAL_SECONDS, TimerMode::Repeating),
        }
    }
}

#[derive(SystemParam)]
pub struct DepositOutputs<'w> {
    extracted: MessageWriter<'w, ResourceExtracted>,
    depleted: MessageWriter<'w, DepositDepleted>,
    level_changed: MessageWriter<'w, DepositLevelChanged>,
}

pub fn tick_deposits(
    clock: Res<SimulationClock>,
    mut deposits: Query<(&mut ResourceDeposit, &mut ResourceStorage)>,
) {
    let delta = clock.delta_seconds();
    if delta <= 0.0 {
        return;
    }
    let now = clock.elapsed_seconds();

    for (mut deposit, mut storage) in &mut deposits {
        deposit.tick(delta, &mut storage, now);
    }
}

pub fn apply_deposit_commands(
    mut commands: MessageReader<DepositCommand>,
    clock: Res<SimulationClock>,
    mut deposits: Query<(&mut ResourceDeposit, &mut ResourceStorage)>,
) {
    for command in commands.read() {
        let Ok((mut deposit, mut storage)) = deposits.get_mut(command.deposit) else {
            warn!("Deposit command for missing deposit {:?}", command.deposit);
            continue;
        };

        match command.kind {
            DepositCommandKind::Extract { amount } => {
                deposit.extract_resource(amount, &mut storage, clock.elapsed_seconds());
            }
            DepositCommandKind::Upgrade { level } => {
                if let Err(err) = deposit.upgrade_to_level(level, &mut storage) {
                    warn!("Upgrade of {} refused: {}", deposit.deposit_name(), err);
                }
            }
            DepositCommandKind::ConnectHub { hub } => deposit.connect_to_hub(hub),
            DepositCommandKind::DisconnectHub => deposit.disconnect_from_hub(),
        }
    }
}

pub fn publish_deposit_events(
    mut deposits: Query<(Entity, &mut ResourceDeposit)>,
    mut outputs: DepositOutputs,
) {
    for (entity, mut deposit) in &mut deposits {
        if !deposit.has_pending_notices() {
            continue;
        }

        for notice in deposit.bypass_change_detection().take_notices() {
            match notice {
                DepositNotice::Extracted { resource, amount } => {
                    outputs.extracted.write(ResourceExtracted {
                        deposit: entity,
                        resource,
                        amount,
                    });
                }
                DepositNotice::Depleted => {
                    outputs.depleted.write(DepositDepleted { deposit: entity });
                }
                DepositNotice::LevelChanged { level } => {
                    outputs.level_changed.write(DepositLevelChanged {
                        deposit: entity,
                        level,
                    });
                }
            }
        }
    }
}

pub fn refresh_deposit_appearance(
    mut deposits: Query<(&ResourceDeposit, &mut DepositAppearance), Changed<ResourceDeposit>>,
) {
    for (deposit, mut appearance) in &mut deposits {
        let mesh = deposit.level_mesh();
        if appearance.mesh != mesh {
            appearance.mesh = mesh;
        }
    }
}

pub fn log_deposit_debug(
    mut timer: ResMut<DepositDebugTimer>,
    clock: Res<SimulationClock>,
    deposits: Query<(&ResourceDeposit, &ResourceStorage, &Transform)>,
) {
    if !timer.timer.tick(clock.last_scaled_delta()).just_finished() {
        return;
    }

    for (deposit, storage, transform) in &deposits {
        if !deposit.show_debug_info {
            continue;
        }
        debug!(
            "{} @ ({:.0}, {:.0}, {:.0}) | reserves {} | level {}/{} | rate {:.2}/s | stored {}/{}",
            deposit.deposit_name(),
            transform.translation.x,
            transform.translation.y,
            transform.translation.z,
            deposit.current_reserves(),
            deposit.current_level(),
            deposit.max_level(),
            deposit.current_extraction_rate(),
            storage.total_stored(),
            storage.max_capacity(),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::catalog::{DepositDefinition, DepositLevel, RowHandle};

    #[derive(Resource, Default)]
    struct Seen {
        extracted: u32,
        depleted: usize,
        levels: Vec<u32>,
    }

    fn record(
        mut extracted: MessageReader<ResourceExtracted>,
        mut depleted: MessageReader<DepositDepleted>,
        mut levels: MessageReader<DepositLevelChanged>,
        mut seen: ResMut<Seen>,
    ) {
        seen.extracted += extracted.read().map(|event| event.amount).sum::<u32>();
        seen.depleted += depleted.read().count();
        seen.levels.extend(levels.read().map(|event| event.level));
    }

    fn definition() -> Arc<DepositDefinition> {
        Arc::new(DepositDefinition {
            deposit_name: "Coal Seam".into(),
            resource: RowHandle::resource("coal"),
            total_reserves: 5,
            base_mesh: Some("meshes/coal.glb".into()),
            deposit_levels: vec![
                DepositLevel {
                    extraction_rate: 3.0,
                    max_storage: 50,
                    ..Default::default()
                },
                DepositLevel {
                    level: 2,
                    extraction_rate: 6.0,
                    max_storage: 80,
                    level_mesh: Some("meshes/coal_2.glb".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        })
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(crate::deposit::DepositPlugin)
            .add_plugins(crate::storage::StoragePlugin)
            .insert_resource(SimulationClock::default())
            .init_resource::<Seen>()
            .add_systems(Last, record);
        app
    }

    fn spawn_deposit(app: &mut App) -> Entity {
        let mut storage = ResourceStorage::default();
        let deposit = ResourceDeposit::from_definition(definition(), 1, &mut storage);
        app.world_mut().spawn((deposit, storage)).id()
    }

    #[test]
    fn ticks_extract_on_the_simulation_clock_until_depleted() {
        let mut app = app();
        let entity = spawn_deposit(&mut app);

        for _ in 0..2 {
            app.world_mut()
                .resource_mut::<SimulationClock>()
                .tick(Duration::from_secs(1));
            app.update();
        }

        let world = app.world();
        let deposit = world.get::<ResourceDeposit>(entity).unwrap();
        assert!(deposit.is_depleted());
        assert_eq!(
            world
                .get::<ResourceStorage>(entity)
                .unwrap()
                .current_amount(&RowHandle::resource("coal")),
            5
        );
        let seen = world.resource::<Seen>();
        assert_eq!(seen.extracted, 5);
        assert_eq!(seen.depleted, 1);
    }

    #[test]
    fn commands_upgrade_and_update_appearance() {
        let mut app = app();
        let entity = spawn_deposit(&mut app);
        app.update();
        assert_eq!(
            app.world().get::<DepositAppearance>(entity).unwrap().mesh.as_deref(),
            Some("meshes/coal.glb")
        );

        app.world_mut().write_message(DepositCommand {
            deposit: entity,
            kind: DepositCommandKind::Upgrade { level: 2 },
        });
        app.world_mut().write_message(DepositCommand {
            deposit: entity,
            kind: DepositCommandKind::Extract { amount: 2 },
        });
        app.update();

        let world = app.world();
        assert_eq!(world.resource::<Seen>().levels, vec![2]);
        assert_eq!(world.resource::<Seen>().extracted, 2);
        assert_eq!(world.get::<ResourceStorage>(entity).unwrap().max_capacity(), 80);
        assert_eq!(
            world.get::<DepositAppearance>(entity).unwrap().mesh.as_deref(),
            Some("meshes/coal_2.glb")
        );
    }
}
