//! Systems publishing storage changes and applying transfers.
use bevy::{ecs::system::SystemParam, prelude::*};

use super::{
    components::{ResourceStorage, StorageDelta},
    events::{ResourceAdded, ResourceRemoved, StorageChanged, TransferResource},
};

#[derive(SystemParam)]
pub struct StorageOutputs<'w> {
    changed: MessageWriter<'w, StorageChanged>,
    added: MessageWriter<'w, ResourceAdded>,
    removed: MessageWriter<'w, ResourceRemoved>,
}

pub fn apply_storage_transfers(
    mut requests: MessageReader<TransferResource>,
    mut storages: Query<&mut ResourceStorage>,
) {
    for request in requests.read() {
        if request.from == request.to {
            continue;
        }
        let Ok([mut source, mut target]) = storages.get_many_mut([request.from, request.to])
        else {
            warn!(
                "Transfer of {} skipped: {:?} or {:?} has no storage",
                request.resource, request.from, request.to
            );
            continue;
        };

        let moved = source.transfer_to(&mut target, &request.resource, request.amount);
        debug!(
            "Transferred {} x{} from {:?} to {:?}",
            request.resource, moved, request.from, request.to
        );
    }
}

/// Drains queued changes into messages. Draining skips change detection so
/// `Changed<ResourceStorage>` only fires for real stock changes.
pub fn publish_storage_events(
    mut storages: Query<(Entity, &mut ResourceStorage)>,
    mut outputs: StorageOutputs,
) {
    for (entity, mut storage) in &mut storages {
        if !storage.has_pending_changes() {
            continue;
        }

        for change in storage.bypass_change_detection().take_changes() {
            match change.delta {
                StorageDelta::Added(amount) => {
                    outputs.added.write(ResourceAdded {
                        storage: entity,
                        resource: change.resource.clone(),
                        amount,
                    });
                }
                StorageDelta::Removed(amount) => {
                    outputs.removed.write(ResourceRemoved {
                        storage: entity,
                        resource: change.resource.clone(),
                        amount,
                    });
                }
            }
            outputs.changed.write(StorageChanged {
                storage: entity,
                resource: change.resource,
                new_amount: change.new_amount,
                max_capacity: change.max_capacity,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RowHandle;
    use crate::storage::plugin::StoragePlugin;

    #[derive(Resource, Default)]
    struct Seen {
        changed: Vec<(Entity, u32)>,
        added: u32,
        removed: u32,
    }

    fn record(
        mut changed: MessageReader<StorageChanged>,
        mut added: MessageReader<ResourceAdded>,
        mut removed: MessageReader<ResourceRemoved>,
        mut seen: ResMut<Seen>,
    ) {
        for event in changed.read() {
            seen.changed.push((event.storage, event.new_amount));
        }
        seen.added += added.read().map(|event| event.amount).sum::<u32>();
        seen.removed += removed.read().map(|event| event.amount).sum::<u32>();
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(StoragePlugin)
            .init_resource::<Seen>()
            .add_systems(Last, record);
        app
    }

    #[test]
    fn publishes_queued_changes_with_entity() {
        let mut app = app();
        let iron = RowHandle::resource("iron_ore");
        let mut storage = ResourceStorage::single(iron.clone(), 20);
        storage.add_resource(&iron, 15);
        storage.remove_resource(&iron, 5);
        let entity = app.world_mut().spawn(storage).id();

        app.update();

        let seen = app.world().resource::<Seen>();
        assert_eq!(seen.changed, vec![(entity, 15), (entity, 10)]);
        assert_eq!(seen.added, 15);
        assert_eq!(seen.removed, 5);
        assert!(!app
            .world()
            .get::<ResourceStorage>(entity)
            .unwrap()
            .has_pending_changes());
    }

    #[test]
    fn transfer_messages_move_stock() {
        let mut app = app();
        let coal = RowHandle::resource("coal");
        let mut source = ResourceStorage::single(coal.clone(), 50);
        source.set_initial_resource(&coal, 30);
        let from = app.world_mut().spawn(source).id();
        let to = app
            .world_mut()
            .spawn(ResourceStorage::single(coal.clone(), 10))
            .id();

        app.world_mut().write_message(TransferResource {
            from,
            to,
            resource: coal.clone(),
            amount: 25,
        });
        app.update();

        let world = app.world();
        assert_eq!(
            world.get::<ResourceStorage>(from).unwrap().current_amount(&coal),
            20
        );
        assert_eq!(
            world.get::<ResourceStorage>(to).unwrap().current_amount(&coal),
            10
        );
        assert_eq!(world.resource::<Seen>().added, 10);
    }
}
