//! StoragePlugin registers storage messages and the publishing systems.
use bevy::prelude::*;

use super::{
    events::{ResourceAdded, ResourceRemoved, StorageChanged, TransferResource},
    systems::{apply_storage_transfers, publish_storage_events},
};

/// Gameplay systems mutate storages in `Update`; changes go out in `PostUpdate`.
pub struct StoragePlugin;

impl Plugin for StoragePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<StorageChanged>()
            .add_message::<ResourceAdded>()
            .add_message::<ResourceRemoved>()
            .add_message::<TransferResource>()
            .add_systems(Update, apply_storage_transfers)
            .add_systems(PostUpdate, publish_storage_events);
    }
}
