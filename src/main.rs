use bevy::{log::LogPlugin, prelude::*};

mod catalog;
mod core;
mod deposit;
mod spawning;
mod storage;

use crate::{
    catalog::CatalogPlugin, core::CorePlugin, deposit::DepositPlugin, spawning::SpawningPlugin,
    storage::StoragePlugin,
};

fn main() {
    App::new()
        .add_plugins((MinimalPlugins, LogPlugin::default()))
        .add_plugins((
            CorePlugin::default(),
            CatalogPlugin::default(), // Before SpawningPlugin so rules can read deposit definitions
            StoragePlugin,
            DepositPlugin,
            SpawningPlugin,
        ))
        .run();
}
