//! CatalogPlugin loads game data at build time and announces it on startup.
use std::path::PathBuf;

use bevy::prelude::*;

use super::{
    events::{CatalogLoaded, RefreshCatalog},
    manager::{DataCatalog, DEFAULT_CATALOG_DIR},
};

pub struct CatalogPlugin {
    dir: PathBuf,
}

impl CatalogPlugin {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for CatalogPlugin {
    fn default() -> Self {
        Self::from_dir(DEFAULT_CATALOG_DIR)
    }
}

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DataCatalog>() {
            app.insert_resource(DataCatalog::load_or_empty(&self.dir));
        }
        app.add_message::<CatalogLoaded>()
            .add_message::<RefreshCatalog>()
            .add_systems(Startup, announce_catalog)
            .add_systems(Update, handle_refresh_requests);
    }
}

pub fn announce_catalog(catalog: Res<DataCatalog>, mut loaded: MessageWriter<CatalogLoaded>) {
    publish_catalog(&catalog, &mut loaded);
}

pub fn handle_refresh_requests(
    mut requests: MessageReader<RefreshCatalog>,
    mut catalog: ResMut<DataCatalog>,
    mut loaded: MessageWriter<CatalogLoaded>,
) {
    if requests.read().count() == 0 {
        return;
    }

    match catalog.refresh() {
        Ok(()) => {
            info!("Catalog refreshed");
            publish_catalog(&catalog, &mut loaded);
        }
        Err(err) => warn!("Catalog refresh failed ({}). Keeping previous data.", err),
    }
}

fn publish_catalog(catalog: &DataCatalog, loaded: &mut MessageWriter<CatalogLoaded>) {
    if !catalog.are_loaded() {
        warn!("Catalog is not loaded; deposits and recipes are unavailable");
        return;
    }

    catalog.log_statistics();
    let report = catalog.validate_integrity();
    report.log();
    loaded.write(CatalogLoaded {
        valid: report.is_valid(),
    });
}
