//! Messages announcing catalog loads and requesting reloads.
use bevy::prelude::{Event, Message};

/// Written after the catalog has been loaded and validated.
#[derive(Event, Message, Debug, Clone, Copy)]
pub struct CatalogLoaded {
    /// False when the integrity check reported errors.
    pub valid: bool,
}

/// Asks the catalog to reload its source directory.
#[derive(Event, Message, Debug, Clone, Copy, Default)]
pub struct RefreshCatalog;
