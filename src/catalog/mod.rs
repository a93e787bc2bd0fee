//! Catalog of game data: resource, recipe, route and upgrade tables plus the
//! building, vehicle and deposit definitions that reference them.
pub mod definitions;
pub mod errors;
pub mod events;
pub mod handle;
pub mod manager;
pub mod plugin;
pub mod rows;
pub mod table;
pub mod validation;

pub use definitions::{DepositDefinition, DepositLevel, FALLBACK_DEPOSIT_LEVEL};
pub use errors::CatalogError;
pub use events::{CatalogLoaded, RefreshCatalog};
pub use handle::{RowHandle, TableId};
pub use manager::DataCatalog;
pub use plugin::CatalogPlugin;
