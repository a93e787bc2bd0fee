//! Resource storage shared by deposits and any other stock-holding entity.
pub mod components;
pub mod events;
pub mod plugin;
pub mod systems;

pub use components::{ResourceStorage, StoredResource};
pub use events::{ResourceAdded, ResourceRemoved, StorageChanged, TransferResource};
pub use plugin::StoragePlugin;
