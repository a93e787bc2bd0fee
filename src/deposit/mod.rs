//! Resource deposits: finite or renewable sources that fill their own storage.
pub mod components;
pub mod errors;
pub mod events;
pub mod plugin;
pub mod systems;

pub use components::{DepositAppearance, ResourceDeposit};
pub use errors::DepositError;
pub use events::{
    DepositCommand, DepositCommandKind, DepositDepleted, DepositLevelChanged, ResourceExtracted,
};
pub use plugin::DepositPlugin;
