//! DepositPlugin registers deposit messages and the per-frame deposit systems.
use bevy::prelude::*;

use crate::core::plugin::update_simulation_clock;

use super::{
    events::{DepositCommand, DepositDepleted, DepositLevelChanged, ResourceExtracted},
    systems::{
        apply_deposit_commands, log_deposit_debug, publish_deposit_events,
        refresh_deposit_appearance, tick_deposits, DepositDebugTimer,
    },
};

pub struct DepositPlugin;

impl Plugin for DepositPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DepositDebugTimer>()
            .add_message::<ResourceExtracted>()
            .add_message::<DepositDepleted>()
            .add_message::<DepositLevelChanged>()
            .add_message::<DepositCommand>()
            .add_systems(
                Update,
                (
                    apply_deposit_commands,
                    tick_deposits,
                    log_deposit_debug,
                )
                    .chain()
                    .after(update_simulation_clock),
            )
            .add_systems(
                PostUpdate,
                (publish_deposit_events, refresh_deposit_appearance),
            );
    }
}
