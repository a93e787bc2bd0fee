//! Deposit messages: what happened, and requests from other systems.
use bevy::prelude::{Entity, Event, Message};

use crate::catalog::RowHandle;

#[derive(Event, Message, Debug, Clone)]
pub struct ResourceExtracted {
    pub deposit: Entity,
    pub resource: RowHandle,
    pub amount: u32,
}

#[derive(Event, Message, Debug, Clone, Copy)]
pub struct DepositDepleted {
    pub deposit: Entity,
}

#[derive(Event, Message, Debug, Clone, Copy)]
pub struct DepositLevelChanged {
    pub deposit: Entity,
    pub level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositCommandKind {
    /// Pulls units out of the deposit. Results arrive as `ResourceExtracted`.
    Extract { amount: u32 },
    Upgrade { level: u32 },
    ConnectHub { hub: Entity },
    DisconnectHub,
}

#[derive(Event, Message, Debug, Clone, Copy)]
pub struct DepositCommand {
    pub deposit: Entity,
    pub kind: DepositCommandKind,
}
