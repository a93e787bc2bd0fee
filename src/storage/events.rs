//! Storage messages, one set per mutation.
use bevy::prelude::{Entity, Event, Message};

use crate::catalog::RowHandle;

#[derive(Event, Message, Debug, Clone)]
pub struct StorageChanged {
    pub storage: Entity,
    pub resource: RowHandle,
    pub new_amount: u32,
    pub max_capacity: u32,
}

#[derive(Event, Message, Debug, Clone)]
pub struct ResourceAdded {
    pub storage: Entity,
    pub resource: RowHandle,
    pub amount: u32,
}

#[derive(Event, Message, Debug, Clone)]
pub struct ResourceRemoved {
    pub storage: Entity,
    pub resource: RowHandle,
    pub amount: u32,
}

/// Moves stock between two storage entities.
#[derive(Event, Message, Debug, Clone)]
pub struct TransferResource {
    pub from: Entity,
    pub to: Entity,
    pub resource: RowHandle,
    pub amount: u32,
}
