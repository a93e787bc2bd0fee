//! Spawner messages: requests in, placement results out.
use bevy::prelude::{Entity, Event, Message, Vec3};

use super::terrain::TerrainType;

#[derive(Event, Message, Debug, Clone, PartialEq)]
pub enum SpawnRequest {
    /// Runs generation unless it already ran.
    Generate,
    /// Clears spawned deposits, then generates again.
    Regenerate,
    Clear,
    /// Places one deposit by definition name, ignoring spawn rules.
    SpawnAt { deposit_name: String, location: Vec3 },
    SetArea { center: Vec3, size: Vec3 },
    LogSpawned,
}

#[derive(Event, Message, Debug, Clone)]
pub struct DepositSpawned {
    pub deposit: Entity,
    pub deposit_name: String,
    pub location: Vec3,
    pub terrain_type: TerrainType,
}

#[derive(Event, Message, Debug, Clone)]
pub struct SpawnRuleProcessed {
    pub deposit_name: String,
    pub spawned: u32,
    pub max: u32,
}

#[derive(Event, Message, Debug, Clone)]
pub struct AllDepositsSpawned {
    pub deposits: Vec<Entity>,
}

#[derive(Event, Message, Debug, Clone, Copy)]
pub struct DepositsCleared {
    pub count: usize,
}

#[derive(Event, Message, Debug, Clone, Copy)]
pub struct SpawnAreaChanged {
    pub center: Vec3,
    pub size: Vec3,
}
