//! Procedural deposit placement over the terrain.
pub mod config;
pub mod events;
pub mod plugin;
pub mod rules;
pub mod spawner;
pub mod systems;
pub mod terrain;

pub use config::{SpawnArea, SpawnSettings, SpawnTrigger, TerrainSettings};
pub use events::{
    AllDepositsSpawned, DepositSpawned, DepositsCleared, SpawnAreaChanged, SpawnRequest,
    SpawnRuleProcessed,
};
pub use plugin::SpawningPlugin;
pub use rules::{DepositDensity, SpawnRule, SpawnedDepositInfo};
pub use spawner::{DepositSpawner, DepositTypeSummary, SpawnConfigError};
pub use terrain::{FlatTerrain, Heightmap, Terrain, TerrainSampler, TerrainType};
