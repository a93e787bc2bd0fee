//! Spawn settings loaded from `config/spawning.toml`.
use std::{fs, path::Path, sync::Arc};

use bevy::prelude::*;
use serde::Deserialize;

use crate::catalog::DepositDefinition;
use crate::core::rng::DEFAULT_SEED;

use super::{
    rules::{DepositDensity, SpawnRule, DEFAULT_MIN_DISTANCE},
    terrain::{FlatTerrain, Heightmap, HeightmapParams, Terrain, TerrainType},
};

const CONFIG_PATH: &str = "config/spawning.toml";
/// Generated terrain extends this far past the spawn area so edge samples land.
const TERRAIN_MARGIN: f32 = 2500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnTrigger {
    Manual,
    #[default]
    OnStartup,
    Delayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Flat,
    #[default]
    Generated,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct RawSpawnConfig {
    #[serde(default)]
    generation: RawGenerationSection,
    #[serde(default)]
    area: RawAreaSection,
    #[serde(default)]
    terrain: RawTerrainSection,
    #[serde(default)]
    custom_rules: Vec<RawCustomRule>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawGenerationSection {
    trigger: SpawnTrigger,
    delay_seconds: f32,
    density: DepositDensity,
    use_default_rules: bool,
    grid_resolution: u32,
    max_spawn_attempts: u32,
    seed: u64,
    log_spawn_process: bool,
}

impl Default for RawGenerationSection {
    fn default() -> Self {
        Self {
            trigger: SpawnTrigger::OnStartup,
            delay_seconds: 2.0,
            density: DepositDensity::Normal,
            use_default_rules: true,
            grid_resolution: 50,
            max_spawn_attempts: 1000,
            seed: DEFAULT_SEED,
            log_spawn_process: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawAreaSection {
    center: [f32; 3],
    size: [f32; 3],
}

impl Default for RawAreaSection {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0, 0.0],
            size: [10_000.0, 5_000.0, 10_000.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawTerrainSection {
    kind: TerrainKind,
    height: f32,
    seed: Option<u64>,
    cell_size: f32,
    amplitude: f32,
    base_height: f32,
}

impl Default for RawTerrainSection {
    fn default() -> Self {
        Self {
            kind: TerrainKind::Generated,
            height: 0.0,
            seed: None,
            cell_size: 100.0,
            amplitude: 900.0,
            base_height: 300.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawCustomRule {
    deposit: String,
    spawn_probability: f32,
    min_distance_from_others: f32,
    max_deposit_count: u32,
    preferred_terrain: Vec<TerrainType>,
    min_elevation: f32,
    max_elevation: f32,
    min_distance_from_water: f32,
    prefer_coastline: bool,
}

impl Default for RawCustomRule {
    fn default() -> Self {
        Self {
            deposit: String::new(),
            spawn_probability: 0.1,
            min_distance_from_others: DEFAULT_MIN_DISTANCE,
            max_deposit_count: 5,
            preferred_terrain: vec![TerrainType::Plains],
            min_elevation: -1000.0,
            max_elevation: 1000.0,
            min_distance_from_water: 0.0,
            prefer_coastline: false,
        }
    }
}

/// Axis-aligned box deposits are placed in. `size.y` is the vertical extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnArea {
    pub center: Vec3,
    pub size: Vec3,
}

impl SpawnArea {
    pub fn min_corner(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    pub fn has_ground_extent(&self) -> bool {
        self.size.x > 0.0 && self.size.z > 0.0
    }
}

impl Default for SpawnArea {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            size: Vec3::new(50_000.0, 10_000.0, 50_000.0),
        }
    }
}

/// Rule written by hand in the config, bound to a deposit definition by name.
#[derive(Debug, Clone)]
pub struct CustomSpawnRule {
    pub deposit: String,
    pub spawn_probability: f32,
    pub min_distance_from_others: f32,
    pub max_deposit_count: u32,
    pub preferred_terrain: Vec<TerrainType>,
    pub min_elevation: f32,
    pub max_elevation: f32,
    pub min_distance_from_water: f32,
    pub prefer_coastline: bool,
}

impl CustomSpawnRule {
    pub fn bind(&self, deposit: Arc<DepositDefinition>) -> SpawnRule {
        SpawnRule {
            spawn_probability: self.spawn_probability,
            min_distance_from_others: self.min_distance_from_others,
            max_deposit_count: self.max_deposit_count,
            preferred_terrain: self.preferred_terrain.clone(),
            min_elevation: self.min_elevation,
            max_elevation: self.max_elevation,
            min_distance_from_water: self.min_distance_from_water,
            prefer_coastline: self.prefer_coastline,
            ..SpawnRule::new(deposit)
        }
    }
}

#[derive(Debug, Clone)]
pub enum TerrainSettings {
    Flat { height: f32 },
    Generated(HeightmapParams),
}

impl TerrainSettings {
    pub fn build(&self) -> Terrain {
        match *self {
            Self::Flat { height } => Terrain::new(FlatTerrain { height }),
            Self::Generated(params) => Terrain::new(Heightmap::generate(params)),
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct SpawnSettings {
    pub trigger: SpawnTrigger,
    pub delay_seconds: f32,
    pub density: DepositDensity,
    pub use_default_rules: bool,
    pub custom_rules: Vec<CustomSpawnRule>,
    pub area: SpawnArea,
    pub grid_resolution: u32,
    pub max_spawn_attempts: u32,
    pub seed: u64,
    pub log_spawn_process: bool,
    pub terrain: TerrainSettings,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        RawSpawnConfig::default().into()
    }
}

impl SpawnSettings {
    pub fn load_or_default() -> Self {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(data) => Self::from_toml(&data).unwrap_or_else(|err| {
                warn!(
                    "Failed to parse {} ({}). Falling back to defaults.",
                    path.display(),
                    err
                );
                Self::default()
            }),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn from_toml(data: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawSpawnConfig>(data).map(Into::into)
    }
}

impl From<RawSpawnConfig> for SpawnSettings {
    fn from(value: RawSpawnConfig) -> Self {
        let generation = value.generation;
        let area = SpawnArea {
            center: Vec3::from_array(value.area.center),
            size: Vec3::from_array(value.area.size),
        };

        let terrain = match value.terrain.kind {
            TerrainKind::Flat => TerrainSettings::Flat {
                height: value.terrain.height,
            },
            TerrainKind::Generated => {
                let min = area.min_corner();
                let margin = Vec2::splat(TERRAIN_MARGIN);
                TerrainSettings::Generated(HeightmapParams {
                    seed: value.terrain.seed.unwrap_or(generation.seed),
                    origin: Vec2::new(min.x, min.z) - margin,
                    extent: Vec2::new(area.size.x.max(0.0), area.size.z.max(0.0)) + margin * 2.0,
                    cell_size: value.terrain.cell_size.max(1.0),
                    amplitude: value.terrain.amplitude,
                    base_height: value.terrain.base_height,
                })
            }
        };

        let custom_rules = value
            .custom_rules
            .into_iter()
            .map(|rule| {
                let min_elevation = rule.min_elevation.min(rule.max_elevation);
                let max_elevation = rule.min_elevation.max(rule.max_elevation);
                CustomSpawnRule {
                    deposit: rule.deposit,
                    spawn_probability: rule.spawn_probability,
                    min_distance_from_others: rule.min_distance_from_others.max(0.0),
                    max_deposit_count: rule.max_deposit_count,
                    preferred_terrain: rule.preferred_terrain,
                    min_elevation,
                    max_elevation,
                    min_distance_from_water: rule.min_distance_from_water.max(0.0),
                    prefer_coastline: rule.prefer_coastline,
                }
            })
            .collect();

        Self {
            trigger: generation.trigger,
            delay_seconds: generation.delay_seconds,
            density: generation.density,
            use_default_rules: generation.use_default_rules,
            custom_rules,
            area,
            grid_resolution: generation.grid_resolution.max(1),
            max_spawn_attempts: generation.max_spawn_attempts,
            seed: generation.seed,
            log_spawn_process: generation.log_spawn_process,
            terrain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let settings = SpawnSettings::from_toml("").unwrap();
        assert_eq!(settings.trigger, SpawnTrigger::OnStartup);
        assert_eq!(settings.delay_seconds, 2.0);
        assert_eq!(settings.grid_resolution, 50);
        assert_eq!(settings.max_spawn_attempts, 1000);
        assert!(settings.use_default_rules);
        assert_eq!(settings.area.size, Vec3::new(10_000.0, 5_000.0, 10_000.0));
        assert!(matches!(settings.terrain, TerrainSettings::Generated(_)));
    }

    #[test]
    fn parses_sections_and_custom_rules() {
        let settings = SpawnSettings::from_toml(
            r#"
[generation]
trigger = "delayed"
delay_seconds = 5.0
density = "very_dense"
use_default_rules = false
seed = 99

[area]
center = [100.0, 0.0, -100.0]
size = [4000.0, 1000.0, 2000.0]

[terrain]
kind = "flat"
height = 25.0

[[custom_rules]]
deposit = "Iron Ore Deposit"
max_elevation = -50.0
min_elevation = 400.0
preferred_terrain = ["plains", "hills"]
"#,
        )
        .unwrap();

        assert_eq!(settings.trigger, SpawnTrigger::Delayed);
        assert_eq!(settings.density, DepositDensity::VeryDense);
        assert!(!settings.use_default_rules);
        assert_eq!(settings.seed, 99);
        assert_eq!(settings.area.min_corner(), Vec3::new(-1900.0, -500.0, -1100.0));
        assert!(matches!(
            settings.terrain,
            TerrainSettings::Flat { height } if height == 25.0
        ));

        let rule = &settings.custom_rules[0];
        assert_eq!(rule.max_deposit_count, 5);
        assert_eq!((rule.min_elevation, rule.max_elevation), (-50.0, 400.0));
        assert_eq!(rule.preferred_terrain.len(), 2);
    }

    #[test]
    fn generated_terrain_covers_area_with_margin() {
        let settings = SpawnSettings::from_toml("[terrain]\nseed = 5\n").unwrap();
        let TerrainSettings::Generated(params) = settings.terrain else {
            panic!("expected generated terrain");
        };
        assert_eq!(params.seed, 5);
        assert_eq!(params.origin, Vec2::new(-7500.0, -7500.0));
        assert_eq!(params.extent, Vec2::new(15_000.0, 15_000.0));
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let settings = SpawnSettings::load_from("config/missing-spawning.toml");
        assert_eq!(settings.trigger, SpawnTrigger::OnStartup);
    }

    #[test]
    fn shipped_config_parses() {
        let data = fs::read_to_string(CONFIG_PATH).unwrap();
        let settings = SpawnSettings::from_toml(&data).unwrap();
        assert_eq!(settings.custom_rules[0].deposit, "Stone Quarry");
        assert_eq!(settings.area.size, Vec3::new(40_000.0, 5_000.0, 40_000.0));
    }
}
