//! Spawn rules describing where and how often each deposit type appears.
use std::sync::Arc;

use bevy::prelude::*;
use serde::Deserialize;

use crate::catalog::DepositDefinition;

use super::terrain::{TerrainType, COASTLINE_WATER_RADIUS};

pub const DEFAULT_MIN_DISTANCE: f32 = 2000.0;

/// Global multiplier on every rule's deposit cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositDensity {
    Sparse,
    #[default]
    Normal,
    Dense,
    VeryDense,
}

impl DepositDensity {
    pub fn multiplier(self) -> f32 {
        match self {
            Self::Sparse => 0.5,
            Self::Normal => 1.0,
            Self::Dense => 1.5,
            Self::VeryDense => 2.0,
        }
    }

    /// Scales a cap, keeping any positive cap at one or more.
    pub fn scale_count(self, count: u32) -> u32 {
        if count == 0 {
            return 0;
        }
        ((count as f32 * self.multiplier()).round() as u32).max(1)
    }
}

#[derive(Debug, Clone)]
pub struct SpawnRule {
    pub deposit: Arc<DepositDefinition>,
    /// Chance in `[0, 1]` that a candidate location is considered at all.
    pub spawn_probability: f32,
    pub min_distance_from_others: f32,
    pub max_deposit_count: u32,
    pub preferred_terrain: Vec<TerrainType>,
    pub min_elevation: f32,
    pub max_elevation: f32,
    pub min_distance_from_water: f32,
    pub prefer_coastline: bool,
}

impl SpawnRule {
    pub fn new(deposit: Arc<DepositDefinition>) -> Self {
        Self {
            deposit,
            spawn_probability: 0.1,
            min_distance_from_others: DEFAULT_MIN_DISTANCE,
            max_deposit_count: 10,
            preferred_terrain: vec![TerrainType::Plains],
            min_elevation: -1000.0,
            max_elevation: 1000.0,
            min_distance_from_water: 0.0,
            prefer_coastline: false,
        }
    }

    /// A rule tuned by keywords in the deposit's name (ores in the hills,
    /// oil on the coast, crops on the plains).
    pub fn default_for(deposit: Arc<DepositDefinition>) -> Self {
        let name = deposit.deposit_name.to_lowercase();
        let has = |keywords: &[&str]| keywords.iter().any(|keyword| name.contains(keyword));
        let mut rule = Self::new(deposit);

        if has(&["iron", "coal"]) {
            rule.spawn_probability = 0.15;
            rule.preferred_terrain = vec![TerrainType::Hills, TerrainType::Mountains];
            rule.max_deposit_count = 8;
            rule.min_distance_from_others = 3000.0;
        } else if has(&["oil"]) {
            rule.spawn_probability = 0.08;
            rule.preferred_terrain = vec![TerrainType::Coastline, TerrainType::Plains];
            rule.max_deposit_count = 4;
            rule.min_distance_from_others = 5000.0;
            rule.prefer_coastline = true;
        } else if has(&["wheat", "farm"]) {
            rule.spawn_probability = 0.2;
            rule.preferred_terrain = vec![TerrainType::Plains];
            rule.max_deposit_count = 12;
            rule.min_distance_from_others = 2000.0;
            rule.max_elevation = 300.0;
        } else if has(&["wood", "forest"]) {
            rule.spawn_probability = 0.25;
            rule.preferred_terrain = vec![TerrainType::Forest, TerrainType::Hills];
            rule.max_deposit_count = 15;
            rule.min_distance_from_others = 1500.0;
        } else if has(&["stone", "quarry"]) {
            rule.spawn_probability = 0.12;
            rule.preferred_terrain = vec![TerrainType::Mountains, TerrainType::Hills];
            rule.max_deposit_count = 6;
            rule.min_distance_from_others = 2500.0;
            rule.min_elevation = 200.0;
        }

        rule
    }

    pub fn deposit_name(&self) -> &str {
        &self.deposit.deposit_name
    }

    /// Coastline rules look for water this far out.
    pub fn water_search_radius(&self) -> f32 {
        if self.min_distance_from_water > 0.0 {
            self.min_distance_from_water
        } else {
            COASTLINE_WATER_RADIUS
        }
    }

    pub fn is_coastline_rule(&self) -> bool {
        self.prefer_coastline
    }
}

/// Record of a deposit placed by the spawner.
#[derive(Debug, Clone)]
pub struct SpawnedDepositInfo {
    pub entity: Entity,
    pub definition: Arc<DepositDefinition>,
    pub location: Vec3,
    pub terrain_type: TerrainType,
    pub elevation: f32,
}

impl SpawnedDepositInfo {
    pub fn is_type(&self, deposit_name: &str) -> bool {
        self.definition.deposit_name == deposit_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Arc<DepositDefinition> {
        Arc::new(DepositDefinition {
            deposit_name: name.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn keyword_rules_tune_placement() {
        let coal = SpawnRule::default_for(named("Coal Seam"));
        assert_eq!(coal.max_deposit_count, 8);
        assert_eq!(
            coal.preferred_terrain,
            vec![TerrainType::Hills, TerrainType::Mountains]
        );

        let oil = SpawnRule::default_for(named("Offshore Oil Well"));
        assert!(oil.prefer_coastline);
        assert!(oil.is_coastline_rule());
        assert_eq!(oil.water_search_radius(), COASTLINE_WATER_RADIUS);

        let quarry = SpawnRule::default_for(named("Granite Quarry"));
        assert_eq!(quarry.min_elevation, 200.0);

        let farm = SpawnRule::default_for(named("Wheat Farm"));
        assert_eq!(farm.max_elevation, 300.0);

        let other = SpawnRule::default_for(named("Crystal Cave"));
        assert_eq!(other.spawn_probability, 0.1);
        assert_eq!(other.preferred_terrain, vec![TerrainType::Plains]);
        assert!(!other.is_coastline_rule());
    }

    #[test]
    fn density_scales_caps() {
        assert_eq!(DepositDensity::Sparse.scale_count(1), 1);
        assert_eq!(DepositDensity::Sparse.scale_count(8), 4);
        assert_eq!(DepositDensity::Normal.scale_count(8), 8);
        assert_eq!(DepositDensity::Dense.scale_count(5), 8);
        assert_eq!(DepositDensity::VeryDense.scale_count(6), 12);
        assert_eq!(DepositDensity::VeryDense.scale_count(0), 0);
    }
}
