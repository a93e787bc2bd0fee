//! `DepositSpawner`: turns spawn rules and terrain into placed deposits.
use std::{collections::BTreeMap, fmt, sync::Arc};

use bevy::prelude::*;
use rand::{seq::SliceRandom, Rng};

use crate::catalog::{DataCatalog, DepositDefinition};
use crate::deposit::ResourceDeposit;
use crate::storage::ResourceStorage;

use super::{
    config::{SpawnArea, SpawnTrigger},
    rules::{DepositDensity, SpawnRule, SpawnedDepositInfo, DEFAULT_MIN_DISTANCE},
    terrain::{Terrain, TerrainType},
};

const MIN_GRID_STEPS: u32 = 10;
const DEFAULT_GRID_RESOLUTION: u32 = 100;
const DEFAULT_MAX_SPAWN_ATTEMPTS: u32 = 1000;
/// Candidate jitter as a fraction of one grid step.
const CANDIDATE_JITTER: f32 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub enum SpawnConfigError {
    EmptyArea { size: Vec3 },
}

impl fmt::Display for SpawnConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyArea { size } => write!(
                f,
                "spawn area has no ground extent ({:.0} x {:.0})",
                size.x, size.z
            ),
        }
    }
}

impl std::error::Error for SpawnConfigError {}

#[derive(Debug, Clone)]
pub struct PlannedDeposit {
    pub definition: Arc<DepositDefinition>,
    pub location: Vec3,
    pub terrain_type: TerrainType,
    pub elevation: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub deposit_name: String,
    pub spawned: u32,
    pub max: u32,
    pub attempts: u32,
}

/// Placements chosen for one generation pass, before any entity exists.
#[derive(Debug, Clone, Default)]
pub struct SpawnPlan {
    pub deposits: Vec<PlannedDeposit>,
    pub outcomes: Vec<RuleOutcome>,
}

#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepositTypeSummary {
    pub total_count: u32,
    pub active_count: u32,
    pub total_resources: u32,
}

#[derive(Resource, Debug)]
pub struct DepositSpawner {
    rules: Vec<SpawnRule>,
    area: SpawnArea,
    density: DepositDensity,
    grid_resolution: u32,
    max_spawn_attempts: u32,
    log_spawn_process: bool,
    spawned: Vec<SpawnedDepositInfo>,
    has_generated: bool,
}

impl Default for DepositSpawner {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            area: SpawnArea::default(),
            density: DepositDensity::Normal,
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            max_spawn_attempts: DEFAULT_MAX_SPAWN_ATTEMPTS,
            log_spawn_process: false,
            spawned: Vec::new(),
            has_generated: false,
        }
    }
}

impl DepositSpawner {
    pub fn set_spawn_area(&mut self, center: Vec3, size: Vec3) {
        self.area = SpawnArea { center, size };
    }

    pub fn area(&self) -> SpawnArea {
        self.area
    }

    pub fn set_density(&mut self, density: DepositDensity) {
        self.density = density;
    }

    pub fn density(&self) -> DepositDensity {
        self.density
    }

    pub fn set_grid_resolution(&mut self, resolution: u32) {
        self.grid_resolution = resolution;
    }

    pub fn set_max_spawn_attempts(&mut self, attempts: u32) {
        self.max_spawn_attempts = attempts;
    }

    pub fn set_log_spawn_process(&mut self, enabled: bool) {
        self.log_spawn_process = enabled;
    }

    pub fn add_spawn_rule(&mut self, mut rule: SpawnRule) {
        rule.spawn_probability = rule.spawn_probability.clamp(0.0, 1.0);
        self.rules.push(rule);
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn clear_spawn_rules(&mut self) {
        self.rules.clear();
    }

    pub fn rules(&self) -> &[SpawnRule] {
        &self.rules
    }

    /// Adds the keyword-tuned rule for every deposit definition in the catalog.
    pub fn load_default_rules(&mut self, catalog: &DataCatalog) {
        for definition in catalog.deposit_definitions() {
            self.add_spawn_rule(SpawnRule::default_for(Arc::clone(definition)));
        }
    }

    pub fn has_generated(&self) -> bool {
        self.has_generated
    }

    pub fn mark_generated(&mut self) {
        self.has_generated = true;
    }

    /// Checks the area and rules. Problems that do not stop generation come
    /// back as warnings.
    pub fn validate_configuration(
        &self,
        trigger: SpawnTrigger,
        delay_seconds: f32,
    ) -> Result<Vec<String>, SpawnConfigError> {
        if !self.area.has_ground_extent() {
            return Err(SpawnConfigError::EmptyArea {
                size: self.area.size,
            });
        }

        let mut warnings = Vec::new();
        if self.rules.is_empty() {
            warnings.push("no spawn rules configured; nothing will spawn".to_string());
        }
        for rule in &self.rules {
            if rule.spawn_probability <= 0.0 || rule.spawn_probability > 1.0 {
                warnings.push(format!(
                    "rule '{}' has spawn probability {:.2} outside (0, 1]",
                    rule.deposit_name(),
                    rule.spawn_probability
                ));
            }
            if rule.max_deposit_count == 0 {
                warnings.push(format!(
                    "rule '{}' allows no deposits",
                    rule.deposit_name()
                ));
            }
        }
        if trigger == SpawnTrigger::Delayed && delay_seconds <= 0.0 {
            warnings.push(format!(
                "delayed trigger with non-positive delay {:.2}s fires immediately",
                delay_seconds
            ));
        }
        Ok(warnings)
    }

    /// Jittered grid over the spawn area, each point dropped onto the ground.
    pub fn generate_candidates<R: Rng + ?Sized>(&self, terrain: &Terrain, rng: &mut R) -> Vec<Vec3> {
        let steps = self.grid_resolution.max(MIN_GRID_STEPS);
        let step_x = self.area.size.x / steps as f32;
        let step_z = self.area.size.z / steps as f32;
        let min = self.area.min_corner();

        let mut candidates = Vec::with_capacity(steps as usize * steps as usize);
        for i in 0..steps {
            for j in 0..steps {
                let x = min.x
                    + i as f32 * step_x
                    + rng.gen_range(-CANDIDATE_JITTER..=CANDIDATE_JITTER) * step_x;
                let z = min.z
                    + j as f32 * step_z
                    + rng.gen_range(-CANDIDATE_JITTER..=CANDIDATE_JITTER) * step_z;
                let above = Vec3::new(x, self.area.center.y, z);
                candidates.push(Vec3::new(x, terrain.elevation_at(above), z));
            }
        }
        candidates
    }

    /// Terrain type and elevation at `location` if `rule` accepts it. Spacing
    /// counts both spawned deposits and `planned` ones of the same type.
    pub fn evaluate_location(
        &self,
        location: Vec3,
        rule: &SpawnRule,
        terrain: &Terrain,
        planned: &[PlannedDeposit],
    ) -> Option<(TerrainType, f32)> {
        let terrain_type = terrain.analyze_terrain_type(location);
        if !rule.preferred_terrain.contains(&terrain_type) {
            return None;
        }

        let elevation = terrain.elevation_at(location);
        if elevation < rule.min_elevation || elevation > rule.max_elevation {
            return None;
        }

        if rule.is_coastline_rule() {
            if !terrain.is_near_water(location, rule.water_search_radius()) {
                return None;
            }
        } else if rule.min_distance_from_water > 0.0
            && terrain.is_near_water(location, rule.min_distance_from_water)
        {
            return None;
        }

        let name = rule.deposit_name();
        let spacing_sq = rule.min_distance_from_others * rule.min_distance_from_others;
        let crowded = self
            .spawned
            .iter()
            .filter(|info| info.is_type(name))
            .map(|info| info.location)
            .chain(
                planned
                    .iter()
                    .filter(|planned| planned.definition.deposit_name == name)
                    .map(|planned| planned.location),
            )
            .any(|other| other.distance_squared(location) < spacing_sq);
        if crowded {
            return None;
        }

        Some((terrain_type, elevation))
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_valid_spawn_location(
        &self,
        location: Vec3,
        rule: &SpawnRule,
        terrain: &Terrain,
        planned: &[PlannedDeposit],
    ) -> bool {
        self.evaluate_location(location, rule, terrain, planned).is_some()
    }

    /// Chooses placements rule by rule. Each rule walks the candidates in a
    /// fresh shuffled order until it hits its (density-scaled) cap or runs
    /// out of attempts.
    pub fn plan_generation<R: Rng + ?Sized>(&self, terrain: &Terrain, rng: &mut R) -> SpawnPlan {
        let candidates = self.generate_candidates(terrain, rng);
        let mut plan = SpawnPlan::default();

        for rule in &self.rules {
            let max = self.density.scale_count(rule.max_deposit_count);
            let mut order = candidates.clone();
            order.shuffle(rng);

            let mut spawned = 0;
            let mut attempts = 0;
            for location in order {
                if spawned >= max || attempts >= self.max_spawn_attempts {
                    break;
                }
                attempts += 1;

                if rng.gen::<f32>() > rule.spawn_probability {
                    continue;
                }
                if let Some((terrain_type, elevation)) =
                    self.evaluate_location(location, rule, terrain, &plan.deposits)
                {
                    plan.deposits.push(PlannedDeposit {
                        definition: Arc::clone(&rule.deposit),
                        location,
                        terrain_type,
                        elevation,
                    });
                    spawned += 1;
                }
            }

            plan.outcomes.push(RuleOutcome {
                deposit_name: rule.deposit_name().to_string(),
                spawned,
                max,
                attempts,
            });
        }

        plan
    }

    /// Spawns a level-one deposit entity and records it.
    pub fn spawn_deposit(
        &mut self,
        commands: &mut Commands,
        definition: Arc<DepositDefinition>,
        location: Vec3,
        terrain_type: TerrainType,
        elevation: f32,
    ) -> Entity {
        let mut storage = ResourceStorage::default();
        let deposit = ResourceDeposit::from_definition(Arc::clone(&definition), 1, &mut storage);
        let entity = commands
            .spawn((
                Name::new(definition.deposit_name.clone()),
                deposit,
                storage,
                Transform::from_translation(location),
            ))
            .id();

        if self.log_spawn_process {
            info!(
                "Spawned {} at ({:.0}, {:.0}, {:.0}) on {}",
                definition.deposit_name,
                location.x,
                location.y,
                location.z,
                terrain_type.label()
            );
        }

        self.spawned.push(SpawnedDepositInfo {
            entity,
            definition,
            location,
            terrain_type,
            elevation,
        });
        entity
    }

    /// Places a deposit by hand, snapped to the ground. Rules are not consulted.
    pub fn spawn_deposit_at(
        &mut self,
        commands: &mut Commands,
        definition: Arc<DepositDefinition>,
        location: Vec3,
        terrain: &Terrain,
    ) -> Entity {
        let elevation = terrain.elevation_at(location);
        let grounded = Vec3::new(location.x, elevation, location.z);
        let terrain_type = terrain.analyze_terrain_type(grounded);
        self.spawn_deposit(commands, definition, grounded, terrain_type, elevation)
    }

    /// Despawns every recorded deposit and allows generation to run again.
    pub fn clear_all_spawned(&mut self, commands: &mut Commands) -> usize {
        let count = self.spawned.len();
        for info in self.spawned.drain(..) {
            if let Ok(mut entity) = commands.get_entity(info.entity) {
                entity.despawn();
            }
        }
        self.has_generated = false;
        count
    }

    /// Forgets deposits whose entities no longer exist.
    pub fn retain_existing(&mut self, exists: impl Fn(Entity) -> bool) {
        self.spawned.retain(|info| exists(info.entity));
    }

    pub fn spawned_info(&self) -> &[SpawnedDepositInfo] {
        &self.spawned
    }

    pub fn all_spawned(&self) -> Vec<Entity> {
        self.spawned.iter().map(|info| info.entity).collect()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn deposits_by_type(&self, deposit_name: &str) -> Vec<Entity> {
        self.spawned
            .iter()
            .filter(|info| info.is_type(deposit_name))
            .map(|info| info.entity)
            .collect()
    }

    /// Closest spawned deposit, optionally restricted to one type.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn nearest_deposit(&self, location: Vec3, deposit_name: Option<&str>) -> Option<Entity> {
        self.spawned
            .iter()
            .filter(|info| deposit_name.is_none_or(|name| info.is_type(name)))
            .min_by(|a, b| {
                a.location
                    .distance_squared(location)
                    .total_cmp(&b.location.distance_squared(location))
            })
            .map(|info| info.entity)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn min_distance_between_deposits(&self, deposit_name: &str) -> f32 {
        self.rules
            .iter()
            .find(|rule| rule.deposit_name() == deposit_name)
            .map_or(DEFAULT_MIN_DISTANCE, |rule| rule.min_distance_from_others)
    }

    pub fn total_spawned(&self) -> usize {
        self.spawned.len()
    }

    /// Counts, active (not depleted) counts and remaining resources for one type.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn summarize_type<'a>(
        &self,
        deposit_name: &str,
        mut lookup: impl FnMut(Entity) -> Option<(&'a ResourceDeposit, &'a ResourceStorage)>,
    ) -> DepositTypeSummary {
        let mut summary = DepositTypeSummary::default();
        for info in self.spawned.iter().filter(|info| info.is_type(deposit_name)) {
            summary.total_count += 1;
            let Some((deposit, storage)) = lookup(info.entity) else {
                continue;
            };
            if !deposit.is_depleted() {
                summary.active_count += 1;
            }
            summary.total_resources = summary
                .total_resources
                .saturating_add(deposit.available_resource(storage));
        }
        summary
    }

    pub fn log_configuration_summary(&self) {
        info!(
            "Deposit spawner: area center ({:.0}, {:.0}, {:.0}) size ({:.0}, {:.0}, {:.0}), density {:?}, grid {}, max attempts {}",
            self.area.center.x,
            self.area.center.y,
            self.area.center.z,
            self.area.size.x,
            self.area.size.y,
            self.area.size.z,
            self.density,
            self.grid_resolution.max(MIN_GRID_STEPS),
            self.max_spawn_attempts
        );
        for rule in &self.rules {
            info!(
                "  rule {}: p={:.2}, max {}, spacing {:.0}, terrain {:?}, elevation {:.0}..{:.0}{}",
                rule.deposit_name(),
                rule.spawn_probability,
                self.density.scale_count(rule.max_deposit_count),
                rule.min_distance_from_others,
                rule.preferred_terrain,
                rule.min_elevation,
                rule.max_elevation,
                if rule.prefer_coastline { ", coastal" } else { "" }
            );
        }
    }

    pub fn log_statistics(&self) {
        let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
        let mut by_terrain: BTreeMap<&str, usize> = BTreeMap::new();
        for info in &self.spawned {
            *by_type.entry(info.definition.deposit_name.as_str()).or_default() += 1;
            *by_terrain.entry(info.terrain_type.label()).or_default() += 1;
        }

        info!("Deposit generation complete: {} deposits", self.spawned.len());
        for (name, count) in by_type {
            info!("  {}: {}", name, count);
        }
        for (terrain, count) in by_terrain {
            info!("  on {}: {}", terrain, count);
        }
    }

    pub fn log_spawned(&self) {
        info!("=== Spawned deposits ({}) ===", self.spawned.len());
        for (index, info) in self.spawned.iter().enumerate() {
            info!(
                "  {}: {} at ({:.0}, {:.0}, {:.0}) [{}]",
                index + 1,
                info.definition.deposit_name,
                info.location.x,
                info.location.y,
                info.location.z,
                info.terrain_type.label()
            );
        }
    }
}
