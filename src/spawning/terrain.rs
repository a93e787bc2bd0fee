//! Terrain height queries and the classification used by spawn rules.
//!
//! The ground plane is XZ and elevation is Y. Samplers answer height queries;
//! [`Terrain`] layers slope, water and terrain-type analysis on top.
use std::f32::consts::TAU;

use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

const SLOPE_SAMPLE_DISTANCE: f32 = 100.0;
const WATER_DROP_THRESHOLD: f32 = 50.0;
const WATER_SAMPLE_COUNT: usize = 8;
const WATER_SAMPLES_REQUIRED: usize = 2;
pub const COASTLINE_WATER_RADIUS: f32 = 2000.0;

const COASTLINE_MAX_ELEVATION: f32 = 100.0;
const MOUNTAIN_MIN_ELEVATION: f32 = 1000.0;
const MOUNTAIN_MIN_SLOPE: f32 = 0.3;
const HILLS_MIN_ELEVATION: f32 = 500.0;
const HILLS_MIN_SLOPE: f32 = 0.15;
const PLAINS_MAX_SLOPE: f32 = 0.05;
const PLAINS_MAX_ELEVATION: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    Plains,
    Hills,
    Mountains,
    Coastline,
    Forest,
    /// Never produced by [`Terrain::analyze_terrain_type`]; rules may still list it.
    Desert,
}

impl TerrainType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Plains => "plains",
            Self::Hills => "hills",
            Self::Mountains => "mountains",
            Self::Coastline => "coastline",
            Self::Forest => "forest",
            Self::Desert => "desert",
        }
    }
}

/// Ground height query. `None` means nothing was hit.
pub trait TerrainSampler: Send + Sync {
    fn height_at(&self, x: f32, z: f32) -> Option<f32>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain {
    pub height: f32,
}

impl TerrainSampler for FlatTerrain {
    fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        Some(self.height)
    }
}

/// Inputs for [`Heightmap::generate`].
#[derive(Debug, Clone, Copy)]
pub struct HeightmapParams {
    pub seed: u64,
    /// Minimum X/Z corner covered by the map.
    pub origin: Vec2,
    pub extent: Vec2,
    pub cell_size: f32,
    pub amplitude: f32,
    pub base_height: f32,
}

const NOISE_FREQUENCY: f64 = 1.0 / 4000.0;
const NOISE_OCTAVES: usize = 3;
const NOISE_LACUNARITY: f64 = 4.0;
const NOISE_PERSISTENCE: f64 = 0.35;

/// Regular grid of heights sampled bilinearly. Queries outside the grid miss.
#[derive(Debug, Clone)]
pub struct Heightmap {
    origin: Vec2,
    cell_size: f32,
    width: usize,
    depth: usize,
    heights: Vec<f32>,
}

impl Heightmap {
    /// Builds a map from `width * depth` heights in row-major (z, then x) order.
    pub fn new(
        origin: Vec2,
        cell_size: f32,
        width: usize,
        depth: usize,
        heights: Vec<f32>,
    ) -> Option<Self> {
        if cell_size <= 0.0 || width < 2 || depth < 2 || heights.len() != width * depth {
            return None;
        }
        Some(Self {
            origin,
            cell_size,
            width,
            depth,
            heights,
        })
    }

    /// Seeded fractal Perlin landscape.
    pub fn generate(params: HeightmapParams) -> Self {
        let cell_size = params.cell_size.max(1.0);
        let width = (params.extent.x.max(cell_size) / cell_size).ceil() as usize + 1;
        let depth = (params.extent.y.max(cell_size) / cell_size).ceil() as usize + 1;

        let noise_seed: u32 = ChaCha8Rng::seed_from_u64(params.seed).gen();
        let fbm: Fbm<Perlin> = Fbm::new(noise_seed)
            .set_frequency(NOISE_FREQUENCY)
            .set_octaves(NOISE_OCTAVES)
            .set_lacunarity(NOISE_LACUNARITY)
            .set_persistence(NOISE_PERSISTENCE);

        let mut heights = Vec::with_capacity(width * depth);
        for row in 0..depth {
            for col in 0..width {
                let x = params.origin.x + col as f32 * cell_size;
                let z = params.origin.y + row as f32 * cell_size;
                let value = fbm.get([x as f64, z as f64]).clamp(-1.0, 1.0) as f32;
                heights.push(params.base_height + params.amplitude * value);
            }
        }

        Self {
            origin: params.origin,
            cell_size,
            width,
            depth,
            heights,
        }
    }

    fn height(&self, col: usize, row: usize) -> f32 {
        self.heights[row * self.width + col]
    }
}

impl TerrainSampler for Heightmap {
    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let gx = (x - self.origin.x) / self.cell_size;
        let gz = (z - self.origin.y) / self.cell_size;
        let max_x = (self.width - 1) as f32;
        let max_z = (self.depth - 1) as f32;
        if !(0.0..=max_x).contains(&gx) || !(0.0..=max_z).contains(&gz) {
            return None;
        }

        let col = (gx.floor() as usize).min(self.width - 2);
        let row = (gz.floor() as usize).min(self.depth - 2);
        let tx = gx - col as f32;
        let tz = gz - row as f32;

        let near = lerp(self.height(col, row), self.height(col + 1, row), tx);
        let far = lerp(self.height(col, row + 1), self.height(col + 1, row + 1), tx);
        Some(lerp(near, far, tz))
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// The world's ground, as seen by deposit placement.
#[derive(Resource)]
pub struct Terrain {
    sampler: Box<dyn TerrainSampler>,
}

impl Default for Terrain {
    fn default() -> Self {
        Self::new(FlatTerrain::default())
    }
}

impl Terrain {
    pub fn new(sampler: impl TerrainSampler + 'static) -> Self {
        Self {
            sampler: Box::new(sampler),
        }
    }

    /// Ground height under `location`, or its own Y when the query misses.
    pub fn elevation_at(&self, location: Vec3) -> f32 {
        self.sampler
            .height_at(location.x, location.z)
            .unwrap_or(location.y)
    }

    /// Steeper of the north-south and east-west gradients around `location`.
    pub fn slope_at(&self, location: Vec3) -> f32 {
        let d = SLOPE_SAMPLE_DISTANCE;
        let north = self.elevation_at(location + Vec3::new(0.0, 0.0, d));
        let south = self.elevation_at(location - Vec3::new(0.0, 0.0, d));
        let east = self.elevation_at(location + Vec3::new(d, 0.0, 0.0));
        let west = self.elevation_at(location - Vec3::new(d, 0.0, 0.0));

        let north_south = (north - south).abs() / (2.0 * d);
        let east_west = (east - west).abs() / (2.0 * d);
        north_south.max(east_west)
    }

    /// True when at least two of eight samples on a circle of `radius` sit
    /// noticeably below `location`.
    pub fn is_near_water(&self, location: Vec3, radius: f32) -> bool {
        if radius <= 0.0 {
            return false;
        }
        let center = self.elevation_at(location);
        let lower = (0..WATER_SAMPLE_COUNT)
            .filter(|&i| {
                let angle = TAU * i as f32 / WATER_SAMPLE_COUNT as f32;
                let sample = location + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
                self.elevation_at(sample) < center - WATER_DROP_THRESHOLD
            })
            .count();
        lower >= WATER_SAMPLES_REQUIRED
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_in_water(&self, location: Vec3) -> bool {
        self.elevation_at(location) < 0.0
    }

    pub fn analyze_terrain_type(&self, location: Vec3) -> TerrainType {
        let elevation = self.elevation_at(location);
        if elevation < COASTLINE_MAX_ELEVATION
            && self.is_near_water(location, COASTLINE_WATER_RADIUS)
        {
            return TerrainType::Coastline;
        }

        let slope = self.slope_at(location);
        if elevation > MOUNTAIN_MIN_ELEVATION && slope > MOUNTAIN_MIN_SLOPE {
            TerrainType::Mountains
        } else if elevation > HILLS_MIN_ELEVATION && slope > HILLS_MIN_SLOPE {
            TerrainType::Hills
        } else if slope < PLAINS_MAX_SLOPE && elevation < PLAINS_MAX_ELEVATION {
            TerrainType::Plains
        } else {
            TerrainType::Forest
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Height given by a closure; handy for hand-shaped test landscapes.
    pub struct FnTerrain<F>(pub F);

    impl<F> TerrainSampler for FnTerrain<F>
    where
        F: Fn(f32, f32) -> f32 + Send + Sync,
    {
        fn height_at(&self, x: f32, z: f32) -> Option<f32> {
            Some((self.0)(x, z))
        }
    }
}
