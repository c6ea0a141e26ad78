//! Generation tuning knobs, deserialized from scenario files

use serde::{Deserialize, Serialize};

use crate::grid::Terrain;

fn default_margin() -> i32 {
    2
}

fn default_zone_size() -> i32 {
    3
}

fn default_grass_cost() -> f64 {
    1.0
}

fn default_road_cost() -> f64 {
    0.5
}

fn default_mountain_cost() -> f64 {
    5.0
}

fn default_water_cost() -> f64 {
    10.0
}

/// Noise threshold and scale for one clustered terrain kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayer {
    pub threshold: f64,
    pub scale: f64,
    /// Smallest flood-fill budget drawn per seed point; per-kind default when omitted.
    #[serde(default)]
    pub cluster_min: Option<u32>,
    #[serde(default)]
    pub cluster_max: Option<u32>,
}

impl NoiseLayer {
    pub fn new(threshold: f64, scale: f64) -> Self {
        Self {
            threshold,
            scale,
            cluster_min: None,
            cluster_max: None,
        }
    }

    pub fn with_cluster(mut self, min: u32, max: u32) -> Self {
        self.cluster_min = Some(min);
        self.cluster_max = Some(max);
        self
    }

    /// Inclusive budget range, falling back to the defaults for `terrain`.
    pub fn cluster_range(&self, terrain: Terrain) -> (u32, u32) {
        let (min, max) = match terrain {
            Terrain::Mountain => (4, 12),
            _ => (5, 10),
        };
        (self.cluster_min.unwrap_or(min), self.cluster_max.unwrap_or(max))
    }

    /// Reject layers that cannot be sampled or drawn from.
    pub fn check(&self, terrain: Terrain) -> Result<(), String> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(format!(
                "{} scale must be a positive number, got {}",
                terrain.name(),
                self.scale
            ));
        }
        if self.threshold.is_nan() {
            return Err(format!("{} threshold is not a number", terrain.name()));
        }
        let (min, max) = self.cluster_range(terrain);
        if min > max {
            return Err(format!(
                "{} cluster_min {} exceeds cluster_max {}",
                terrain.name(),
                min,
                max
            ));
        }
        Ok(())
    }
}

/// Per-terrain cost of entering a tile. `f64::INFINITY` marks terrain as impassable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostTable {
    #[serde(default = "default_grass_cost")]
    pub grass: f64,
    #[serde(default = "default_road_cost")]
    pub road: f64,
    #[serde(default = "default_mountain_cost")]
    pub mountain: f64,
    #[serde(default = "default_water_cost")]
    pub water: f64,
}

impl CostTable {
    pub fn cost(&self, terrain: Terrain) -> f64 {
        match terrain {
            Terrain::Grass => self.grass,
            Terrain::Road => self.road,
            Terrain::Mountain => self.mountain,
            Terrain::Water => self.water,
        }
    }
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            grass: default_grass_cost(),
            road: default_road_cost(),
            mountain: default_mountain_cost(),
            water: default_water_cost(),
        }
    }
}

/// Road settings. `segments`, `min_length` and `max_length` are carried for
/// scenario compatibility; the planner connects key points regardless.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoadConfig {
    #[serde(default)]
    pub segments: u32,
    #[serde(default)]
    pub min_length: u32,
    #[serde(default)]
    pub max_length: u32,
    #[serde(default)]
    pub costs: CostTable,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerrainConfig {
    #[serde(default)]
    pub mountain: Option<NoiseLayer>,
    #[serde(default)]
    pub water: Option<NoiseLayer>,
    #[serde(default)]
    pub road: RoadConfig,
}

impl TerrainConfig {
    /// Layers in painting order. Missing layers are reported as `None`.
    pub fn layers(&self) -> [(Terrain, Option<&NoiseLayer>); 2] {
        [
            (Terrain::Mountain, self.mountain.as_ref()),
            (Terrain::Water, self.water.as_ref()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    #[serde(default = "default_margin")]
    pub margin: i32,
    #[serde(default = "default_zone_size")]
    pub zone_size: i32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            zone_size: default_zone_size(),
        }
    }
}
