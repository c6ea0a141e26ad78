use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    config::{CostTable, TerrainConfig, ZoneConfig},
    engine::{GeneratorSettings, MapGenerator},
    grid::{Terrain, TilePos},
};

fn default_width() -> i32 {
    15
}

fn default_height() -> i32 {
    15
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default)]
    pub zones: ZoneConfig,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub units: Vec<ScenarioUnit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioUnit {
    pub name: String,
    pub speed: u32,
    pub x: i32,
    pub y: i32,
}

impl ScenarioUnit {
    pub fn position(&self) -> TilePos {
        TilePos::new(self.x, self.y)
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario '{scenario}' is invalid: {reason}")]
    Validation { scenario: String, reason: String },
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Rejected {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let invalid = |reason: String| ScenarioError::Validation {
            scenario: self.name.clone(),
            reason,
        };

        if self.width <= 0 || self.height <= 0 {
            return Err(invalid(format!(
                "dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.zones.margin < 0 || self.zones.zone_size <= 0 {
            return Err(invalid(format!(
                "zone margin must be non-negative and size positive, got margin {} size {}",
                self.zones.margin, self.zones.zone_size
            )));
        }
        let largest = self.width.max(self.height);
        if self.zones.margin > largest || self.zones.zone_size > largest {
            return Err(invalid(format!(
                "zone margin {} and size {} must not exceed a {}x{} map",
                self.zones.margin, self.zones.zone_size, self.width, self.height
            )));
        }
        for (terrain, layer) in self.terrain.layers() {
            if let Some(layer) = layer {
                layer.check(terrain).map_err(invalid)?;
            }
        }
        check_costs(&self.terrain.road.costs).map_err(invalid)?;
        for unit in &self.units {
            if !(0..self.width).contains(&unit.x) || !(0..self.height).contains(&unit.y) {
                return Err(invalid(format!(
                    "unit '{}' starts off the map at ({}, {})",
                    unit.name, unit.x, unit.y
                )));
            }
        }
        Ok(())
    }

    pub fn settings(&self, seed_override: Option<u64>) -> GeneratorSettings {
        GeneratorSettings::new(self.name.clone(), seed_override.unwrap_or(self.seed))
    }

    pub fn build_generator(&self, settings: GeneratorSettings) -> MapGenerator {
        MapGenerator::standard(settings, self.terrain.clone(), self.zones)
    }
}

fn check_costs(costs: &CostTable) -> Result<(), String> {
    for terrain in Terrain::ALL {
        let cost = costs.cost(terrain);
        if cost.is_nan() || cost < 0.0 {
            return Err(format!(
                "{} movement cost must be non-negative, got {}",
                terrain.name(),
                cost
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Scenario {
        serde_yaml::from_str(yaml).expect("yaml parses")
    }

    #[test]
    fn test_minimal_scenario_uses_defaults() {
        let scenario = parse("name: bare\nseed: 3\n");
        assert_eq!((scenario.width, scenario.height), (15, 15));
        assert_eq!(scenario.zones, ZoneConfig::default());
        assert!(scenario.terrain.mountain.is_none());
        assert!(scenario.units.is_empty());
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_scale() {
        let scenario = parse("name: flat\nseed: 1\nterrain:\n  water:\n    threshold: 0.3\n    scale: 0\n");
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("water scale"));
    }

    #[test]
    fn test_rejects_inverted_cluster_range() {
        let scenario = parse(
            "name: c\nseed: 1\nterrain:\n  mountain:\n    threshold: 0.5\n    scale: 12\n    cluster_min: 9\n    cluster_max: 2\n",
        );
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_cost_and_off_map_units() {
        let scenario = parse("name: c\nseed: 1\nterrain:\n  road:\n    costs:\n      grass: -1\n");
        assert!(scenario.validate().is_err());

        let scenario = parse("name: u\nseed: 1\nwidth: 4\nheight: 4\nunits:\n  - name: lost\n    speed: 3\n    x: 4\n    y: 0\n");
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("lost"));
    }

    #[test]
    fn test_rejects_zones_larger_than_the_map() {
        let scenario = parse("name: z\nseed: 1\nwidth: 5\nheight: 5\nzones:\n  margin: 2147483647\n  zone_size: 1\n");
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("zone margin 2147483647"));

        let scenario = parse("name: z\nseed: 1\nwidth: 4\nheight: 4\n");
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_seed_override() {
        let scenario = parse("name: s\nseed: 10\n");
        assert_eq!(scenario.settings(None).seed, 10);
        assert_eq!(scenario.settings(Some(99)).seed, 99);
    }
}
