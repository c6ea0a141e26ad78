use anyhow::{Context, Result};
use tracing::Span;

use crate::{
    config::{TerrainConfig, ZoneConfig},
    grid::TileGrid,
    map::MapState,
    rng::{RngManager, StageRng},
    stages::{RoadPlanner, TerrainGenerator, ZoneAllocator},
};

pub struct GeneratorSettings {
    pub map_name: String,
    pub seed: u64,
    /// Parent span for every stage's events.
    pub span: Span,
}

impl GeneratorSettings {
    pub fn new(map_name: impl Into<String>, seed: u64) -> Self {
        Self {
            map_name: map_name.into(),
            seed,
            span: Span::none(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

pub struct MapGeneratorBuilder {
    settings: GeneratorSettings,
    stages: Vec<Box<dyn Stage>>,
}

impl MapGeneratorBuilder {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            stages: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn build(self) -> MapGenerator {
        MapGenerator {
            settings: self.settings,
            stages: self.stages,
        }
    }
}

/// Runs its stages in insertion order over a fresh grid.
pub struct MapGenerator {
    settings: GeneratorSettings,
    stages: Vec<Box<dyn Stage>>,
}

impl MapGenerator {
    /// Terrain, then spawn zones, then roads. Each stage logs under its own
    /// span parented to `settings.span`.
    pub fn standard(settings: GeneratorSettings, terrain: TerrainConfig, zones: ZoneConfig) -> Self {
        let stage_span = |name: &'static str| tracing::info_span!(parent: &settings.span, "stage", name);
        let roads = terrain.road.clone();
        let terrain = TerrainGenerator::new(terrain, stage_span("terrain"));
        let zones = ZoneAllocator::new(zones, stage_span("zones"));
        let roads = RoadPlanner::new(roads, stage_span("roads"));
        MapGeneratorBuilder::new(settings)
            .with_stage(terrain)
            .with_stage(zones)
            .with_stage(roads)
            .build()
    }

    pub fn generate(&mut self, width: i32, height: i32) -> Result<MapState> {
        let grid = TileGrid::new(width, height)
            .with_context(|| format!("Failed to allocate grid for map '{}'", self.settings.map_name))?;
        let mut map = MapState::new(grid);
        self.run(&mut map)?;
        Ok(map)
    }

    /// Run every stage over an existing map. The RNG restarts from the seed on each call,
    /// and each stage draws from a stream keyed by its name.
    pub fn run(&mut self, map: &mut MapState) -> Result<()> {
        let mut rng = RngManager::new(self.settings.seed);
        let _map_guard = self.settings.span.enter();
        tracing::info!(
            target: "tactica::engine",
            map = %self.settings.map_name,
            seed = self.settings.seed,
            width = map.grid.width(),
            height = map.grid.height(),
            "generation.start"
        );
        for stage in &mut self.stages {
            tracing::debug!(target: "tactica::engine", stage = stage.name(), "stage.start");
            let mut rng_stream = rng.stream(stage.name());
            let ctx = StageContext {
                map_name: &self.settings.map_name,
                seed: self.settings.seed,
            };
            stage
                .run(&ctx, map, &mut rng_stream)
                .with_context(|| format!("Stage '{}' failed", stage.name()))?;
        }
        tracing::info!(target: "tactica::engine", "generation.complete");
        Ok(())
    }
}

pub struct StageContext<'a> {
    pub map_name: &'a str,
    pub seed: u64,
}

pub trait Stage {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &StageContext, map: &mut MapState, rng: &mut StageRng<'_>) -> Result<()>;
}
