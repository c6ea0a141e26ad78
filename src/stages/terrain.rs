use anyhow::Result;
use rand::{seq::SliceRandom, Rng};
use tracing::Span;

use crate::{
    config::{NoiseLayer, TerrainConfig},
    engine::{Stage, StageContext},
    error::GridError,
    grid::{Terrain, TileGrid, TilePos},
    map::MapState,
    noise_field::NoiseField,
    rng::StageRng,
};

/// Grass base layer, then noise-seeded mountain and water clusters.
pub struct TerrainGenerator {
    config: TerrainConfig,
    span: Span,
}

impl TerrainGenerator {
    /// `span` parents every event the stage emits.
    pub fn new(config: TerrainConfig, span: Span) -> Self {
        Self { config, span }
    }
}

impl Default for TerrainGenerator {
    fn default() -> Self {
        Self::new(TerrainConfig::default(), Span::none())
    }
}

impl Stage for TerrainGenerator {
    fn name(&self) -> &str {
        "terrain"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        map: &mut MapState,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let _guard = self.span.enter();
        map.grid.fill(Terrain::Grass);
        for (terrain, layer) in self.config.layers() {
            let Some(layer) = layer else {
                tracing::info!(
                    target: "tactica::terrain",
                    map = ctx.map_name,
                    terrain = terrain.name(),
                    "terrain.layer.skipped"
                );
                continue;
            };
            if let Err(reason) = layer.check(terrain) {
                tracing::warn!(
                    target: "tactica::terrain",
                    map = ctx.map_name,
                    terrain = terrain.name(),
                    %reason,
                    "terrain.layer.rejected"
                );
                continue;
            }
            let claimed = paint_layer(&mut map.grid, terrain, layer, rng)?;
            tracing::info!(
                target: "tactica::terrain",
                map = ctx.map_name,
                seed = ctx.seed,
                terrain = terrain.name(),
                threshold = layer.threshold,
                scale = layer.scale,
                claimed,
                "terrain.layer.painted"
            );
        }
        Ok(())
    }
}

/// Seed clusters of `terrain` wherever the layer's noise exceeds its threshold.
/// Mountains only seed within `min(width, height) / 3` tiles of an edge.
pub fn paint_layer<R: Rng + ?Sized>(
    grid: &mut TileGrid,
    terrain: Terrain,
    layer: &NoiseLayer,
    rng: &mut R,
) -> Result<usize, GridError> {
    let field = NoiseField::new(rng.gen());
    tracing::debug!(target: "tactica::terrain", terrain = terrain.name(), seed = field.seed(), "terrain.noise.seeded");

    let (width, height) = grid.dimensions();
    let edge_limit = width.min(height) / 3;
    let (low, high) = layer.cluster_range(terrain);
    let (low, high) = (low.min(high), low.max(high));

    let mut claimed = 0;
    for row in 0..height {
        for col in 0..width {
            if terrain == Terrain::Mountain {
                let edge_distance = row.min(col).min(height - row - 1).min(width - col - 1);
                if edge_distance > edge_limit {
                    continue;
                }
            }
            if field.sample(row, col, layer.scale) > layer.threshold {
                let budget = rng.gen_range(low..=high);
                claimed += flood_fill(grid, TilePos::new(col, row), terrain, budget, rng)?;
            }
        }
    }
    Ok(claimed)
}

/// Grow a blob of `terrain` from `start` over grass only, claiming at most `budget` tiles.
///
/// Neighbours are expanded depth-first in a shuffled order from an explicit stack.
/// Returns the number of tiles claimed.
pub fn flood_fill<R: Rng + ?Sized>(
    grid: &mut TileGrid,
    start: TilePos,
    terrain: Terrain,
    budget: u32,
    rng: &mut R,
) -> Result<usize, GridError> {
    let mut remaining = budget;
    let mut claimed = 0;
    let mut stack = vec![start];
    while let Some(pos) = stack.pop() {
        if remaining == 0 {
            break;
        }
        match grid.terrain(pos) {
            Ok(Terrain::Grass) => {}
            Ok(_) | Err(GridError::OutOfBounds { .. }) => continue,
            Err(err) => return Err(err),
        }
        grid.set_terrain(pos, terrain)?;
        remaining -= 1;
        claimed += 1;

        let mut directions = pos.orthogonal();
        directions.shuffle(rng);
        // Last pushed is expanded first.
        stack.extend(directions.iter().rev());
    }
    Ok(claimed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::rng::RngManager;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn connected(tiles: &HashSet<TilePos>) -> bool {
        let Some(&first) = tiles.iter().next() else {
            return true;
        };
        let mut seen = HashSet::from([first]);
        let mut stack = vec![first];
        while let Some(pos) = stack.pop() {
            for next in pos.orthogonal() {
                if tiles.contains(&next) && seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen.len() == tiles.len()
    }

    #[test]
    fn test_flood_fill_claims_full_budget_on_open_grass() {
        let mut grid = TileGrid::new(12, 12).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let claimed = flood_fill(&mut grid, TilePos::new(6, 6), Terrain::Water, 9, &mut rng).unwrap();
        assert_eq!(claimed, 9);
        let water: HashSet<_> = grid
            .positions()
            .filter(|pos| grid.terrain(*pos) == Ok(Terrain::Water))
            .collect();
        assert_eq!(water.len(), 9);
        assert!(water.contains(&TilePos::new(6, 6)));
        assert!(connected(&water));
    }

    #[test]
    fn test_flood_fill_never_overwrites_claimed_tiles() {
        let mut grid = TileGrid::new(5, 5).unwrap();
        grid.set_terrain(TilePos::new(2, 2), Terrain::Mountain).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let claimed = flood_fill(&mut grid, TilePos::new(2, 2), Terrain::Water, 10, &mut rng).unwrap();
        assert_eq!(claimed, 0);
        assert_eq!(grid.count(Terrain::Water), 0);
        assert_eq!(grid.count(Terrain::Mountain), 1);
    }

    #[test]
    fn test_flood_fill_is_bounded_by_grid_and_budget() {
        let mut grid = TileGrid::new(2, 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let claimed = flood_fill(&mut grid, TilePos::new(0, 0), Terrain::Water, 50, &mut rng).unwrap();
        assert_eq!(claimed, 4);

        let mut grid = TileGrid::new(4, 4).unwrap();
        assert_eq!(
            flood_fill(&mut grid, TilePos::new(1, 1), Terrain::Water, 0, &mut rng).unwrap(),
            0
        );
        assert_eq!(
            flood_fill(&mut grid, TilePos::new(-3, 1), Terrain::Water, 4, &mut rng).unwrap(),
            0
        );
    }

    #[test]
    fn test_flood_fill_is_reproducible() {
        let run = |seed| {
            let mut grid = TileGrid::new(10, 10).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            flood_fill(&mut grid, TilePos::new(5, 5), Terrain::Mountain, 12, &mut rng).unwrap();
            grid
        };
        assert_eq!(run(17), run(17));
    }

    #[test]
    fn test_mountains_hug_the_edges() {
        let mut grid = TileGrid::new(12, 12).unwrap();
        let layer = NoiseLayer::new(-1.5, 12.0).with_cluster(1, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let claimed = paint_layer(&mut grid, Terrain::Mountain, &layer, &mut rng).unwrap();

        // Only the 2x2 core is further than 12 / 3 = 4 tiles from every edge.
        assert_eq!(claimed, 140);
        for pos in [(5, 5), (5, 6), (6, 5), (6, 6)] {
            assert_eq!(grid.terrain(TilePos::new(pos.0, pos.1)), Ok(Terrain::Grass));
        }
    }

    #[test]
    fn test_stage_skips_layers_that_fail_the_check() {
        let config = TerrainConfig {
            mountain: Some(NoiseLayer::new(-1.5, 6.0).with_cluster(9, 2)),
            water: Some(NoiseLayer::new(-1.5, 0.0)),
            ..TerrainConfig::default()
        };
        let mut stage = TerrainGenerator::new(config, Span::none());
        let mut map = MapState::new(TileGrid::new(6, 6).unwrap());
        let mut streams = RngManager::new(4);
        let ctx = StageContext {
            map_name: "unit",
            seed: 4,
        };
        stage.run(&ctx, &mut map, &mut streams.stream("terrain")).unwrap();
        assert_eq!(map.grid().count(Terrain::Grass), 36);
    }

    #[test]
    fn test_threshold_above_range_paints_nothing() {
        let mut grid = TileGrid::new(10, 10).unwrap();
        let layer = NoiseLayer::new(1.0, 8.0);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert_eq!(paint_layer(&mut grid, Terrain::Water, &layer, &mut rng).unwrap(), 0);
        assert_eq!(grid.count(Terrain::Grass), 100);
    }
}
