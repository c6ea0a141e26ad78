use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use anyhow::Result;
use rand::Rng;
use tracing::Span;

use crate::{
    config::{CostTable, RoadConfig},
    engine::{Stage, StageContext},
    error::GridError,
    grid::{Terrain, TileGrid, TilePos},
    map::{MapState, RoadSummary, SpawnZone},
    rng::StageRng,
};

/// Connects spawn zone centres and a random central point with least-cost roads.
pub struct RoadPlanner {
    config: RoadConfig,
    span: Span,
}

impl RoadPlanner {
    pub fn new(config: RoadConfig, span: Span) -> Self {
        Self { config, span }
    }
}

impl Default for RoadPlanner {
    fn default() -> Self {
        Self::new(RoadConfig::default(), Span::none())
    }
}

impl Stage for RoadPlanner {
    fn name(&self) -> &str {
        "roads"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        map: &mut MapState,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let _guard = self.span.enter();
        tracing::debug!(
            target: "tactica::roads",
            map = ctx.map_name,
            segments = self.config.segments,
            min_length = self.config.min_length,
            max_length = self.config.max_length,
            "roads.config"
        );
        let points = key_points(&map.grid, &map.zones, rng);
        tracing::info!(target: "tactica::roads", key_points = ?points, "roads.key_points");

        let mut summary = RoadSummary {
            key_points: points.clone(),
            ..RoadSummary::default()
        };
        for (i, &start) in points.iter().enumerate() {
            for &end in &points[i + 1..] {
                match shortest_path(&map.grid, start, end, &self.config.costs)? {
                    Some(path) => {
                        tracing::debug!(
                            target: "tactica::roads",
                            ?start,
                            ?end,
                            steps = path.steps(),
                            cost = path.cost,
                            "roads.connected"
                        );
                        mark_road(&mut map.grid, &path)?;
                        summary.connected_pairs.push((start, end));
                    }
                    None => {
                        tracing::warn!(target: "tactica::roads", ?start, ?end, "roads.unreachable");
                        summary.unconnected_pairs.push((start, end));
                    }
                }
            }
        }

        summary.pruned_tiles = prune_spurs(&mut map.grid);
        tracing::info!(
            target: "tactica::roads",
            map = ctx.map_name,
            connected = summary.connected_pairs.len(),
            unconnected = summary.unconnected_pairs.len(),
            pruned = summary.pruned_tiles,
            road_tiles = map.grid.count(Terrain::Road),
            "roads.complete"
        );
        map.roads = summary;
        Ok(())
    }
}

/// In-bounds zone centres followed by one point drawn from the middle third of the grid.
pub fn key_points<R: Rng + ?Sized>(grid: &TileGrid, zones: &[SpawnZone], rng: &mut R) -> Vec<TilePos> {
    let mut points = Vec::with_capacity(zones.len() + 1);
    for zone in zones {
        let center = zone.center();
        if grid.contains(center) {
            points.push(center);
        } else {
            tracing::warn!(target: "tactica::roads", ?center, "roads.zone_center_off_grid");
        }
    }
    let (width, height) = grid.dimensions();
    points.push(TilePos::new(
        rng.gen_range(width / 3..=2 * width / 3),
        rng.gen_range(height / 3..=2 * height / 3),
    ));
    points
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadPath {
    /// Source to destination, both included.
    pub tiles: Vec<TilePos>,
    pub cost: f64,
}

impl RoadPath {
    pub fn steps(&self) -> usize {
        self.tiles.len().saturating_sub(1)
    }
}

#[derive(Clone, Copy, PartialEq)]
struct Frontier {
    cost: f64,
    pos: TilePos,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap on cost.
        match other.cost.total_cmp(&self.cost) {
            Ordering::Equal => other.pos.cmp(&self.pos),
            ordering => ordering,
        }
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Least-cost 4-directional path from `from` to `to`.
///
/// Entering a tile costs `costs.cost(terrain)`; non-finite costs are impassable.
/// The search stops once the destination is popped, so the returned path is optimal.
/// `Ok(None)` means no passable route exists.
pub fn shortest_path(
    grid: &TileGrid,
    from: TilePos,
    to: TilePos,
    costs: &CostTable,
) -> Result<Option<RoadPath>, GridError> {
    grid.get(from)?;
    grid.get(to)?;

    let mut best: HashMap<TilePos, f64> = HashMap::new();
    let mut parents: HashMap<TilePos, TilePos> = HashMap::new();
    let mut heap = BinaryHeap::new();
    best.insert(from, 0.0);
    heap.push(Frontier { cost: 0.0, pos: from });

    while let Some(Frontier { cost, pos }) = heap.pop() {
        if pos == to {
            let mut tiles = vec![to];
            let mut current = to;
            while let Some(&prev) = parents.get(&current) {
                tiles.push(prev);
                current = prev;
            }
            tiles.reverse();
            return Ok(Some(RoadPath { tiles, cost }));
        }
        if cost > best.get(&pos).copied().unwrap_or(f64::INFINITY) {
            continue;
        }
        for next in grid.neighbors(pos) {
            let step = costs.cost(grid.terrain(next)?);
            if !step.is_finite() {
                continue;
            }
            let candidate = cost + step;
            if candidate < best.get(&next).copied().unwrap_or(f64::INFINITY) {
                best.insert(next, candidate);
                parents.insert(next, pos);
                heap.push(Frontier {
                    cost: candidate,
                    pos: next,
                });
            }
        }
    }
    Ok(None)
}

fn mark_road(grid: &mut TileGrid, path: &RoadPath) -> Result<(), GridError> {
    for pos in &path.tiles {
        grid.set_terrain(*pos, Terrain::Road)?;
    }
    Ok(())
}

/// Single row-major scan that reverts road tiles with at most one road neighbour to grass.
///
/// Tiles are rewritten in place, so a removal is visible to tiles scanned after it.
/// The scan does not repeat and does not check that key points stay connected.
pub fn prune_spurs(grid: &mut TileGrid) -> usize {
    let (width, height) = grid.dimensions();
    let mut pruned = 0;
    for y in 0..height {
        for x in 0..width {
            let pos = TilePos::new(x, y);
            if grid.terrain(pos) != Ok(Terrain::Road) {
                continue;
            }
            let road_neighbors = grid
                .neighbors(pos)
                .filter(|next| grid.terrain(*next) == Ok(Terrain::Road))
                .count();
            if road_neighbors <= 1 && grid.set_terrain(pos, Terrain::Grass).is_ok() {
                pruned += 1;
            }
        }
    }
    pruned
}
