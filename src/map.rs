use crate::grid::{Terrain, TileGrid, TilePos};

/// A reserved square of guaranteed-walkable tiles at a map corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnZone {
    pub anchor: TilePos,
    pub size: i32,
}

impl SpawnZone {
    pub fn center(&self) -> TilePos {
        TilePos::new(
            self.anchor.x.saturating_add(self.size / 2),
            self.anchor.y.saturating_add(self.size / 2),
        )
    }

    /// Tiles of the block that lie on `grid`, clipped before iterating.
    pub fn tiles(&self, grid: &TileGrid) -> impl Iterator<Item = TilePos> {
        let (width, height) = grid.dimensions();
        let SpawnZone { anchor, size } = *self;
        let xs = anchor.x.max(0)..anchor.x.saturating_add(size).min(width);
        let ys = anchor.y.max(0)..anchor.y.saturating_add(size).min(height);
        ys.flat_map(move |y| xs.clone().map(move |x| TilePos::new(x, y)))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadSummary {
    pub key_points: Vec<TilePos>,
    pub connected_pairs: Vec<(TilePos, TilePos)>,
    pub unconnected_pairs: Vec<(TilePos, TilePos)>,
    pub pruned_tiles: usize,
}

/// The grid under generation plus what earlier stages leave for later ones.
#[derive(Debug, Clone)]
pub struct MapState {
    pub(crate) grid: TileGrid,
    pub(crate) zones: Vec<SpawnZone>,
    pub(crate) roads: RoadSummary,
}

impl MapState {
    pub fn new(grid: TileGrid) -> Self {
        Self {
            grid,
            zones: Vec::new(),
            roads: RoadSummary::default(),
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn zones(&self) -> &[SpawnZone] {
        &self.zones
    }

    pub fn roads(&self) -> &RoadSummary {
        &self.roads
    }

    /// Terrain histogram in `Terrain::ALL` order.
    pub fn terrain_counts(&self) -> Vec<(Terrain, usize)> {
        Terrain::ALL
            .iter()
            .map(|&terrain| (terrain, self.grid.count(terrain)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_center() {
        let zone = SpawnZone {
            anchor: TilePos::new(2, 2),
            size: 3,
        };
        assert_eq!(zone.center(), TilePos::new(3, 3));
    }

    #[test]
    fn test_zone_tiles_are_clipped() {
        let grid = TileGrid::new(4, 4).unwrap();
        let zone = SpawnZone {
            anchor: TilePos::new(2, -1),
            size: 3,
        };
        let tiles: Vec<_> = zone.tiles(&grid).collect();
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|pos| grid.contains(*pos)));
    }

    #[test]
    fn test_extreme_zone_values_clip_without_overflow() {
        let grid = TileGrid::new(5, 5).unwrap();
        let far = SpawnZone {
            anchor: TilePos::new(i32::MAX, i32::MAX),
            size: 1,
        };
        assert_eq!(far.tiles(&grid).count(), 0);
        assert_eq!(far.center(), TilePos::new(i32::MAX, i32::MAX));

        let huge = SpawnZone {
            anchor: TilePos::new(-3, 1),
            size: i32::MAX,
        };
        assert_eq!(huge.tiles(&grid).count(), 5 * 4);
    }
}
