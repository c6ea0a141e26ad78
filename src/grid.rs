//! Tile grid - the only owner and mutator of tile state

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Terrain kinds a tile can carry. Grass is the background value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Grass,
    Water,
    Mountain,
    Road,
}

impl Terrain {
    pub const ALL: [Terrain; 4] = [
        Terrain::Grass,
        Terrain::Water,
        Terrain::Mountain,
        Terrain::Road,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Grass => "grass",
            Terrain::Water => "water",
            Terrain::Mountain => "mountain",
            Terrain::Road => "road",
        }
    }
}

/// Tile position. Signed so that off-grid neighbours can be expressed and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four orthogonal neighbours, without bounds checks.
    pub fn orthogonal(self) -> [TilePos; 4] {
        [
            TilePos::new(self.x, self.y - 1),
            TilePos::new(self.x, self.y + 1),
            TilePos::new(self.x - 1, self.y),
            TilePos::new(self.x + 1, self.y),
        ]
    }

    pub fn manhattan(self, other: TilePos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    /// Initiative; higher speeds act first.
    pub speed: u32,
}

impl Unit {
    pub fn new(id: UnitId, name: impl Into<String>, speed: u32) -> Self {
        Self {
            id,
            name: name.into(),
            speed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tile {
    pub terrain: Terrain,
    pub occupant: Option<Unit>,
}

impl Tile {
    pub fn is_walkable(&self) -> bool {
        self.terrain != Terrain::Water && self.occupant.is_none()
    }
}

/// Fixed-size, row-major grid of tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        let count = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            tiles: vec![Tile::default(); count],
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn dimensions(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    fn index(&self, pos: TilePos) -> Result<usize, GridError> {
        if self.contains(pos) {
            Ok(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            Err(GridError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn get(&self, pos: TilePos) -> Result<&Tile, GridError> {
        let idx = self.index(pos)?;
        Ok(&self.tiles[idx])
    }

    pub fn terrain(&self, pos: TilePos) -> Result<Terrain, GridError> {
        self.get(pos).map(|tile| tile.terrain)
    }

    pub fn set_terrain(&mut self, pos: TilePos, terrain: Terrain) -> Result<(), GridError> {
        let idx = self.index(pos)?;
        self.tiles[idx].terrain = terrain;
        Ok(())
    }

    /// Reset every tile's terrain, leaving occupants in place.
    pub fn fill(&mut self, terrain: Terrain) {
        for tile in &mut self.tiles {
            tile.terrain = terrain;
        }
    }

    pub fn place_unit(&mut self, pos: TilePos, unit: Unit) -> Result<(), GridError> {
        let idx = self.index(pos)?;
        let tile = &mut self.tiles[idx];
        if tile.occupant.is_some() {
            return Err(GridError::TileOccupied { x: pos.x, y: pos.y });
        }
        tile.occupant = Some(unit);
        Ok(())
    }

    pub fn remove_unit(&mut self, pos: TilePos) -> Result<Option<Unit>, GridError> {
        let idx = self.index(pos)?;
        Ok(self.tiles[idx].occupant.take())
    }

    pub fn is_walkable(&self, pos: TilePos) -> Result<bool, GridError> {
        self.get(pos).map(Tile::is_walkable)
    }

    /// In-bounds orthogonal neighbours (4-connectivity).
    pub fn neighbors(&self, pos: TilePos) -> impl Iterator<Item = TilePos> + '_ {
        pos.orthogonal()
            .into_iter()
            .filter(move |candidate| self.contains(*candidate))
    }

    /// Every coordinate in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = TilePos> {
        let (width, height) = self.dimensions();
        (0..height).flat_map(move |y| (0..width).map(move |x| TilePos::new(x, y)))
    }

    pub fn units(&self) -> impl Iterator<Item = (TilePos, &Unit)> + '_ {
        self.positions()
            .zip(self.tiles.iter())
            .filter_map(|(pos, tile)| tile.occupant.as_ref().map(|unit| (pos, unit)))
    }

    pub fn count(&self, terrain: Terrain) -> usize {
        self.tiles.iter().filter(|t| t.terrain == terrain).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_grass() {
        let grid = TileGrid::new(10, 5).unwrap();
        assert_eq!(grid.dimensions(), (10, 5));
        assert_eq!(grid.count(Terrain::Grass), 50);
        assert!(grid.units().next().is_none());
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        assert_eq!(
            TileGrid::new(0, 4),
            Err(GridError::InvalidDimensions { width: 0, height: 4 })
        );
        assert!(TileGrid::new(4, -1).is_err());
    }

    #[test]
    fn test_out_of_bounds_is_reported() {
        let mut grid = TileGrid::new(3, 3).unwrap();
        let err = grid.set_terrain(TilePos::new(-1, 0), Terrain::Road).unwrap_err();
        assert_eq!(
            err,
            GridError::OutOfBounds {
                x: -1,
                y: 0,
                width: 3,
                height: 3
            }
        );
        assert!(grid.get(TilePos::new(3, 0)).is_err());
        assert!(grid.get(TilePos::new(0, 3)).is_err());
        assert_eq!(grid.count(Terrain::Road), 0);
    }

    #[test]
    fn test_place_unit_on_occupied_tile_fails() {
        let mut grid = TileGrid::new(4, 4).unwrap();
        let pos = TilePos::new(1, 2);
        grid.place_unit(pos, Unit::new(UnitId(1), "archer", 10))
            .unwrap();
        let before = grid.clone();

        let err = grid
            .place_unit(pos, Unit::new(UnitId(2), "knight", 15))
            .unwrap_err();

        assert_eq!(err, GridError::TileOccupied { x: 1, y: 2 });
        assert_eq!(grid, before);
        assert_eq!(grid.get(pos).unwrap().occupant.as_ref().unwrap().name, "archer");
    }

    #[test]
    fn test_walkability() {
        let mut grid = TileGrid::new(3, 1).unwrap();
        grid.set_terrain(TilePos::new(0, 0), Terrain::Water).unwrap();
        grid.place_unit(TilePos::new(1, 0), Unit::new(UnitId(1), "scout", 3))
            .unwrap();
        assert!(!grid.is_walkable(TilePos::new(0, 0)).unwrap());
        assert!(!grid.is_walkable(TilePos::new(1, 0)).unwrap());
        assert!(grid.is_walkable(TilePos::new(2, 0)).unwrap());
    }

    #[test]
    fn test_neighbors() {
        let grid = TileGrid::new(10, 5).unwrap();
        assert_eq!(grid.neighbors(TilePos::new(0, 0)).count(), 2);
        assert_eq!(grid.neighbors(TilePos::new(5, 2)).count(), 4);
        assert_eq!(grid.neighbors(TilePos::new(9, 4)).count(), 2);
    }

    #[test]
    fn test_positions_are_row_major() {
        let grid = TileGrid::new(2, 2).unwrap();
        let positions: Vec<_> = grid.positions().collect();
        assert_eq!(
            positions,
            vec![
                TilePos::new(0, 0),
                TilePos::new(1, 0),
                TilePos::new(0, 1),
                TilePos::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(TilePos::new(0, 0).manhattan(TilePos::new(3, 4)), 7);
        assert_eq!(TilePos::new(-2, 1).manhattan(TilePos::new(1, -1)), 5);
    }
}
