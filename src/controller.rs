use anyhow::Result;
use tracing::Span;

use crate::{
    engine::MapGenerator,
    error::GridError,
    grid::{TileGrid, TilePos, Unit, UnitId},
    map::MapState,
    turns::TurnScheduler,
};

/// Hooks for whoever presents the board (a renderer, a log, nothing).
pub trait MapObserver {
    fn on_map_generated(&mut self, _map: &MapState) {}
    fn on_unit_added(&mut self, _pos: TilePos, _unit: &Unit) {}
}

pub struct NoopObserver;

impl MapObserver for NoopObserver {}

/// Reports map and unit events as tracing events.
pub struct LoggingObserver;

impl MapObserver for LoggingObserver {
    fn on_map_generated(&mut self, map: &MapState) {
        let (width, height) = map.grid().dimensions();
        for (terrain, tiles) in map.terrain_counts() {
            tracing::info!(target: "tactica::board", terrain = terrain.name(), tiles, "board.terrain");
        }
        tracing::info!(
            target: "tactica::board",
            width,
            height,
            zones = map.zones().len(),
            unconnected = map.roads().unconnected_pairs.len(),
            "board.generated"
        );
    }

    fn on_unit_added(&mut self, pos: TilePos, unit: &Unit) {
        tracing::info!(
            target: "tactica::board",
            name = %unit.name,
            speed = unit.speed,
            x = pos.x,
            y = pos.y,
            "board.unit_added"
        );
    }
}

/// Owns a generated map and the turn order for the units standing on it.
pub struct GridController<O: MapObserver> {
    map: MapState,
    scheduler: TurnScheduler,
    observer: O,
    span: Span,
    next_unit: u64,
}

impl<O: MapObserver> GridController<O> {
    pub fn generate(
        generator: &mut MapGenerator,
        width: i32,
        height: i32,
        mut observer: O,
        span: Span,
    ) -> Result<Self> {
        let map = {
            let _guard = span.enter();
            generator.generate(width, height)?
        };
        observer.on_map_generated(&map);
        Ok(Self {
            map,
            scheduler: TurnScheduler::new(),
            observer,
            span,
            next_unit: 0,
        })
    }

    pub fn map(&self) -> &MapState {
        &self.map
    }

    pub fn grid(&self) -> &TileGrid {
        self.map.grid()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Create a unit and stand it on `pos`. Fails without side effects if the tile is taken.
    pub fn add_unit(&mut self, pos: TilePos, name: &str, speed: u32) -> Result<UnitId, GridError> {
        let _guard = self.span.enter();
        let id = UnitId(self.next_unit);
        let unit = Unit::new(id, name, speed);
        if let Err(err) = self.map.grid_mut().place_unit(pos, unit.clone()) {
            tracing::warn!(target: "tactica::controller", %err, name, "controller.place_rejected");
            return Err(err);
        }
        self.next_unit += 1;
        self.observer.on_unit_added(pos, &unit);
        Ok(id)
    }

    /// Queue every unit on the board for a fresh round. Returns the number queued.
    pub fn start_round(&mut self) -> usize {
        self.scheduler.clear();
        for (_, unit) in self.map.grid().units() {
            self.scheduler.add_unit(unit.clone());
        }
        let _guard = self.span.enter();
        tracing::debug!(target: "tactica::controller", units = self.scheduler.len(), "controller.round_started");
        self.scheduler.len()
    }

    pub fn next_turn(&mut self) -> Option<Unit> {
        self.scheduler.next_turn()
    }
}
