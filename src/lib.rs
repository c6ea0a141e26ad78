pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod grid;
pub mod logging;
pub mod map;
pub mod noise_field;
pub mod rng;
pub mod scenario;
pub mod stages;
pub mod turns;

pub use controller::{GridController, LoggingObserver, MapObserver, NoopObserver};
pub use engine::{GeneratorSettings, MapGenerator, MapGeneratorBuilder};
pub use error::GridError;
pub use grid::{Terrain, Tile, TileGrid, TilePos, Unit, UnitId};
pub use map::MapState;
pub use scenario::Scenario;
pub use turns::TurnScheduler;
