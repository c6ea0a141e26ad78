mod roads;
mod terrain;
mod zones;

pub use roads::{key_points, prune_spurs, shortest_path, RoadPath, RoadPlanner};
pub use terrain::{flood_fill, paint_layer, TerrainGenerator};
pub use zones::{corner_zones, ZoneAllocator};
