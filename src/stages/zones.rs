use anyhow::Result;
use tracing::Span;

use crate::{
    config::ZoneConfig,
    engine::{Stage, StageContext},
    grid::{Terrain, TilePos},
    map::{MapState, SpawnZone},
    rng::StageRng,
};

/// Forces the four corner spawn blocks back to grass.
pub struct ZoneAllocator {
    config: ZoneConfig,
    span: Span,
}

impl ZoneAllocator {
    pub fn new(config: ZoneConfig, span: Span) -> Self {
        Self { config, span }
    }
}

impl Default for ZoneAllocator {
    fn default() -> Self {
        Self::new(ZoneConfig::default(), Span::none())
    }
}

/// Top-left, top-right, bottom-left, bottom-right. Anchors may fall off small grids.
pub fn corner_zones(width: i32, height: i32, config: &ZoneConfig) -> [SpawnZone; 4] {
    let ZoneConfig { margin, zone_size } = *config;
    let far_x = width.saturating_sub(margin).saturating_sub(zone_size);
    let far_y = height.saturating_sub(margin).saturating_sub(zone_size);
    [
        TilePos::new(margin, margin),
        TilePos::new(far_x, margin),
        TilePos::new(margin, far_y),
        TilePos::new(far_x, far_y),
    ]
    .map(|anchor| SpawnZone {
        anchor,
        size: zone_size,
    })
}

impl Stage for ZoneAllocator {
    fn name(&self) -> &str {
        "zones"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        map: &mut MapState,
        _rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let _guard = self.span.enter();
        let (width, height) = map.grid.dimensions();
        let zones = corner_zones(width, height, &self.config);
        for (index, zone) in zones.iter().enumerate() {
            let tiles: Vec<TilePos> = zone.tiles(&map.grid).collect();
            for pos in &tiles {
                map.grid.set_terrain(*pos, Terrain::Grass)?;
            }
            tracing::info!(
                target: "tactica::zones",
                map = ctx.map_name,
                zone = index + 1,
                x = zone.anchor.x,
                y = zone.anchor.y,
                reserved = tiles.len(),
                "zones.reserved"
            );
        }
        map.zones = zones.to_vec();
        Ok(())
    }
}
