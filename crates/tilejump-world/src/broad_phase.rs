use tilejump_core::geom::{Rect, Vec2};

use crate::config::BroadPhaseConfig;

/// Region around the player inside which enemies and traps are simulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveRegion {
    pub bounds: Rect,
}

impl ActiveRegion {
    /// Region centred on `center`, extended by the configured margin on
    /// every side.
    pub fn around(center: Vec2, cfg: &BroadPhaseConfig) -> Self {
        let half_w = cfg.half_width + cfg.margin;
        let half_h = cfg.half_height + cfg.margin;
        Self {
            bounds: Rect::centered_on(center, half_w * 2.0, half_h * 2.0),
        }
    }

    pub fn contains(&self, rect: &Rect) -> bool {
        self.bounds.intersects(rect)
    }
}
