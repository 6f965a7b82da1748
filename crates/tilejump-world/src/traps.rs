//! Static hazards: spikes and saws.

use serde::{Deserialize, Serialize};
use tilejump_core::draw::{Camera, Drawable, Surface};
use tilejump_core::geom::Rect;

use crate::geometry::{CollisionShape, GeometryTile, TileKind};

pub const TRAP_DAMAGE: i32 = 10;

/// Seconds per saw animation frame.
const SAW_FRAME_SECS: f32 = 0.1;
/// The saw's damage box sits this far below the image centre.
const SAW_HIT_DROP: f32 = 40.0;
const SAW_FRAMES: [&str; 2] = ["enemies/sawHalf", "enemies/sawHalf_move"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Spikes {
    pub rect: Rect,
    hit: Rect,
}

impl Spikes {
    /// Spikes filling `rect`; only the bottom half hurts.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            hit: CollisionShape::for_tile(rect, TileKind::Hazard).bounds(),
        }
    }

    pub fn from_tile(tile: &GeometryTile) -> Self {
        Self {
            rect: tile.bounds,
            hit: tile.shape.bounds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Saw {
    /// Where the sprite is drawn.
    pub image: Rect,
    hit: Rect,
    frame: usize,
    timer: f32,
}

impl Saw {
    /// Saw drawn over `image`. The damage box is half the image in each
    /// dimension, centred horizontally and pushed down towards the blade.
    pub fn new(image: Rect) -> Self {
        let w = image.w / 2.0;
        let h = image.h / 2.0;
        let hit = Rect::new(
            image.x + (image.w - w) / 2.0,
            image.y + (image.h - h) / 2.0 + SAW_HIT_DROP,
            w,
            h,
        );
        Self {
            image,
            hit,
            frame: 0,
            timer: 0.0,
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Trap {
    Spikes(Spikes),
    Saw(Saw),
}

impl Trap {
    pub fn damage(&self) -> i32 {
        TRAP_DAMAGE
    }

    /// Area that hurts the player.
    pub fn hit_rect(&self) -> Rect {
        match self {
            Trap::Spikes(s) => s.hit,
            Trap::Saw(s) => s.hit,
        }
    }

    /// Full visual extent, used for broad-phase culling.
    pub fn bounds(&self) -> Rect {
        match self {
            Trap::Spikes(s) => s.rect,
            Trap::Saw(s) => s.image,
        }
    }

    pub fn touches(&self, hitbox: &Rect) -> bool {
        self.hit_rect().intersects(hitbox)
    }

    pub fn update(&mut self, dt: f32) {
        if let Trap::Saw(saw) = self {
            saw.timer += dt;
            if saw.timer >= SAW_FRAME_SECS {
                saw.timer = 0.0;
                saw.frame = (saw.frame + 1) % SAW_FRAMES.len();
            }
        }
    }
}

impl Drawable for Trap {
    fn draw(&self, surface: &mut dyn Surface, camera: &Camera) {
        match self {
            Trap::Spikes(s) => surface.blit("tiles/spikes", camera.apply(&s.rect), false),
            Trap::Saw(s) => surface.blit(SAW_FRAMES[s.frame], camera.apply(&s.image), false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilejump_core::test_helpers::RecordingSurface;

    #[test]
    fn spikes_hurt_only_in_bottom_half() {
        let trap = Trap::Spikes(Spikes::new(Rect::new(0.0, 0.0, 128.0, 128.0)));
        assert_eq!(trap.hit_rect(), Rect::new(0.0, 64.0, 128.0, 64.0));
        assert!(!trap.touches(&Rect::new(10.0, 0.0, 60.0, 50.0)));
        assert!(trap.touches(&Rect::new(10.0, 20.0, 60.0, 50.0)));
    }

    #[test]
    fn spikes_from_hazard_tile_share_its_shape() {
        let tile = GeometryTile::new(Rect::new(256.0, 512.0, 128.0, 128.0), TileKind::Hazard);
        let spikes = Spikes::from_tile(&tile);
        assert_eq!(spikes.hit, tile.shape.bounds());
        assert_eq!(spikes, Spikes::new(tile.bounds));
    }

    #[test]
    fn saw_hitbox_is_centered_and_lowered() {
        let trap = Trap::Saw(Saw::new(Rect::new(100.0, 100.0, 128.0, 128.0)));
        assert_eq!(trap.hit_rect(), Rect::new(132.0, 172.0, 64.0, 64.0));
        assert_eq!(trap.bounds(), Rect::new(100.0, 100.0, 128.0, 128.0));
        assert_eq!(trap.damage(), 10);
    }

    #[test]
    fn saw_alternates_frames() {
        let mut trap = Trap::Saw(Saw::new(Rect::new(0.0, 0.0, 128.0, 128.0)));
        trap.update(0.05);
        let Trap::Saw(saw) = &trap else { unreachable!() };
        assert_eq!(saw.frame(), 0);
        trap.update(0.06);
        let mut surface = RecordingSurface::new();
        trap.draw(&mut surface, &Camera::default());
        assert_eq!(surface.sprites(), vec!["enemies/sawHalf_move"]);
        trap.update(0.1);
        let Trap::Saw(saw) = &trap else { unreachable!() };
        assert_eq!(saw.frame(), 0);
    }
}
