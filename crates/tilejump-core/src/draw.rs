//! Output boundary for rendering. Entities describe themselves to a
//! [`Surface`] in screen space; the host decides how sprites are rasterized.

use serde::{Deserialize, Serialize};

use crate::geom::{Rect, Vec2};

/// Default viewport width in pixels.
pub const SCREEN_WIDTH: f32 = 1400.0;
/// Default viewport height in pixels.
pub const SCREEN_HEIGHT: f32 = 800.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const YELLOW: Self = Self::new(255, 255, 0);
}

/// Viewport over the level. `offset` is the world position of the
/// top-left screen pixel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub screen_w: f32,
    pub screen_h: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl Camera {
    pub fn new(screen_w: f32, screen_h: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            screen_w,
            screen_h,
        }
    }

    /// Center on `target`, keeping the view inside a level of the given size.
    /// Levels smaller than the screen pin the view to the origin.
    pub fn follow(&mut self, target: &Rect, level_w: f32, level_h: f32) {
        let x = target.center_x() - self.screen_w / 2.0;
        let y = target.center_y() - self.screen_h / 2.0;
        self.offset.x = x.min(level_w - self.screen_w).max(0.0);
        self.offset.y = y.min(level_h - self.screen_h).max(0.0);
    }

    /// World rectangle to screen rectangle.
    pub fn apply(&self, rect: &Rect) -> Rect {
        rect.translated(-self.offset.x, -self.offset.y)
    }

    /// Visible world region.
    pub fn view(&self) -> Rect {
        Rect::new(self.offset.x, self.offset.y, self.screen_w, self.screen_h)
    }
}

/// Host render target.
pub trait Surface {
    /// Draw the named sprite into `dest` (screen space), optionally mirrored.
    fn blit(&mut self, sprite: &str, dest: Rect, flip_x: bool);
    /// Draw a debug outline (screen space).
    fn outline(&mut self, rect: Rect, color: Color);
}

pub trait Drawable {
    fn draw(&self, surface: &mut dyn Surface, camera: &Camera);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_centers_target() {
        let mut cam = Camera::new(1400.0, 800.0);
        let target = Rect::new(2000.0, 1200.0, 80.0, 100.0);
        cam.follow(&target, 3840.0, 2560.0);
        assert_eq!(cam.offset.x, 2040.0 - 700.0);
        assert_eq!(cam.offset.y, 1250.0 - 400.0);
    }

    #[test]
    fn follow_clamps_to_level_edges() {
        let mut cam = Camera::new(1400.0, 800.0);
        cam.follow(&Rect::new(0.0, 0.0, 10.0, 10.0), 3840.0, 2560.0);
        assert_eq!(cam.offset, Vec2::ZERO);

        cam.follow(&Rect::new(3830.0, 2550.0, 10.0, 10.0), 3840.0, 2560.0);
        assert_eq!(cam.offset, Vec2::new(3840.0 - 1400.0, 2560.0 - 800.0));
    }

    #[test]
    fn small_level_pins_origin() {
        let mut cam = Camera::new(1400.0, 800.0);
        cam.follow(&Rect::new(500.0, 300.0, 10.0, 10.0), 800.0, 600.0);
        assert_eq!(cam.offset, Vec2::ZERO);
    }

    #[test]
    fn apply_subtracts_offset() {
        let mut cam = Camera::default();
        cam.offset = Vec2::new(100.0, 50.0);
        let r = cam.apply(&Rect::new(150.0, 60.0, 5.0, 5.0));
        assert_eq!(r, Rect::new(50.0, 10.0, 5.0, 5.0));
    }
}
