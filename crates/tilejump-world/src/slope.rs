//! Slope surface queries.
//!
//! Slopes rise from the bottom-left corner of their bounds to the top-right
//! corner. [`surface_y`] is the only place that formula lives; everything
//! else (tile hit-tests, resolver snapping, ground following) goes through it
//! or through [`SlopeProfile`], which stitches adjacent slope tiles into one
//! continuous world-space surface.

use tilejump_core::geom::Rect;

/// Height of the slope surface inside `bounds` at `world_x`, clamped to the
/// tile's horizontal span.
pub fn surface_y(bounds: &Rect, world_x: f32) -> f32 {
    if bounds.w <= 0.0 {
        return bounds.top();
    }
    let relative_x = (world_x - bounds.left()) / bounds.w;
    let relative_x = if relative_x.is_nan() {
        0.0
    } else {
        relative_x.clamp(0.0, 1.0)
    };
    bounds.bottom() - relative_x * bounds.h
}

/// All slope spans of a level, sorted by left edge.
#[derive(Debug, Clone, Default)]
pub struct SlopeProfile {
    spans: Vec<Rect>,
}

impl SlopeProfile {
    pub fn new(mut spans: Vec<Rect>) -> Self {
        spans.retain(|r| r.w > 0.0 && r.h > 0.0);
        spans.sort_by(|a, b| a.left().total_cmp(&b.left()));
        Self { spans }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[Rect] {
        &self.spans
    }

    /// Surface height at `world_x`, choosing among stacked slopes the surface
    /// closest to `near_y`. `None` when no slope spans `world_x`.
    ///
    /// Where two slope tiles share an edge both evaluate to the same height,
    /// so walking across the seam sees a continuous surface.
    pub fn surface_at(&self, world_x: f32, near_y: f32) -> Option<f32> {
        let end = self.spans.partition_point(|r| r.left() <= world_x);
        self.spans[..end]
            .iter()
            .filter(|r| world_x <= r.right())
            .map(|r| surface_y(r, world_x))
            .min_by(|a, b| (a - near_y).abs().total_cmp(&(b - near_y).abs()))
    }
}
