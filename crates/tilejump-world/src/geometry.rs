use serde::{Deserialize, Serialize};
use tilejump_core::geom::Rect;

use crate::slope::{SlopeProfile, surface_y};

/// Tile category, decided once when the level loads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Flat,
    /// Ledge whose collision covers only the upper half of the tile.
    SemiSolid,
    /// Rises from the bottom-left to the top-right corner.
    Slope,
    /// Spikes. Deals damage, no physical collision.
    Hazard,
    /// Solid until struck once from below.
    Box,
}

impl TileKind {
    /// Map a ground-tileset GID to its tile kind.
    pub fn from_gid(gid: u32) -> Option<TileKind> {
        match gid {
            1 | 2 | 9 | 17 | 73 | 89 | 97 => Some(TileKind::Flat),
            41 | 49 | 57 => Some(TileKind::SemiSolid),
            25 => Some(TileKind::Slope),
            341 => Some(TileKind::Box),
            _ => None,
        }
    }

    pub fn is_solid(self) -> bool {
        !matches!(self, TileKind::Hazard)
    }
}

/// The shape the resolver tests against instead of raw tile bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum CollisionShape {
    Rect(Rect),
    /// Analytic slope surface over these bounds.
    Slope(Rect),
}

impl CollisionShape {
    pub fn for_tile(bounds: Rect, kind: TileKind) -> Self {
        match kind {
            TileKind::Flat | TileKind::Box => CollisionShape::Rect(bounds),
            TileKind::SemiSolid => {
                CollisionShape::Rect(Rect::new(bounds.x, bounds.y, bounds.w, bounds.h / 2.0))
            },
            TileKind::Hazard => CollisionShape::Rect(Rect::new(
                bounds.x,
                bounds.y + bounds.h / 2.0,
                bounds.w,
                bounds.h / 2.0,
            )),
            TileKind::Slope => CollisionShape::Slope(bounds),
        }
    }

    /// Bounding rectangle of the shape.
    pub fn bounds(&self) -> Rect {
        match self {
            CollisionShape::Rect(r) | CollisionShape::Slope(r) => *r,
        }
    }
}

/// One static tile of level geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeometryTile {
    pub bounds: Rect,
    pub kind: TileKind,
    pub shape: CollisionShape,
    pub has_collision: bool,
    pub triggered: bool,
}

impl GeometryTile {
    pub fn new(bounds: Rect, kind: TileKind) -> Self {
        Self {
            bounds,
            kind,
            shape: CollisionShape::for_tile(bounds, kind),
            has_collision: kind.is_solid(),
            triggered: false,
        }
    }

    /// Hit-test an actor hitbox against this tile's effective shape.
    ///
    /// Slopes sample the left edge, middle and right edge of the horizontal
    /// overlap (widened by a pixel on each side) and report contact when the
    /// actor's feet are at or below the surface, within `tolerance`, at any
    /// of them. Sampling the whole overlap keeps fast actors from slipping
    /// between sample gaps.
    pub fn check_collision(&self, actor: &Rect, tolerance: f32) -> bool {
        if !self.has_collision {
            return false;
        }
        match &self.shape {
            CollisionShape::Rect(r) => r.intersects(actor),
            CollisionShape::Slope(b) => {
                if !b.intersects(actor) {
                    return false;
                }
                let sample_left = actor.left().max(b.left() - 1.0);
                let sample_right = actor.right().min(b.right() + 1.0);
                if sample_left >= sample_right {
                    return false;
                }
                let samples = [
                    sample_left,
                    (sample_left + sample_right) * 0.5,
                    sample_right,
                ];
                samples.iter().any(|&x| {
                    actor.bottom() >= surface_y(b, x) - tolerance
                        && actor.top() <= b.bottom() + tolerance
                })
            },
        }
    }

    /// Mark a box as struck and drop it from collision. Returns `true` only
    /// the first time, and never for other kinds.
    pub fn strike(&mut self) -> bool {
        if self.kind != TileKind::Box || self.triggered {
            return false;
        }
        self.triggered = true;
        self.has_collision = false;
        true
    }
}

/// All static geometry of a level plus the stitched slope surface.
#[derive(Debug, Clone, Default)]
pub struct Terrain {
    tiles: Vec<GeometryTile>,
    slopes: SlopeProfile,
}

impl Terrain {
    pub fn new(tiles: Vec<GeometryTile>) -> Self {
        let slopes = SlopeProfile::new(
            tiles
                .iter()
                .filter(|t| t.kind == TileKind::Slope && t.has_collision)
                .map(|t| t.bounds)
                .collect(),
        );
        Self { tiles, slopes }
    }

    pub fn tiles(&self) -> &[GeometryTile] {
        &self.tiles
    }

    pub fn slopes(&self) -> &SlopeProfile {
        &self.slopes
    }

    /// Tiles that currently collide, with their indices.
    pub fn collidable(&self) -> impl Iterator<Item = (usize, &GeometryTile)> {
        self.tiles.iter().enumerate().filter(|(_, t)| t.has_collision)
    }

    /// Strike the box at `index`. Returns the tile on the first strike only.
    pub fn strike_box(&mut self, index: usize) -> Option<&GeometryTile> {
        let tile = self.tiles.get_mut(index)?;
        if tile.strike() { Some(tile) } else { None }
    }

    /// Highest walkable height under `hitbox` that lies between its feet and
    /// `max_drop` pixels below them.
    pub fn ground_below(&self, hitbox: &Rect, max_drop: f32) -> Option<f32> {
        let feet = hitbox.bottom();
        let reach = feet + max_drop;
        let mut best: Option<f32> = None;
        for (_, tile) in self.collidable() {
            if let CollisionShape::Rect(r) = tile.shape
                && r.left() < hitbox.right()
                && r.right() > hitbox.left()
                && r.top() >= feet
                && r.top() <= reach
            {
                best = Some(best.map_or(r.top(), |b| b.min(r.top())));
            }
        }
        if let Some(y) = self.slopes.surface_at(hitbox.center_x(), feet)
            && y >= feet
            && y <= reach
        {
            best = Some(best.map_or(y, |b| b.min(y)));
        }
        best
    }

    /// Nearest solid surface at or below `from_y` under the horizontal span
    /// `[left, right]`. Used to land items dropped from boxes.
    pub fn surface_below(&self, left: f32, right: f32, from_y: f32) -> Option<f32> {
        let center = (left + right) / 2.0;
        let mut best: Option<f32> = None;
        for (_, tile) in self.collidable() {
            let y = match tile.shape {
                CollisionShape::Rect(r) if r.left() < right && r.right() > left => r.top(),
                CollisionShape::Slope(b) if b.left() <= center && center <= b.right() => {
                    surface_y(&b, center)
                },
                _ => continue,
            };
            if y >= from_y {
                best = Some(best.map_or(y, |b| b.min(y)));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 2.0;

    #[test]
    fn gid_mapping() {
        for gid in [1, 2, 9, 17, 73, 89, 97] {
            assert_eq!(TileKind::from_gid(gid), Some(TileKind::Flat), "gid {gid}");
        }
        for gid in [41, 49, 57] {
            assert_eq!(TileKind::from_gid(gid), Some(TileKind::SemiSolid));
        }
        assert_eq!(TileKind::from_gid(25), Some(TileKind::Slope));
        assert_eq!(TileKind::from_gid(341), Some(TileKind::Box));
        assert_eq!(TileKind::from_gid(0), None);
        assert_eq!(TileKind::from_gid(9999), None);
    }

    #[test]
    fn semi_solid_shape_is_top_half() {
        let t = GeometryTile::new(Rect::new(0.0, 100.0, 128.0, 128.0), TileKind::SemiSolid);
        assert_eq!(t.shape, CollisionShape::Rect(Rect::new(0.0, 100.0, 128.0, 64.0)));
        // Overlaps only the lower half of the tile.
        assert!(!t.check_collision(&Rect::new(10.0, 180.0, 20.0, 20.0), TOL));
        assert!(t.check_collision(&Rect::new(10.0, 150.0, 20.0, 20.0), TOL));
    }

    #[test]
    fn hazard_has_no_collision_and_bottom_half_shape() {
        let t = GeometryTile::new(Rect::new(0.0, 0.0, 128.0, 128.0), TileKind::Hazard);
        assert!(!t.has_collision);
        assert_eq!(t.shape.bounds(), Rect::new(0.0, 64.0, 128.0, 64.0));
        assert!(!t.check_collision(&Rect::new(0.0, 0.0, 128.0, 128.0), TOL));
    }

    #[test]
    fn disabled_tile_never_collides() {
        let mut t = GeometryTile::new(Rect::new(0.0, 0.0, 128.0, 128.0), TileKind::Flat);
        t.has_collision = false;
        assert!(!t.check_collision(&Rect::new(10.0, 10.0, 10.0, 10.0), TOL));
    }

    #[test]
    fn slope_ignores_actor_above_surface() {
        let t = GeometryTile::new(Rect::new(0.0, 0.0, 128.0, 128.0), TileKind::Slope);
        // Inside the AABB near the low-left corner, feet well above the surface.
        let actor = Rect::new(0.0, 0.0, 20.0, 40.0);
        assert!(!t.check_collision(&actor, TOL));
    }

    #[test]
    fn slope_detects_feet_on_surface() {
        let t = GeometryTile::new(Rect::new(0.0, 0.0, 128.0, 128.0), TileKind::Slope);
        // Surface at x=64 is y=64.
        let actor = Rect::new(54.0, 4.0, 20.0, 60.0);
        assert!(t.check_collision(&actor, TOL));
    }

    #[test]
    fn slope_tolerance_catches_hovering_feet() {
        let t = GeometryTile::new(Rect::new(0.0, 0.0, 128.0, 128.0), TileKind::Slope);
        // Right sample at x=128 gives surface 0; feet one pixel above the low samples.
        let actor = Rect::new(100.0, -50.0, 28.0, 49.0);
        assert!(t.check_collision(&Rect::new(0.0, 0.0, 10.0, 127.5), TOL));
        assert!(!t.check_collision(&actor, TOL), "No AABB overlap, no contact");
    }

    #[test]
    fn box_strikes_once() {
        let mut t = GeometryTile::new(Rect::new(0.0, 0.0, 128.0, 128.0), TileKind::Box);
        assert!(t.strike());
        assert!(!t.has_collision);
        assert!(!t.strike(), "Second strike must be a no-op");

        let mut flat = GeometryTile::new(Rect::new(0.0, 0.0, 128.0, 128.0), TileKind::Flat);
        assert!(!flat.strike());
        assert!(flat.has_collision);
    }

    #[test]
    fn terrain_strike_box_returns_tile_once() {
        let mut terrain = Terrain::new(vec![
            GeometryTile::new(Rect::new(0.0, 0.0, 128.0, 128.0), TileKind::Flat),
            GeometryTile::new(Rect::new(128.0, 0.0, 128.0, 128.0), TileKind::Box),
        ]);
        assert!(terrain.strike_box(0).is_none());
        assert_eq!(terrain.strike_box(1).map(|t| t.bounds.x), Some(128.0));
        assert!(terrain.strike_box(1).is_none());
        assert!(terrain.strike_box(99).is_none());
        assert_eq!(terrain.collidable().count(), 1);
    }

    #[test]
    fn ground_below_prefers_nearest_surface() {
        let terrain = Terrain::new(vec![
            GeometryTile::new(Rect::new(0.0, 410.0, 128.0, 128.0), TileKind::Flat),
            GeometryTile::new(Rect::new(0.0, 405.0, 128.0, 128.0), TileKind::Flat),
        ]);
        let hb = Rect::new(10.0, 310.0, 60.0, 90.0);
        assert_eq!(terrain.ground_below(&hb, 16.0), Some(405.0));
        assert_eq!(terrain.ground_below(&hb, 4.0), None);
    }

    #[test]
    fn ground_below_follows_slope() {
        let terrain = Terrain::new(vec![GeometryTile::new(
            Rect::new(0.0, 400.0, 128.0, 128.0),
            TileKind::Slope,
        )]);
        // Foot x = 64, surface 464.
        let hb = Rect::new(34.0, 370.0, 60.0, 90.0);
        assert_eq!(terrain.ground_below(&hb, 16.0), Some(464.0));
    }

    #[test]
    fn surface_below_finds_floor_under_box() {
        let terrain = Terrain::new(vec![
            GeometryTile::new(Rect::new(0.0, 512.0, 512.0, 128.0), TileKind::Flat),
            GeometryTile::new(Rect::new(600.0, 300.0, 128.0, 128.0), TileKind::Flat),
        ]);
        assert_eq!(terrain.surface_below(100.0, 164.0, 200.0), Some(512.0));
        assert_eq!(terrain.surface_below(1000.0, 1064.0, 200.0), None);
    }
}
