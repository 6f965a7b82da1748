//! Axis-separated collision resolution against level geometry.
//!
//! Callers move an actor horizontally with [`resolve_horizontal`], integrate
//! gravity, then move it vertically with [`resolve_vertical`]. Each pass
//! leaves the hitbox free of overlap with solid shapes (apart from contacts
//! shallower than the configured thresholds) and rewrites the contact flags
//! it owns, so nothing carries over from an earlier tick.

use tilejump_core::geom::Rect;

use crate::actor::Body;
use crate::config::ResolverConfig;
use crate::geometry::{CollisionShape, Terrain, TileKind};
use crate::slope::surface_y;

/// Move `body` by `dx` and push it out of anything it walked into.
///
/// Resets `blocked_left`, `blocked_right` and `on_slope`. A grounded body
/// climbs ledges up to the step height (the hitbox width while on a slope)
/// and follows the ground down by up to `ground_snap` pixels.
pub fn resolve_horizontal(body: &mut Body, dx: f32, terrain: &Terrain, cfg: &ResolverConfig) {
    let grounded = body.contacts.on_ground;
    let was_on_slope = body.contacts.on_slope;
    body.contacts.blocked_left = false;
    body.contacts.blocked_right = false;
    body.contacts.on_slope = false;

    let dx = if dx.is_finite() { dx } else { 0.0 };
    body.translate(dx, 0.0);

    let direction = if dx != 0.0 {
        dx.signum()
    } else if body.velocity.x != 0.0 {
        body.velocity.x.signum()
    } else {
        0.0
    };

    for (_, tile) in terrain.collidable() {
        let hitbox = body.hitbox();
        if !tile.check_collision(&hitbox, cfg.slope_tolerance) {
            continue;
        }
        match tile.shape {
            CollisionShape::Slope(bounds) => {
                let foot_x = hitbox.center_x();
                if bounds.left() <= foot_x && foot_x <= bounds.right() {
                    body.contacts.on_slope = true;
                    if grounded {
                        let surface = slope_surface(terrain, &bounds, foot_x, hitbox.bottom());
                        let rise = hitbox.bottom() - surface;
                        if rise > 0.0 && rise <= cfg.max_slope_penetration {
                            body.set_hitbox_bottom(surface);
                        }
                    }
                    continue;
                }
                // Feet past the span: the slope is a ledge topped at the clamped surface.
                let top = surface_y(&bounds, foot_x);
                let face = Rect::new(bounds.x, top, bounds.w, bounds.bottom() - top);
                let step_limit = step_limit(body, was_on_slope, cfg);
                push_out_side(body, &face, grounded, step_limit, direction, cfg);
            },
            CollisionShape::Rect(solid) => {
                let step_limit = step_limit(body, was_on_slope, cfg);
                push_out_side(body, &solid, grounded, step_limit, direction, cfg);
            },
        }
    }

    let blocked = body.contacts.blocked_left || body.contacts.blocked_right;
    if grounded && dx != 0.0 && !blocked {
        follow_ground(body, terrain, cfg);
    }
}

/// Move `body` by `dy` and land it on, or stop it under, whatever it hit.
///
/// Resets `on_ground`. Returns the index of an untriggered box tile struck
/// from below, if any; striking it is left to the caller.
pub fn resolve_vertical(
    body: &mut Body,
    dy: f32,
    terrain: &Terrain,
    cfg: &ResolverConfig,
) -> Option<usize> {
    body.contacts.on_ground = false;
    let dy = if dy.is_finite() { dy } else { 0.0 };
    body.translate(0.0, dy);

    let mut struck = None;
    for (index, tile) in terrain.collidable() {
        let hitbox = body.hitbox();
        if !tile.check_collision(&hitbox, cfg.slope_tolerance) {
            continue;
        }
        match tile.shape {
            CollisionShape::Rect(solid) => {
                if body.velocity.y > 0.0 {
                    body.set_hitbox_bottom(solid.top());
                    body.velocity.y = 0.0;
                    body.contacts.on_ground = true;
                } else if body.velocity.y < 0.0 {
                    body.set_hitbox_top(solid.bottom());
                    body.velocity.y = 0.0;
                    if tile.kind == TileKind::Box && !tile.triggered && struck.is_none() {
                        struck = Some(index);
                    }
                }
            },
            CollisionShape::Slope(bounds) => {
                if body.velocity.y < 0.0 {
                    continue;
                }
                let foot_x = hitbox.center_x();
                if foot_x < bounds.left() || foot_x > bounds.right() {
                    continue;
                }
                let surface = slope_surface(terrain, &bounds, foot_x, hitbox.bottom());
                let penetration = hitbox.bottom() - surface;
                if penetration >= -cfg.slope_tolerance && penetration <= cfg.max_slope_penetration {
                    body.set_hitbox_bottom(surface);
                    body.velocity.y = 0.0;
                    body.contacts.on_ground = true;
                    body.contacts.on_slope = true;
                }
            },
        }
    }
    struck
}

fn slope_surface(terrain: &Terrain, bounds: &Rect, foot_x: f32, feet: f32) -> f32 {
    terrain
        .slopes()
        .surface_at(foot_x, feet)
        .unwrap_or_else(|| surface_y(bounds, foot_x))
}

fn step_limit(body: &Body, was_on_slope: bool, cfg: &ResolverConfig) -> f32 {
    if was_on_slope || body.contacts.on_slope {
        body.hitbox_offset.w
    } else {
        cfg.step_height
    }
}

fn push_out_side(
    body: &mut Body,
    solid: &Rect,
    grounded: bool,
    step_limit: f32,
    direction: f32,
    cfg: &ResolverConfig,
) {
    let hitbox = body.hitbox();
    let rise = hitbox.bottom() - solid.top();
    if rise <= 0.0 {
        return;
    }
    if grounded && rise <= step_limit {
        body.set_hitbox_bottom(solid.top());
        return;
    }
    if hitbox.vertical_overlap(solid) <= cfg.min_side_overlap {
        return;
    }
    if direction > 0.0 {
        body.set_hitbox_right(solid.left());
        body.contacts.blocked_right = true;
        body.velocity.x = 0.0;
    } else if direction < 0.0 {
        body.set_hitbox_left(solid.right());
        body.contacts.blocked_left = true;
        body.velocity.x = 0.0;
    }
}

fn follow_ground(body: &mut Body, terrain: &Terrain, cfg: &ResolverConfig) {
    let hitbox = body.hitbox();
    if let Some(ground) = terrain.ground_below(&hitbox, cfg.ground_snap) {
        body.set_hitbox_bottom(ground);
        if terrain.slopes().surface_at(hitbox.center_x(), ground) == Some(ground) {
            body.contacts.on_slope = true;
        }
    }
}
