use tilejump_core::geom::Rect;

use super::{Enemy, EnemyContext, EnemySprites, EnemyStats, walk};
use crate::actor::Timings;

pub(super) const STATS: EnemyStats = EnemyStats {
    width: 52.0,
    height: 30.0,
    max_health: 30,
    speed: 40.0,
    gravity: Some(1500.0),
    timings: Timings {
        hurt: 0.5,
        invincibility: 1.0,
        death: 1.0,
    },
    sprites: EnemySprites {
        idle: "enemies/slimePurple",
        moving: "enemies/slimePurple_move",
        hurt: "enemies/slimePurple_hit",
        dead: "enemies/slimePurple_dead",
    },
    hitbox: Rect::new(15.0, 8.0, 22.0, 22.0),
    faces_left: false,
};

/// Walks until it meets a wall, then turns around.
pub(super) fn steer(enemy: &mut Enemy, dt: f32, ctx: &EnemyContext<'_>) {
    walk(enemy, dt, ctx);
}
