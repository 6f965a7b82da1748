use tilejump_core::geom::Rect;

use super::{Enemy, EnemyContext, EnemySprites, EnemyStats, walk};
use crate::actor::Timings;

/// Distance from either level edge at which a snail turns back.
const EDGE_MARGIN: f32 = 50.0;

pub(super) const STATS: EnemyStats = EnemyStats {
    width: 54.0,
    height: 32.0,
    max_health: 30,
    speed: 40.0,
    gravity: Some(1500.0),
    timings: Timings {
        hurt: 0.5,
        invincibility: 1.0,
        death: 1.0,
    },
    sprites: EnemySprites {
        idle: "enemies/snail",
        moving: "enemies/snail_move",
        hurt: "enemies/snail_shell",
        dead: "enemies/snail_shell",
    },
    hitbox: Rect::new(12.0, 7.0, 30.0, 25.0),
    faces_left: false,
};

/// Walks like a slime but also keeps clear of the level edges.
pub(super) fn steer(enemy: &mut Enemy, dt: f32, ctx: &EnemyContext<'_>) {
    walk(enemy, dt, ctx);
    let rect = enemy.actor.body.rect;
    if rect.right() > ctx.level_width - EDGE_MARGIN {
        enemy.direction = -1.0;
    } else if rect.left() < EDGE_MARGIN {
        enemy.direction = 1.0;
    }
}
