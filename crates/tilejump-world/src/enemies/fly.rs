use tilejump_core::geom::Rect;

use super::{Enemy, EnemySprites, EnemyStats};
use crate::actor::Timings;

/// Patrol length to the right of the spawn point.
const PATROL_RANGE: f32 = 600.0;

pub(super) const STATS: EnemyStats = EnemyStats {
    width: 60.0,
    height: 36.0,
    max_health: 20,
    speed: 80.0,
    gravity: None,
    timings: Timings {
        hurt: 0.3,
        invincibility: 0.5,
        death: 0.5,
    },
    sprites: EnemySprites {
        idle: "enemies/fly",
        moving: "enemies/fly_move",
        hurt: "enemies/fly",
        dead: "enemies/fly_dead",
    },
    hitbox: Rect::new(15.0, 6.0, 30.0, 25.0),
    faces_left: true,
};

/// Flies back and forth along its patrol, ignoring terrain.
pub(super) fn steer(enemy: &mut Enemy, dt: f32) {
    let body = &mut enemy.actor.body;
    body.velocity.x = STATS.speed * enemy.direction;
    let dx = body.velocity.x * dt;
    body.translate(dx, 0.0);

    let x = body.rect.x;
    if x > enemy.start_x + PATROL_RANGE {
        enemy.direction = -1.0;
    } else if x < enemy.start_x {
        enemy.direction = 1.0;
    }
}
