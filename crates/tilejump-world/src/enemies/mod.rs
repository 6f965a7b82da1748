//! Enemy roster.
//!
//! Every enemy shares one [`Enemy`] struct built on the common [`Actor`]
//! state machine. The per-kind modules only supply stats and a steering
//! function; walkers go through the same collision resolver as the player.

mod fly;
mod slime;
mod snail;

use serde::{Deserialize, Serialize};
use tilejump_core::draw::{Camera, Drawable, Surface};
use tilejump_core::geom::{Rect, Vec2};

use crate::actor::{Actor, Body, Timings, Transition, Vitals};
use crate::config::{MAX_FALL_SPEED, ResolverConfig};
use crate::geometry::Terrain;
use crate::resolver::{resolve_horizontal, resolve_vertical};

/// Seconds between the two frames of the move animation.
const MOVE_FRAME_SECS: f32 = 0.11;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Slime,
    Snail,
    Fly,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Slime, EnemyKind::Snail, EnemyKind::Fly];

    pub fn stats(self) -> &'static EnemyStats {
        match self {
            EnemyKind::Slime => &slime::STATS,
            EnemyKind::Snail => &snail::STATS,
            EnemyKind::Fly => &fly::STATS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySprites {
    pub idle: &'static str,
    pub moving: &'static str,
    pub hurt: &'static str,
    pub dead: &'static str,
}

/// Fixed per-kind tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub width: f32,
    pub height: f32,
    pub max_health: i32,
    /// Patrol speed (px/s).
    pub speed: f32,
    /// `None` for flyers.
    pub gravity: Option<f32>,
    pub timings: Timings,
    pub sprites: EnemySprites,
    /// Damage and stomp area, relative to the sprite's top-left corner.
    /// Terrain collision uses the whole sprite.
    pub hitbox: Rect,
    /// Art is drawn facing left and is mirrored when moving right.
    pub faces_left: bool,
}

/// What an enemy may look at while steering.
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext<'a> {
    pub terrain: &'a Terrain,
    pub resolver: &'a ResolverConfig,
    pub level_width: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Position in the level's enemy manifest this enemy was created from.
    pub spawn_index: usize,
    pub actor: Actor,
    /// +1.0 walking right, -1.0 walking left.
    pub direction: f32,
    /// Left end of a flyer's patrol.
    pub start_x: f32,
    anim_timer: f32,
    alt_frame: bool,
}

impl Enemy {
    /// Create an enemy with its sprite's top-left corner at `pos`.
    pub fn spawn(kind: EnemyKind, spawn_index: usize, pos: Vec2) -> Self {
        let stats = kind.stats();
        let body = Body::solid(Rect::new(pos.x, pos.y, stats.width, stats.height));
        Self {
            kind,
            spawn_index,
            actor: Actor::new(body, Vitals::new(stats.max_health, stats.timings)),
            direction: 1.0,
            start_x: pos.x,
            anim_timer: 0.0,
            alt_frame: false,
        }
    }

    pub fn stats(&self) -> &'static EnemyStats {
        self.kind.stats()
    }

    pub fn bounds(&self) -> Rect {
        self.actor.body.rect
    }

    /// Area that stomps and contact damage are tested against.
    pub fn hitbox(&self) -> Rect {
        let inset = self.stats().hitbox;
        let rect = self.actor.body.rect;
        Rect::new(rect.x + inset.x, rect.y + inset.y, inset.w, inset.h)
    }

    pub fn is_dead(&self) -> bool {
        self.actor.is_dead()
    }

    pub fn is_hurt(&self) -> bool {
        self.actor.vitals.is_hurt()
    }

    pub fn is_removed(&self) -> bool {
        self.actor.vitals.is_removed()
    }

    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.actor.vitals.take_damage(amount)
    }

    /// Advance timers and, while alive, steer and move.
    pub fn update(&mut self, dt: f32, ctx: &EnemyContext<'_>) -> Transition {
        let transition = self.actor.tick_vitals(dt);
        if self.actor.is_dead() {
            return transition;
        }
        match self.kind {
            EnemyKind::Slime => slime::steer(self, dt, ctx),
            EnemyKind::Snail => snail::steer(self, dt, ctx),
            EnemyKind::Fly => fly::steer(self, dt),
        }
        let vx = self.actor.body.velocity.x;
        if vx > 0.0 {
            self.actor.facing_right = true;
        } else if vx < 0.0 {
            self.actor.facing_right = false;
        }
        self.anim_timer += dt;
        if self.anim_timer >= MOVE_FRAME_SECS {
            self.anim_timer = 0.0;
            self.alt_frame = !self.alt_frame;
        }
        transition
    }

    pub fn sprite(&self) -> &'static str {
        let sprites = &self.stats().sprites;
        if self.is_dead() {
            sprites.dead
        } else if self.is_hurt() {
            sprites.hurt
        } else if self.actor.body.velocity.x != 0.0 && self.alt_frame {
            sprites.moving
        } else {
            sprites.idle
        }
    }
}

/// Gravity plus a patrol that turns around at walls.
fn walk(enemy: &mut Enemy, dt: f32, ctx: &EnemyContext<'_>) {
    let stats = enemy.stats();
    let body = &mut enemy.actor.body;
    body.velocity.x = stats.speed * enemy.direction;
    let dx = body.velocity.x * dt;
    resolve_horizontal(body, dx, ctx.terrain, ctx.resolver);
    if (enemy.direction > 0.0 && body.contacts.blocked_right)
        || (enemy.direction < 0.0 && body.contacts.blocked_left)
    {
        enemy.direction = -enemy.direction;
    }

    if let Some(gravity) = stats.gravity {
        body.velocity.y = (body.velocity.y + gravity * dt).min(MAX_FALL_SPEED);
    }
    let dy = body.velocity.y * dt;
    resolve_vertical(body, dy, ctx.terrain, ctx.resolver);
}

impl Drawable for Enemy {
    fn draw(&self, surface: &mut dyn Surface, camera: &Camera) {
        if self.is_removed() {
            return;
        }
        surface.blit(
            self.sprite(),
            camera.apply(&self.actor.body.rect),
            self.actor.facing_right == self.stats().faces_left,
        );
    }
}
