use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tilejump_core::audio::{AudioSink, SoundKey, play_best_effort};
use tilejump_core::draw::{Camera, Color, Drawable, Surface};
use tilejump_core::geom::{Rect, Vec2};
use tilejump_core::timer::Countdown;
use tracing::debug;

use crate::actor::{Actor, Body, Timings, Transition, Vitals};
use crate::config::{ItemConfig, PlayerConfig, ResolverConfig, WorldConfig};
use crate::geometry::{GeometryTile, Terrain};
use crate::items::{ItemKind, KeyColor};
use crate::resolver::{resolve_horizontal, resolve_vertical};

/// Seconds per frame of the run cycle.
const RUN_FRAME_SECS: f32 = 1.0 / 12.0;

const IDLE_SPRITE: &str = "player/alienPink_front";
const JUMP_SPRITE: &str = "player/alienPink_jump";
const RUN_SPRITES: [&str; 3] = [
    "player/alienPink_stand",
    "player/alienPink_walk1",
    "player/alienPink_walk2",
];

/// Input sampled by the host for one tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerInput {
    /// -1.0 (left) to 1.0 (right).
    pub move_dir: f32,
    /// Jump pressed this tick (edge, not level).
    pub jump: bool,
}

impl PlayerInput {
    pub fn direction(&self) -> f32 {
        if self.move_dir.is_nan() {
            0.0
        } else {
            self.move_dir.clamp(-1.0, 1.0)
        }
    }
}

/// Currency and keys picked up so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    pub coins: u32,
    pub jewels: u32,
    keys: Vec<KeyColor>,
}

impl Wallet {
    pub fn credit(&mut self, kind: ItemKind, cfg: &ItemConfig) {
        match kind {
            ItemKind::Coin => self.coins = self.coins.saturating_add(cfg.coin_value),
            ItemKind::Jewel => {
                self.jewels = self.jewels.saturating_add(1);
                self.coins = self.coins.saturating_add(cfg.jewel_value);
            },
            ItemKind::Key(color) => {
                if !self.keys.contains(&color) {
                    self.keys.push(color);
                }
            },
        }
    }

    pub fn has_key(&self, color: KeyColor) -> bool {
        self.keys.contains(&color)
    }

    pub fn keys(&self) -> &[KeyColor] {
        &self.keys
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Pose {
    Idle,
    Run,
    Jump,
}

/// The player-controlled actor.
///
/// Owned by the host session and lent to the level each tick. Movement runs
/// in two steps per tick: [`Player::apply_input`] moves horizontally from
/// input, then [`Player::update`] advances timers, integrates gravity and
/// resolves the vertical axis.
pub struct Player {
    pub actor: Actor,
    pub wallet: Wallet,
    /// Draw the hitbox outline on top of the sprite.
    pub show_hitbox: bool,
    /// Called with the box tile the first time it is struck from below.
    pub on_box_hit: Option<Box<dyn FnMut(&GeometryTile)>>,
    /// Called after every respawn.
    pub on_respawn: Option<Box<dyn FnMut()>>,
    config: PlayerConfig,
    resolver: ResolverConfig,
    audio: Rc<dyn AudioSink>,
    spawn: Vec2,
    is_jumping: bool,
    time_since_ground: f32,
    jump_buffer: Countdown,
    knockback: Countdown,
    respawn_delay: Countdown,
    moved: bool,
    pose: Pose,
    run_frame: usize,
    anim_timer: f32,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("actor", &self.actor)
            .field("wallet", &self.wallet)
            .field("spawn", &self.spawn)
            .field("pose", &self.pose)
            .finish_non_exhaustive()
    }
}

impl Player {
    pub fn new(spawn: Vec2, cfg: &WorldConfig, audio: Rc<dyn AudioSink>) -> Self {
        let pc = cfg.player.clone();
        let body = Body::new(
            Rect::new(spawn.x, spawn.y, pc.width, pc.height),
            Rect::new(pc.hitbox_x, pc.hitbox_y, pc.hitbox_w, pc.hitbox_h),
        );
        let vitals = Vitals::new(
            pc.max_health,
            Timings {
                hurt: pc.knockback_secs,
                invincibility: pc.invincibility_secs,
                death: pc.death_secs,
            },
        );
        Self {
            actor: Actor::new(body, vitals),
            wallet: Wallet::default(),
            show_hitbox: cfg.show_hitboxes,
            on_box_hit: None,
            on_respawn: None,
            config: pc,
            resolver: cfg.resolver.clone(),
            audio,
            spawn,
            is_jumping: false,
            time_since_ground: 0.0,
            jump_buffer: Countdown::idle(),
            knockback: Countdown::idle(),
            respawn_delay: Countdown::idle(),
            moved: false,
            pose: Pose::Idle,
            run_frame: 0,
            anim_timer: 0.0,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn hitbox(&self) -> Rect {
        self.actor.body.hitbox()
    }

    pub fn is_dead(&self) -> bool {
        self.actor.is_dead()
    }

    pub fn is_jumping(&self) -> bool {
        self.is_jumping
    }

    pub fn in_knockback(&self) -> bool {
        self.knockback.is_active()
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn set_spawn(&mut self, spawn: Vec2) {
        self.spawn = spawn;
    }

    /// Move the sprite's top-left corner to `pos`.
    pub fn place_at(&mut self, pos: Vec2) {
        self.actor.body.rect.x = pos.x;
        self.actor.body.rect.y = pos.y;
    }

    /// Apply this tick's input: buffer a jump press and walk, resolving the
    /// horizontal axis right away. Ignored while dead or knocked back.
    pub fn apply_input(&mut self, input: &PlayerInput, dt: f32, terrain: &Terrain) {
        self.moved = false;
        if self.actor.is_dead() || self.knockback.is_active() {
            return;
        }
        if input.jump {
            self.jump_buffer.start(self.config.jump_buffer_time);
        }

        let dt = sanitize_dt(dt);
        let dir = input.direction();
        // Walls are found by this pass itself; the push-out stops the body.
        if dir != 0.0 {
            self.actor.facing_right = dir > 0.0;
            let vx = dir * self.config.move_speed;
            self.actor.body.velocity.x = vx;
            self.moved = true;
            resolve_horizontal(&mut self.actor.body, vx * dt, terrain, &self.resolver);
        } else {
            self.actor.body.velocity.x = 0.0;
        }
    }

    /// Advance timers, integrate gravity and resolve collisions.
    pub fn update(&mut self, dt: f32, terrain: &mut Terrain) {
        let dt = sanitize_dt(dt);
        if self.actor.is_dead() {
            self.tick_death(dt);
            return;
        }

        if self.actor.body.rect.y > self.config.fall_death_y {
            self.actor.vitals.health.deplete();
            self.die();
            return;
        }

        if self.actor.tick_vitals(dt) == Transition::Died {
            self.after_death();
            return;
        }

        if self.knockback.tick(dt) {
            self.actor.body.velocity.x = 0.0;
        }

        let was_on_ground = self.actor.body.contacts.on_ground;

        if !self.moved || self.knockback.is_active() {
            let dx = if self.knockback.is_active() {
                self.actor.body.velocity.x * dt
            } else {
                0.0
            };
            resolve_horizontal(&mut self.actor.body, dx, terrain, &self.resolver);
        }

        let body = &mut self.actor.body;
        body.velocity.y = (body.velocity.y + self.config.gravity * dt).min(self.config.max_fall_speed);
        let dy = body.velocity.y * dt;
        let struck = resolve_vertical(body, dy, terrain, &self.resolver);

        if let Some(index) = struck
            && let Some(tile) = terrain.strike_box(index)
        {
            debug!("Box at ({}, {}) struck", tile.bounds.x, tile.bounds.y);
            if let Some(hook) = self.on_box_hit.as_mut() {
                hook(tile);
            }
        }

        let on_ground = self.actor.body.contacts.on_ground;
        if on_ground {
            self.is_jumping = false;
        }
        if on_ground || was_on_ground {
            self.time_since_ground = 0.0;
        } else {
            self.time_since_ground += dt;
        }

        if !self.knockback.is_active() && self.jump_buffer.is_active() && self.can_jump() {
            self.jump();
            self.jump_buffer.clear();
        }
        self.jump_buffer.tick(dt);

        self.animate(dt);
    }

    /// Grounded, or airborne for less than the coyote window, and not
    /// already mid-jump.
    pub fn can_jump(&self) -> bool {
        (self.actor.body.contacts.on_ground || self.time_since_ground < self.config.coyote_time)
            && !self.is_jumping
    }

    fn jump(&mut self) {
        let body = &mut self.actor.body;
        body.velocity.y = self.config.jump_velocity;
        body.contacts.on_ground = false;
        self.is_jumping = true;
        self.time_since_ground = self.config.coyote_time;
        play_best_effort(self.audio.as_ref(), SoundKey::PlayerJump);
    }

    /// Damage the player. With a `source` the player is knocked away from
    /// it; without one (traps) it is bumped upward. Returns whether the hit
    /// registered.
    pub fn take_hit(&mut self, amount: i32, source: Option<&Rect>) -> bool {
        if !self.actor.vitals.take_damage(amount) {
            return false;
        }
        let body = &mut self.actor.body;
        match source {
            Some(src) => {
                let away = if body.rect.center_x() < src.center_x() {
                    -1.0
                } else {
                    1.0
                };
                body.velocity.x = away * self.config.knockback_speed;
                body.velocity.y = -self.config.knockback_speed * self.config.knockback_lift;
                self.knockback.start(self.config.knockback_secs);
            },
            None => body.velocity.y = self.config.trap_bump_velocity,
        }
        play_best_effort(self.audio.as_ref(), SoundKey::PlayerTakeDamage);
        true
    }

    /// Upward kick after stomping an enemy.
    pub fn bounce(&mut self) {
        self.actor.body.velocity.y = self.config.bounce_velocity;
    }

    /// Die immediately, skipping any hurt window.
    pub fn die(&mut self) {
        if self.actor.die() {
            self.after_death();
        }
    }

    fn after_death(&mut self) {
        self.actor.body.stop();
        self.knockback.clear();
        self.jump_buffer.clear();
        self.is_jumping = false;
        debug!("Player died at ({}, {})", self.actor.body.rect.x, self.actor.body.rect.y);
        play_best_effort(self.audio.as_ref(), SoundKey::PlayerDeath);
    }

    fn tick_death(&mut self, dt: f32) {
        if self.actor.tick_vitals(dt) == Transition::Expired {
            self.respawn_delay.start(self.config.respawn_delay_secs);
        } else if self.respawn_delay.tick(dt) {
            self.respawn();
        }
    }

    /// Full health at the spawn point with a fresh invincibility window.
    pub fn respawn(&mut self) {
        self.actor
            .vitals
            .revive(self.config.respawn_invincibility_secs);
        self.place_at(self.spawn);
        self.actor.body.stop();
        self.actor.body.contacts = Default::default();
        self.knockback.clear();
        self.jump_buffer.clear();
        self.respawn_delay.clear();
        self.is_jumping = false;
        self.time_since_ground = 0.0;
        self.pose = Pose::Idle;
        self.run_frame = 0;
        self.anim_timer = 0.0;
        debug!("Player respawned at ({}, {})", self.spawn.x, self.spawn.y);
        if let Some(hook) = self.on_respawn.as_mut() {
            hook();
        }
    }

    fn animate(&mut self, dt: f32) {
        let pose = if !self.actor.body.contacts.on_ground {
            Pose::Jump
        } else if self.moved && !self.knockback.is_active() {
            Pose::Run
        } else {
            Pose::Idle
        };
        if pose != self.pose {
            self.pose = pose;
            self.run_frame = 0;
            self.anim_timer = 0.0;
        }
        if pose == Pose::Run {
            self.anim_timer += dt;
            if self.anim_timer >= RUN_FRAME_SECS {
                self.anim_timer -= RUN_FRAME_SECS;
                self.run_frame = (self.run_frame + 1) % RUN_SPRITES.len();
            }
        }
    }

    pub fn sprite(&self) -> &'static str {
        match self.pose {
            Pose::Idle => IDLE_SPRITE,
            Pose::Run => RUN_SPRITES[self.run_frame % RUN_SPRITES.len()],
            Pose::Jump => JUMP_SPRITE,
        }
    }
}

fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
}

impl Drawable for Player {
    fn draw(&self, surface: &mut dyn Surface, camera: &Camera) {
        if self.actor.is_dead() {
            return;
        }
        // Blink: hidden on alternate tenths of a second.
        let vitals = &self.actor.vitals;
        if vitals.is_invincible() && (vitals.invincibility_remaining() * 10.0) as i32 % 2 == 0 {
            return;
        }
        surface.blit(
            self.sprite(),
            camera.apply(&self.actor.body.rect),
            !self.actor.facing_right,
        );
        if self.show_hitbox {
            surface.outline(camera.apply(&self.hitbox()), Color::RED);
        }
    }
}
