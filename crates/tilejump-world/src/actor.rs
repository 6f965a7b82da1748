use serde::{Deserialize, Serialize};
use tilejump_core::geom::{Rect, Vec2};
use tilejump_core::health::Health;
use tilejump_core::timer::Countdown;

/// Contact flags produced by the collision resolver.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contacts {
    pub on_ground: bool,
    pub on_slope: bool,
    pub blocked_left: bool,
    pub blocked_right: bool,
}

/// Kinematic body: sprite bounds, a hitbox inside them, velocity and contacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Body {
    /// Sprite bounds in world space.
    pub rect: Rect,
    /// Hitbox relative to the top-left of `rect`.
    pub hitbox_offset: Rect,
    pub velocity: Vec2,
    pub contacts: Contacts,
}

impl Body {
    pub fn new(rect: Rect, hitbox_offset: Rect) -> Self {
        Self {
            rect,
            hitbox_offset,
            velocity: Vec2::ZERO,
            contacts: Contacts::default(),
        }
    }

    /// Body whose hitbox is its whole sprite.
    pub fn solid(rect: Rect) -> Self {
        Self::new(rect, Rect::new(0.0, 0.0, rect.w, rect.h))
    }

    /// Hitbox in world space.
    pub fn hitbox(&self) -> Rect {
        Rect::new(
            self.rect.x + self.hitbox_offset.x,
            self.rect.y + self.hitbox_offset.y,
            self.hitbox_offset.w,
            self.hitbox_offset.h,
        )
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.rect.x += dx;
        self.rect.y += dy;
    }

    pub fn set_hitbox_bottom(&mut self, y: f32) {
        self.rect.y = y - self.hitbox_offset.y - self.hitbox_offset.h;
    }

    pub fn set_hitbox_top(&mut self, y: f32) {
        self.rect.y = y - self.hitbox_offset.y;
    }

    pub fn set_hitbox_left(&mut self, x: f32) {
        self.rect.x = x - self.hitbox_offset.x;
    }

    pub fn set_hitbox_right(&mut self, x: f32) {
        self.rect.x = x - self.hitbox_offset.x - self.hitbox_offset.w;
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }
}

/// Durations of the damage reaction windows, in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Timings {
    pub hurt: f32,
    pub invincibility: f32,
    pub death: f32,
}

/// Lifecycle phase of an actor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Phase {
    Normal,
    /// Reacting to a hit. `pending_death` is set when the hit was lethal and
    /// is consumed exactly once, when the hurt window closes.
    Hurt {
        timer: Countdown,
        pending_death: bool,
    },
    Dead {
        timer: Countdown,
    },
    /// Death countdown finished.
    Removed,
}

/// What changed during a [`Vitals::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    /// Hurt window closed and the actor lives on.
    Recovered,
    /// Hurt window closed on a lethal hit.
    Died,
    /// Death countdown finished.
    Expired,
}

/// Health plus the hurt / invincibility / death state machine shared by the
/// player and every enemy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vitals {
    pub health: Health,
    phase: Phase,
    invincibility: Countdown,
    timings: Timings,
}

impl Vitals {
    pub fn new(max_health: i32, timings: Timings) -> Self {
        Self {
            health: Health::new(max_health),
            phase: Phase::Normal,
            invincibility: Countdown::idle(),
            timings,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn is_hurt(&self) -> bool {
        matches!(self.phase, Phase::Hurt { .. })
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility.is_active()
    }

    pub fn invincibility_remaining(&self) -> f32 {
        self.invincibility.remaining()
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.phase, Phase::Dead { .. } | Phase::Removed)
    }

    pub fn is_removed(&self) -> bool {
        matches!(self.phase, Phase::Removed)
    }

    /// Dead, or certain to die once the current hurt window closes.
    pub fn is_doomed(&self) -> bool {
        self.is_dead()
            || matches!(
                self.phase,
                Phase::Hurt {
                    pending_death: true,
                    ..
                }
            )
    }

    /// Apply damage unless invincible or dead. A successful hit opens the
    /// hurt and invincibility windows together; a lethal hit defers death
    /// until the hurt window closes.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_invincible() || self.is_dead() {
            return false;
        }
        if !self.health.take_damage(amount) {
            return false;
        }
        let already_pending = matches!(
            self.phase,
            Phase::Hurt {
                pending_death: true,
                ..
            }
        );
        self.phase = Phase::Hurt {
            timer: Countdown::started(self.timings.hurt),
            pending_death: already_pending || self.health.is_depleted(),
        };
        self.invincibility.start(self.timings.invincibility);
        true
    }

    /// Enter the timed death phase immediately. No-op when already dead.
    pub fn die(&mut self) -> bool {
        if self.is_dead() {
            return false;
        }
        self.phase = Phase::Dead {
            timer: Countdown::started(self.timings.death),
        };
        self.invincibility.clear();
        true
    }

    pub fn tick(&mut self, dt: f32) -> Transition {
        if let Phase::Dead { timer } = &mut self.phase {
            if timer.tick(dt) {
                self.phase = Phase::Removed;
                return Transition::Expired;
            }
            return Transition::None;
        }
        if self.is_removed() {
            return Transition::None;
        }

        self.invincibility.tick(dt);

        let hurt_closed = match &mut self.phase {
            Phase::Hurt {
                timer,
                pending_death,
            } => timer.tick(dt).then_some(*pending_death),
            _ => None,
        };
        match hurt_closed {
            Some(true) => {
                self.die();
                Transition::Died
            },
            Some(false) => {
                self.phase = Phase::Normal;
                Transition::Recovered
            },
            None => Transition::None,
        }
    }

    /// Back to full health with a fresh invincibility window.
    pub fn revive(&mut self, invincibility: f32) {
        self.health.reset();
        self.phase = Phase::Normal;
        self.invincibility.start(invincibility);
    }
}

/// State common to every moving actor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
    pub body: Body,
    pub vitals: Vitals,
    pub facing_right: bool,
}

impl Actor {
    pub fn new(body: Body, vitals: Vitals) -> Self {
        Self {
            body,
            vitals,
            facing_right: true,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.vitals.is_dead()
    }

    /// Enter death and freeze in place.
    pub fn die(&mut self) -> bool {
        let died = self.vitals.die();
        self.body.stop();
        died
    }

    /// Advance the state machine; a deferred death also freezes the body.
    pub fn tick_vitals(&mut self, dt: f32) -> Transition {
        let t = self.vitals.tick(dt);
        if self.vitals.is_dead() {
            self.body.stop();
        }
        t
    }
}
