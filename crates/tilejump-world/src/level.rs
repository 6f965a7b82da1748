//! Level orchestration.
//!
//! The level owns terrain, enemies, traps, items and decorations. The player
//! belongs to the host session and is lent to [`Level::update`] every tick.
//! Player hooks installed by [`Level::attach_player`] only queue signals;
//! the level drains the queue right after the player moves, so the hooks
//! never need mutable access to the level.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use tilejump_core::audio::{AudioSink, SoundKey, play_best_effort};
use tilejump_core::draw::{Camera, Color, Drawable, Surface};
use tilejump_core::geom::{Rect, Vec2};
use tracing::{debug, info};

use crate::actor::Transition;
use crate::broad_phase::ActiveRegion;
use crate::config::WorldConfig;
use crate::enemies::{Enemy, EnemyContext, EnemyKind};
use crate::geometry::{GeometryTile, Terrain, TileKind};
use crate::items::{Decoration, Item, ItemKind};
use crate::layout::{EnemySpawn, LevelLayout, TrapSpawn};
use crate::player::{Player, PlayerInput};
use crate::traps::{Saw, Spikes, Trap};

/// Something worth reporting that happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelEvent {
    ItemCollected(ItemKind),
    EnemyStomped(EnemyKind),
    EnemyKilled(EnemyKind),
    PlayerDamaged { amount: i32 },
    PlayerDied,
    PlayerRespawned,
    BoxOpened,
    EnemiesRepopulated { count: usize },
    LevelComplete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PlayerSignal {
    BoxStruck(Rect),
    Respawned,
}

pub struct Level {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub terrain: Terrain,
    pub enemies: Vec<Enemy>,
    pub traps: Vec<Trap>,
    pub items: Vec<Item>,
    pub decorations: Vec<Decoration>,
    /// Called once, the first time the level is completed.
    pub on_complete: Option<Box<dyn FnMut()>>,
    manifest: Vec<EnemySpawn>,
    spawn: Vec2,
    config: WorldConfig,
    audio: Rc<dyn AudioSink>,
    completed: bool,
    signals: Rc<RefCell<Vec<PlayerSignal>>>,
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("name", &self.name)
            .field("tiles", &self.terrain.tiles().len())
            .field("enemies", &self.enemies.len())
            .field("items", &self.items.len())
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

impl Level {
    pub fn new(layout: &LevelLayout, cfg: &WorldConfig, audio: Rc<dyn AudioSink>) -> Self {
        let geometry = layout.geometry();
        let mut traps: Vec<Trap> = geometry
            .iter()
            .filter(|t| t.kind == TileKind::Hazard)
            .map(|t| Trap::Spikes(Spikes::from_tile(t)))
            .collect();
        traps.extend(layout.traps.iter().map(|spawn| match *spawn {
            TrapSpawn::Saw { x, y, w, h } => Trap::Saw(Saw::new(Rect::new(x, y, w, h))),
            TrapSpawn::Spikes { x, y, w, h } => Trap::Spikes(Spikes::new(Rect::new(x, y, w, h))),
        }));

        let enemies: Vec<Enemy> = layout
            .enemies
            .iter()
            .enumerate()
            .map(|(i, s)| Enemy::spawn(s.kind, i, Vec2::new(s.x, s.y)))
            .collect();
        let items = layout
            .items
            .iter()
            .map(|s| Item::new(s.rect, s.kind))
            .collect::<Vec<_>>();

        info!(
            "Level '{}' loaded: {} tiles, {} enemies, {} traps, {} items",
            layout.name,
            geometry.len(),
            enemies.len(),
            traps.len(),
            items.len()
        );

        Self {
            name: layout.name.clone(),
            width: layout.width,
            height: layout.height,
            terrain: Terrain::new(geometry),
            enemies,
            traps,
            items,
            decorations: layout.decorations.clone(),
            on_complete: None,
            manifest: layout.enemies.clone(),
            spawn: layout.spawn,
            config: cfg.clone(),
            audio,
            completed: false,
            signals: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Living or dying enemies of one kind.
    pub fn enemy_count(&self, kind: EnemyKind) -> usize {
        self.enemies.iter().filter(|e| e.kind == kind).count()
    }

    /// Enemies of one kind listed in the level's initial manifest.
    pub fn manifest_count(&self, kind: EnemyKind) -> usize {
        self.manifest.iter().filter(|s| s.kind == kind).count()
    }

    /// Place the player at the level's spawn point and install the box-hit
    /// and respawn hooks.
    pub fn attach_player(&self, player: &mut Player) {
        player.set_spawn(self.spawn);
        player.place_at(self.spawn);

        let signals = Rc::clone(&self.signals);
        player.on_box_hit = Some(Box::new(move |tile: &GeometryTile| {
            signals.borrow_mut().push(PlayerSignal::BoxStruck(tile.bounds));
        }));
        let signals = Rc::clone(&self.signals);
        player.on_respawn = Some(Box::new(move || {
            signals.borrow_mut().push(PlayerSignal::Respawned);
        }));
    }

    /// Centre `camera` on the player within the level bounds.
    pub fn follow(&self, camera: &mut Camera, player: &Player) {
        camera.follow(&player.actor.body.rect, self.width, self.height);
    }

    /// Run one tick in the fixed order: player input, player physics,
    /// queued player signals, nearby enemies and traps, contacts, items and
    /// the exit door.
    pub fn update(&mut self, player: &mut Player, input: &PlayerInput, dt: f32) -> Vec<LevelEvent> {
        let mut events = Vec::new();
        if !(dt.is_finite() && dt > 0.0) {
            return events;
        }

        let was_dead = player.is_dead();
        let prev_bottom = player.hitbox().bottom();

        player.apply_input(input, dt, &self.terrain);
        player.update(dt, &mut self.terrain);
        self.drain_signals(&mut events);

        let region = ActiveRegion::around(player.hitbox().center(), &self.config.broad_phase);
        self.update_enemies(dt, &region, &mut events);
        for trap in self.traps.iter_mut().filter(|t| region.contains(&t.bounds())) {
            trap.update(dt);
        }

        if !player.is_dead() {
            self.resolve_enemy_contacts(player, prev_bottom, &region, &mut events);
            self.resolve_trap_contacts(player, &region, &mut events);
        }

        for item in &mut self.items {
            item.update(dt, self.config.items.drop_speed);
        }
        if !player.is_dead() {
            self.collect_items(player, &mut events);
            self.check_exit(player, &mut events);
        }

        if !was_dead && player.is_dead() {
            events.push(LevelEvent::PlayerDied);
        }
        events
    }

    fn drain_signals(&mut self, events: &mut Vec<LevelEvent>) {
        let signals = std::mem::take(&mut *self.signals.borrow_mut());
        for signal in signals {
            match signal {
                PlayerSignal::BoxStruck(bounds) => {
                    self.spawn_box_coin(bounds);
                    events.push(LevelEvent::BoxOpened);
                },
                PlayerSignal::Respawned => {
                    events.push(LevelEvent::PlayerRespawned);
                    let count = self.repopulate_enemies();
                    if count > 0 {
                        events.push(LevelEvent::EnemiesRepopulated { count });
                    }
                },
            }
        }
    }

    /// Drop a coin out of a struck box onto the nearest surface below it.
    fn spawn_box_coin(&mut self, bounds: Rect) {
        let coin = match self
            .terrain
            .surface_below(bounds.left(), bounds.right(), bounds.bottom())
        {
            Some(target) => Item::dropped(bounds, ItemKind::Coin, target),
            None => Item::new(bounds, ItemKind::Coin),
        };
        debug!("Coin released from box at ({}, {})", bounds.x, bounds.y);
        self.items.push(coin);
    }

    /// Recreate enemies killed since the last respawn. Enemies that are dead
    /// or about to die are replaced too. Each manifest entry has at most one
    /// living instance, so per-kind counts never exceed the manifest.
    fn repopulate_enemies(&mut self) -> usize {
        self.enemies.retain(|e| !e.actor.vitals.is_doomed());
        let alive: HashSet<usize> = self.enemies.iter().map(|e| e.spawn_index).collect();
        let mut count = 0;
        for (i, spawn) in self.manifest.iter().enumerate() {
            if !alive.contains(&i) {
                self.enemies
                    .push(Enemy::spawn(spawn.kind, i, Vec2::new(spawn.x, spawn.y)));
                count += 1;
            }
        }
        debug!("Re-populated {count} enemies");
        count
    }

    fn update_enemies(&mut self, dt: f32, region: &ActiveRegion, events: &mut Vec<LevelEvent>) {
        let ctx = EnemyContext {
            terrain: &self.terrain,
            resolver: &self.config.resolver,
            level_width: self.width,
        };
        // Dying enemies keep ticking off-screen so their countdown completes.
        for enemy in self
            .enemies
            .iter_mut()
            .filter(|e| e.actor.vitals.is_doomed() || region.contains(&e.bounds()))
        {
            if enemy.update(dt, &ctx) == Transition::Died {
                debug!("{:?} #{} died", enemy.kind, enemy.spawn_index);
                play_best_effort(self.audio.as_ref(), SoundKey::EnemyDeath);
                events.push(LevelEvent::EnemyKilled(enemy.kind));
            }
        }
        self.enemies.retain(|e| !e.is_removed());
    }

    /// A falling player stomps an enemy when its feet are above the enemy's
    /// vertical centre, or were above the enemy's top on the previous tick so
    /// a fast fall that crosses the centre line in one step still counts.
    /// Any other contact hurts the player.
    fn resolve_enemy_contacts(
        &mut self,
        player: &mut Player,
        prev_bottom: f32,
        region: &ActiveRegion,
        events: &mut Vec<LevelEvent>,
    ) {
        let contact_damage = player.config().contact_damage;
        let stomp_damage = player.config().stomp_damage;
        for enemy in &mut self.enemies {
            if enemy.is_dead() || enemy.is_hurt() || !region.contains(&enemy.bounds()) {
                continue;
            }
            let hitbox = player.hitbox();
            let bounds = enemy.hitbox();
            if !hitbox.intersects(&bounds) {
                continue;
            }
            let falling = player.actor.body.velocity.y > 0.0;
            let from_above = hitbox.bottom() < bounds.center_y() || prev_bottom <= bounds.top();
            if falling && from_above {
                if enemy.take_damage(stomp_damage) {
                    play_best_effort(self.audio.as_ref(), SoundKey::EnemyHit);
                    events.push(LevelEvent::EnemyStomped(enemy.kind));
                }
                player.bounce();
            } else if player.take_hit(contact_damage, Some(&bounds)) {
                events.push(LevelEvent::PlayerDamaged {
                    amount: contact_damage,
                });
            }
        }
    }

    fn resolve_trap_contacts(
        &self,
        player: &mut Player,
        region: &ActiveRegion,
        events: &mut Vec<LevelEvent>,
    ) {
        for trap in self.traps.iter().filter(|t| region.contains(&t.bounds())) {
            if trap.touches(&player.hitbox()) && player.take_hit(trap.damage(), None) {
                events.push(LevelEvent::PlayerDamaged {
                    amount: trap.damage(),
                });
            }
        }
    }

    fn collect_items(&mut self, player: &mut Player, events: &mut Vec<LevelEvent>) {
        let hitbox = player.hitbox();
        for item in &mut self.items {
            if !item.rect.intersects(&hitbox) {
                continue;
            }
            if let Some(kind) = item.collect() {
                player.wallet.credit(kind, &self.config.items);
                if matches!(kind, ItemKind::Coin | ItemKind::Jewel) {
                    play_best_effort(self.audio.as_ref(), SoundKey::PlayerCollectCoin);
                }
                debug!("Collected {kind:?}");
                events.push(LevelEvent::ItemCollected(kind));
            }
        }
        self.items.retain(|i| !i.is_collected());
    }

    fn check_exit(&mut self, player: &Player, events: &mut Vec<LevelEvent>) {
        if self.completed {
            return;
        }
        let hitbox = player.hitbox();
        let unlocked = self.decorations.iter().any(|d| {
            d.rect.intersects(&hitbox) && d.required_key().is_some_and(|k| player.wallet.has_key(k))
        });
        if !unlocked {
            return;
        }
        self.completed = true;
        info!("Level '{}' complete", self.name);
        if let Some(hook) = self.on_complete.as_mut() {
            hook();
        }
        events.push(LevelEvent::LevelComplete);
    }
}

fn tile_sprite(tile: &GeometryTile) -> Option<&'static str> {
    match tile.kind {
        TileKind::Flat => Some("ground/grass"),
        TileKind::SemiSolid => Some("ground/grass_half"),
        TileKind::Slope => Some("ground/grass_slope"),
        TileKind::Box if tile.triggered => Some("tiles/boxCoin_disabled"),
        TileKind::Box => Some("tiles/boxCoin"),
        // Drawn as spikes traps.
        TileKind::Hazard => None,
    }
}

impl Drawable for Level {
    fn draw(&self, surface: &mut dyn Surface, camera: &Camera) {
        let view = camera.view();
        for tile in self.terrain.tiles() {
            if let Some(sprite) = tile_sprite(tile)
                && tile.bounds.intersects(&view)
            {
                surface.blit(sprite, camera.apply(&tile.bounds), false);
            }
        }
        for decoration in &self.decorations {
            decoration.draw(surface, camera);
        }
        for trap in &self.traps {
            trap.draw(surface, camera);
        }
        for enemy in &self.enemies {
            enemy.draw(surface, camera);
        }
        for item in &self.items {
            item.draw(surface, camera);
        }

        if self.config.show_hitboxes {
            for (_, tile) in self.terrain.collidable() {
                surface.outline(camera.apply(&tile.shape.bounds()), Color::GREEN);
            }
            for trap in &self.traps {
                surface.outline(camera.apply(&trap.hit_rect()), Color::YELLOW);
            }
            for enemy in &self.enemies {
                surface.outline(camera.apply(&enemy.hitbox()), Color::RED);
            }
        }
    }
}
