//! End-to-end scenarios: a player driven through `Level::update` at 60 Hz.

use std::cell::Cell;
use std::rc::Rc;

use tilejump_core::audio::{AudioSink, SoundKey};
use tilejump_core::geom::{Rect, Vec2};
use tilejump_core::test_helpers::RecordingAudio;
use tilejump_world::actor::Phase;
use tilejump_world::config::{COYOTE_TIME, JUMP_VELOCITY, WorldConfig};
use tilejump_world::enemies::EnemyKind;
use tilejump_world::geometry::{Terrain, TileKind};
use tilejump_world::items::{Decoration, DecorationKind, ItemKind, KeyColor};
use tilejump_world::layout::{
    EnemySpawn, ItemSpawn, LevelLayout, TileLayer, TilePlacement, demo_layout,
};
use tilejump_world::level::{Level, LevelEvent};
use tilejump_world::player::{Player, PlayerInput};

const DT: f32 = 1.0 / 60.0;

const IDLE: PlayerInput = PlayerInput {
    move_dir: 0.0,
    jump: false,
};
const JUMP: PlayerInput = PlayerInput {
    move_dir: 0.0,
    jump: true,
};
const RIGHT: PlayerInput = PlayerInput {
    move_dir: 1.0,
    jump: false,
};

fn layout_with(tiles: Vec<TilePlacement>, spawn: Vec2) -> LevelLayout {
    LevelLayout {
        name: "scenario".to_string(),
        width: 2048.0,
        height: 1024.0,
        spawn,
        layers: vec![TileLayer {
            name: "ground".to_string(),
            tiles,
        }],
        enemies: Vec::new(),
        traps: Vec::new(),
        items: Vec::new(),
        decorations: Vec::new(),
    }
}

/// Floor along y = 400, spawn standing on it at x = 500.
fn floor_layout() -> LevelLayout {
    layout_with(
        vec![TilePlacement {
            bounds: Rect::new(0.0, 400.0, 2048.0, 128.0),
            kind: TileKind::Flat,
        }],
        Vec2::new(500.0, 300.0),
    )
}

fn start(layout: &LevelLayout, audio: Rc<RecordingAudio>) -> (Level, Player) {
    let cfg = WorldConfig::default();
    let level = Level::new(layout, &cfg, Rc::clone(&audio) as Rc<dyn AudioSink>);
    let mut player = Player::new(Vec2::ZERO, &cfg, audio as Rc<dyn AudioSink>);
    level.attach_player(&mut player);
    (level, player)
}

fn run(level: &mut Level, player: &mut Player, input: PlayerInput, ticks: usize) -> Vec<LevelEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(level.update(player, &input, DT));
    }
    events
}

fn count(events: &[LevelEvent], wanted: LevelEvent) -> usize {
    events.iter().filter(|e| **e == wanted).count()
}

// ============================================================================
// Movement
// ============================================================================

#[test]
fn player_drops_onto_flat_tile() {
    let layout = layout_with(
        vec![TilePlacement {
            bounds: Rect::new(0.0, 400.0, 800.0, 50.0),
            kind: TileKind::Flat,
        }],
        Vec2::new(400.0, 200.0),
    );
    let (mut level, mut player) = start(&layout, Rc::new(RecordingAudio::new()));
    run(&mut level, &mut player, IDLE, 60);

    assert_eq!(player.hitbox().bottom(), 400.0);
    assert_eq!(player.actor.body.velocity.y, 0.0);
    assert!(player.actor.body.contacts.on_ground);
}

#[test]
fn coyote_jump_inside_window() {
    let (mut level, mut player) = start(&floor_layout(), Rc::new(RecordingAudio::new()));
    run(&mut level, &mut player, IDLE, 10);
    assert!(player.actor.body.contacts.on_ground);

    level.terrain = Terrain::default();
    run(&mut level, &mut player, IDLE, 6);
    assert!(!player.actor.body.contacts.on_ground);
    assert!(6.0 * DT < COYOTE_TIME);

    level.update(&mut player, &JUMP, DT);
    assert!(player.is_jumping(), "Jump inside the coyote window should fire");
    assert_eq!(player.actor.body.velocity.y, JUMP_VELOCITY);
}

#[test]
fn coyote_jump_after_window_fails() {
    let (mut level, mut player) = start(&floor_layout(), Rc::new(RecordingAudio::new()));
    run(&mut level, &mut player, IDLE, 10);

    level.terrain = Terrain::default();
    run(&mut level, &mut player, IDLE, 12);
    level.update(&mut player, &JUMP, DT);
    run(&mut level, &mut player, IDLE, 10);
    assert!(!player.is_jumping(), "Late jump must not fire");
    assert!(player.actor.body.velocity.y > 0.0);
}

// ============================================================================
// Damage
// ============================================================================

#[test]
fn three_hits_register_only_outside_invincibility() {
    let (mut level, mut player) = start(&floor_layout(), Rc::new(RecordingAudio::new()));
    run(&mut level, &mut player, IDLE, 5);
    assert_eq!(player.actor.vitals.health.max(), 60);

    // First hit: registers and opens the 1 s invincibility window.
    assert!(player.take_hit(30, None));
    assert_eq!(player.actor.vitals.health.current(), 30);
    assert!(player.actor.vitals.is_invincible());

    // Second hit half a second later lands inside the window.
    run(&mut level, &mut player, IDLE, 30);
    assert!(!player.take_hit(30, None), "Second hit is inside the window");
    assert_eq!(player.actor.vitals.health.current(), 30);
    assert_eq!(player.actor.vitals.phase(), Phase::Normal);

    // Third hit after the window: lethal, but death waits for the hurt window.
    run(&mut level, &mut player, IDLE, 40);
    assert!(!player.actor.vitals.is_invincible());
    assert!(player.take_hit(30, None), "Third hit is past the window");
    assert_eq!(player.actor.vitals.health.current(), 0);
    assert!(matches!(
        player.actor.vitals.phase(),
        Phase::Hurt {
            pending_death: true,
            ..
        }
    ));
    assert!(!player.is_dead());

    let events = run(&mut level, &mut player, IDLE, 30);
    assert_eq!(count(&events, LevelEvent::PlayerDied), 1);
    assert!(matches!(player.actor.vitals.phase(), Phase::Dead { .. }));
    assert_eq!(player.actor.vitals.health.current(), 0);
}

#[test]
fn respawn_restores_exact_enemy_counts() {
    let mut layout = floor_layout();
    layout.enemies = vec![
        EnemySpawn {
            kind: EnemyKind::Slime,
            x: 1200.0,
            y: 370.0,
        },
        EnemySpawn {
            kind: EnemyKind::Slime,
            x: 1300.0,
            y: 370.0,
        },
        EnemySpawn {
            kind: EnemyKind::Snail,
            x: 1400.0,
            y: 368.0,
        },
        EnemySpawn {
            kind: EnemyKind::Fly,
            x: 900.0,
            y: 100.0,
        },
    ];
    let (mut level, mut player) = start(&layout, Rc::new(RecordingAudio::new()));

    for enemy in &mut level.enemies {
        assert!(enemy.take_damage(100));
    }
    run(&mut level, &mut player, IDLE, 100);
    assert!(level.enemies.is_empty());

    player.die();
    let events = run(&mut level, &mut player, IDLE, 150);
    assert_eq!(count(&events, LevelEvent::PlayerRespawned), 1);
    assert_eq!(count(&events, LevelEvent::EnemiesRepopulated { count: 4 }), 1);
    for kind in EnemyKind::ALL {
        assert_eq!(level.enemy_count(kind), level.manifest_count(kind), "{kind:?}");
    }
}

#[test]
fn respawn_replaces_doomed_enemies_without_duplicates() {
    let mut layout = floor_layout();
    layout.enemies = vec![
        EnemySpawn {
            kind: EnemyKind::Slime,
            x: 1200.0,
            y: 370.0,
        },
        EnemySpawn {
            kind: EnemyKind::Slime,
            x: 1300.0,
            y: 370.0,
        },
    ];
    let (mut level, mut player) = start(&layout, Rc::new(RecordingAudio::new()));

    player.die();
    run(&mut level, &mut player, IDLE, 100);
    assert!(level.enemies[0].take_damage(100), "Slime is mid-hurt at respawn");

    let events = run(&mut level, &mut player, IDLE, 50);
    assert_eq!(count(&events, LevelEvent::PlayerRespawned), 1);
    assert_eq!(count(&events, LevelEvent::EnemiesRepopulated { count: 1 }), 1);
    assert_eq!(level.enemy_count(EnemyKind::Slime), 2);
    assert!(level.enemies.iter().all(|e| !e.actor.vitals.is_doomed()));
}

// ============================================================================
// Boxes, items and the exit
// ============================================================================

#[test]
fn box_without_hook_still_triggers_once() {
    let mut layout = floor_layout();
    layout.layers[0].tiles.push(TilePlacement {
        bounds: Rect::new(476.0, 122.0, 128.0, 128.0),
        kind: TileKind::Box,
    });
    let (mut level, mut player) = start(&layout, Rc::new(RecordingAudio::new()));
    player.on_box_hit = None;

    let mut events = Vec::new();
    for _ in 0..2 {
        events.extend(level.update(&mut player, &JUMP, DT));
        events.extend(run(&mut level, &mut player, IDLE, 120));
    }
    assert_eq!(count(&events, LevelEvent::BoxOpened), 0);
    assert!(level.terrain.tiles()[1].triggered);
    assert!(!level.terrain.tiles()[1].has_collision);
    assert!(level.items.is_empty());
}

#[test]
fn key_opens_door_once() {
    let mut layout = floor_layout();
    layout.items.push(ItemSpawn {
        kind: ItemKind::Key(KeyColor::Yellow),
        rect: Rect::new(480.0, 300.0, 64.0, 64.0),
    });
    layout.decorations.push(Decoration {
        rect: Rect::new(900.0, 368.0, 32.0, 32.0),
        kind: DecorationKind::LockedDoor {
            key: KeyColor::Yellow,
        },
    });
    let (mut level, mut player) = start(&layout, Rc::new(RecordingAudio::new()));
    let completions = Rc::new(Cell::new(0));
    let counter = Rc::clone(&completions);
    level.on_complete = Some(Box::new(move || counter.set(counter.get() + 1)));

    let events = run(&mut level, &mut player, RIGHT, 180);
    assert_eq!(
        count(&events, LevelEvent::ItemCollected(ItemKind::Key(KeyColor::Yellow))),
        1
    );
    assert_eq!(count(&events, LevelEvent::LevelComplete), 1);
    assert_eq!(completions.get(), 1);
    assert!(level.is_completed());
}

#[test]
fn door_without_hook_completes() {
    let mut layout = floor_layout();
    layout.decorations.push(Decoration {
        rect: Rect::new(520.0, 368.0, 32.0, 32.0),
        kind: DecorationKind::LockedDoor { key: KeyColor::Red },
    });
    let (mut level, mut player) = start(&layout, Rc::new(RecordingAudio::new()));
    player
        .wallet
        .credit(ItemKind::Key(KeyColor::Red), &level.config().items);
    let events = run(&mut level, &mut player, IDLE, 3);
    assert_eq!(count(&events, LevelEvent::LevelComplete), 1);
}

// ============================================================================
// Audio failures
// ============================================================================

fn busy_layout() -> LevelLayout {
    let mut layout = floor_layout();
    layout.enemies.push(EnemySpawn {
        kind: EnemyKind::Slime,
        x: 505.0,
        y: 370.0,
    });
    layout.items.push(ItemSpawn {
        kind: ItemKind::Coin,
        rect: Rect::new(700.0, 300.0, 64.0, 64.0),
    });
    layout.spawn = Vec2::new(500.0, 100.0);
    layout
}

#[test]
fn failing_audio_does_not_change_outcome() {
    let layout = busy_layout();
    let quiet = Rc::new(RecordingAudio::new());
    let broken = Rc::new(RecordingAudio::failing());
    let (mut a, mut pa) = start(&layout, Rc::clone(&quiet));
    let (mut b, mut pb) = start(&layout, Rc::clone(&broken));

    let script = [(IDLE, 60), (RIGHT, 60), (JUMP, 1), (IDLE, 120)];
    let mut ea = Vec::new();
    let mut eb = Vec::new();
    for (input, ticks) in script {
        ea.extend(run(&mut a, &mut pa, input, ticks));
        eb.extend(run(&mut b, &mut pb, input, ticks));
    }

    assert_eq!(ea, eb);
    assert_eq!(pa.actor, pb.actor);
    assert_eq!(pa.wallet, pb.wallet);
    assert_eq!(a.enemies, b.enemies);
    assert!(ea.contains(&LevelEvent::EnemyStomped(EnemyKind::Slime)));
    assert_eq!(
        quiet.played.borrow().as_slice(),
        broken.played.borrow().as_slice(),
        "Both sinks are asked for the same cues"
    );
    assert!(broken.count(SoundKey::EnemyHit) >= 1);
}

// ============================================================================
// Layouts
// ============================================================================

#[test]
fn bad_layer_is_skipped_and_level_still_plays() {
    let json = r#"{
        "name": "partial",
        "width": 2048, "height": 1024,
        "spawn": {"x": 500, "y": 200},
        "layers": [
            {"name": "floor", "kind": "flat", "tiles": [{"x": 0, "y": 400, "w": 2048, "h": 128}]},
            {"name": "broken", "tiles": [{"x": 0, "y": 0, "gid": 9999}]}
        ]
    }"#;
    let layout = LevelLayout::from_json(json).unwrap();
    let (mut level, mut player) = start(&layout, Rc::new(RecordingAudio::new()));
    assert_eq!(level.terrain.tiles().len(), 1);

    run(&mut level, &mut player, IDLE, 60);
    assert_eq!(player.hitbox().bottom(), 400.0);
}

#[test]
fn demo_level_smoke_run() {
    let layout = demo_layout();
    let (mut level, mut player) = start(&layout, Rc::new(RecordingAudio::new()));
    for tick in 0..900 {
        let input = PlayerInput {
            move_dir: 1.0,
            jump: tick % 40 == 0,
        };
        level.update(&mut player, &input, DT);
        let rect = player.actor.body.rect;
        assert!(rect.x.is_finite() && rect.y.is_finite(), "tick {tick}");
    }
    for kind in EnemyKind::ALL {
        assert!(level.enemy_count(kind) <= level.manifest_count(kind));
    }
}
