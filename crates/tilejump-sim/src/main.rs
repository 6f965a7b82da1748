use std::rc::Rc;

use tracing_subscriber::EnvFilter;

use tilejump_core::audio::{AudioError, AudioSink, SoundKey};
use tilejump_core::draw::{Camera, Color, Drawable, Surface};
use tilejump_core::geom::Rect;
use tilejump_world::config::WorldConfig;
use tilejump_world::layout::load_layout;
use tilejump_world::level::{Level, LevelEvent};
use tilejump_world::player::{Player, PlayerInput};

const TICK_RATE: f32 = 60.0;
const DEFAULT_SECS: u32 = 30;

/// Audio sink for headless runs: every cue becomes a debug log line.
struct LoggingAudio;

impl AudioSink for LoggingAudio {
    fn play(&self, key: SoundKey) -> Result<(), AudioError> {
        tracing::debug!("sound: {}", key.as_str());
        Ok(())
    }
}

/// Surface that only counts what would have been drawn.
#[derive(Default)]
struct CountingSurface {
    blits: usize,
    outlines: usize,
}

impl Surface for CountingSurface {
    fn blit(&mut self, _sprite: &str, _dest: Rect, _flip_x: bool) {
        self.blits += 1;
    }

    fn outline(&mut self, _rect: Rect, _color: Color) {
        self.outlines += 1;
    }
}

/// Hold right, jumping every 40 ticks.
fn scripted_input(tick: u32) -> PlayerInput {
    PlayerInput {
        move_dir: 1.0,
        jump: tick % 40 == 0,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let secs = std::env::var("TILEJUMP_SIM_SECS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_SECS);

    let cfg = WorldConfig::load();
    let layout = load_layout();
    let audio: Rc<dyn AudioSink> = Rc::new(LoggingAudio);

    let mut level = Level::new(&layout, &cfg, Rc::clone(&audio));
    let mut player = Player::new(layout.spawn, &cfg, audio);
    player.show_hitbox = cfg.show_hitboxes;
    level.attach_player(&mut player);
    level.on_complete = Some(Box::new(|| tracing::info!("Exit door opened")));

    tracing::info!("Simulating '{}' for {secs}s at {TICK_RATE} Hz", level.name);

    let dt = 1.0 / TICK_RATE;
    let mut camera = Camera::default();
    let mut deaths = 0u32;
    let mut stomps = 0u32;
    let mut ticks = 0u32;
    for tick in 0..secs * TICK_RATE as u32 {
        ticks = tick + 1;
        for event in level.update(&mut player, &scripted_input(tick), dt) {
            match event {
                LevelEvent::PlayerDied => deaths += 1,
                LevelEvent::EnemyStomped(_) => stomps += 1,
                _ => {},
            }
            tracing::info!("tick {tick}: {event:?}");
        }

        level.follow(&mut camera, &player);
        let mut surface = CountingSurface::default();
        level.draw(&mut surface, &camera);
        player.draw(&mut surface, &camera);
        tracing::trace!(
            "tick {tick}: {} sprites, {} outlines",
            surface.blits,
            surface.outlines
        );

        if level.is_completed() {
            break;
        }
    }

    let rect = player.actor.body.rect;
    tracing::info!(
        "Finished after {ticks} ticks at ({:.0}, {:.0}): {} coins, {} jewels, {deaths} deaths, {stomps} stomps, completed={}",
        rect.x,
        rect.y,
        player.wallet.coins,
        player.wallet.jewels,
        level.is_completed()
    );
}
