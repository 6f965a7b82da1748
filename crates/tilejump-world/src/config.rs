use serde::{Deserialize, Serialize};

/// Horizontal walk speed (px/s).
pub const MOVE_SPEED: f32 = 300.0;
/// Downward acceleration (px/s^2).
pub const GRAVITY: f32 = 2880.0;
/// Initial vertical velocity of a jump (px/s, negative is up).
pub const JUMP_VELOCITY: f32 = -1380.0;
/// Terminal fall speed (px/s).
pub const MAX_FALL_SPEED: f32 = 1500.0;
/// Grace window after leaving the ground during which a jump is honored (s).
pub const COYOTE_TIME: f32 = 0.15;
/// How long an early jump press is remembered (s).
pub const JUMP_BUFFER_TIME: f32 = 0.1;

/// Largest ledge a grounded actor climbs without being stopped (px).
/// Tuned for 128 px tiles.
pub const STEP_HEIGHT: f32 = 16.0;
/// Vertical overlap at or below which a side contact is ignored (px).
pub const MIN_SIDE_OVERLAP: f32 = 5.0;
/// Slack when comparing an actor's feet with a slope surface (px).
pub const SLOPE_TOLERANCE: f32 = 2.0;
/// Deepest slope penetration that is still corrected by snapping (px).
pub const MAX_SLOPE_PENETRATION: f32 = 30.0;
/// How far a grounded, walking actor is pulled down to stay on the ground (px).
/// Covers half a 60 px hitbox on a 45 degree slope plus one step of travel.
pub const GROUND_SNAP: f32 = 40.0;

/// Player tuning. Per-frame values of the 60 Hz design are expressed per second.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    pub hitbox_x: f32,
    pub hitbox_y: f32,
    pub hitbox_w: f32,
    pub hitbox_h: f32,
    pub move_speed: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub max_fall_speed: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    pub max_health: i32,
    pub invincibility_secs: f32,
    pub knockback_secs: f32,
    pub knockback_speed: f32,
    /// Upward share of the knockback speed.
    pub knockback_lift: f32,
    pub bounce_velocity: f32,
    pub trap_bump_velocity: f32,
    pub death_secs: f32,
    pub respawn_delay_secs: f32,
    pub respawn_invincibility_secs: f32,
    pub contact_damage: i32,
    pub stomp_damage: i32,
    /// Falling below this y kills outright.
    pub fall_death_y: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 80.0,
            height: 100.0,
            hitbox_x: 10.0,
            hitbox_y: 10.0,
            hitbox_w: 60.0,
            hitbox_h: 90.0,
            move_speed: MOVE_SPEED,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            max_fall_speed: MAX_FALL_SPEED,
            coyote_time: COYOTE_TIME,
            jump_buffer_time: JUMP_BUFFER_TIME,
            max_health: 60,
            invincibility_secs: 1.0,
            knockback_secs: 0.3,
            knockback_speed: 480.0,
            knockback_lift: 0.7,
            bounce_velocity: -720.0,
            trap_bump_velocity: -480.0,
            death_secs: 1.0,
            respawn_delay_secs: 1.0,
            respawn_invincibility_secs: 3.0,
            contact_damage: 10,
            stomp_damage: 30,
            fall_death_y: 3000.0,
        }
    }
}

/// Collision resolver thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub step_height: f32,
    pub min_side_overlap: f32,
    pub slope_tolerance: f32,
    pub max_slope_penetration: f32,
    pub ground_snap: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            step_height: STEP_HEIGHT,
            min_side_overlap: MIN_SIDE_OVERLAP,
            slope_tolerance: SLOPE_TOLERANCE,
            max_slope_penetration: MAX_SLOPE_PENETRATION,
            ground_snap: GROUND_SNAP,
        }
    }
}

/// Size of the region around the player in which enemies and traps are simulated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadPhaseConfig {
    pub half_width: f32,
    pub half_height: f32,
    pub margin: f32,
}

impl Default for BroadPhaseConfig {
    fn default() -> Self {
        Self {
            half_width: 700.0,
            half_height: 400.0,
            margin: 400.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    pub coin_value: u32,
    /// Coins credited in addition to the jewel itself.
    pub jewel_value: u32,
    /// Fall speed of coins dropped from boxes (px/s).
    pub drop_speed: f32,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            coin_value: 1,
            jewel_value: 5,
            drop_speed: 600.0,
        }
    }
}

/// Top-level world configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub player: PlayerConfig,
    pub resolver: ResolverConfig,
    pub broad_phase: BroadPhaseConfig,
    pub items: ItemConfig,
    /// Draw actor and trap hitboxes as outlines.
    pub show_hitboxes: bool,
}

impl WorldConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("TILEJUMP_WORLD_CONFIG")
            .unwrap_or_else(|_| "config/world.toml".to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<WorldConfig>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    WorldConfig::default()
                },
            },
            Err(_) => WorldConfig::default(),
        }
    }
}
