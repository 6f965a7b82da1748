//! Audio side-effect capability.
//!
//! Simulation code never talks to a mixer directly. It is handed an
//! [`AudioSink`] at construction and reports sound cues through
//! [`play_best_effort`], which swallows and logs failures.

use serde::{Deserialize, Serialize};

/// Sound cues emitted by the simulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SoundKey {
    PlayerJump,
    PlayerCollectCoin,
    PlayerTakeDamage,
    PlayerDeath,
    EnemyHit,
    EnemyDeath,
}

impl SoundKey {
    pub const ALL: [SoundKey; 6] = [
        SoundKey::PlayerJump,
        SoundKey::PlayerCollectCoin,
        SoundKey::PlayerTakeDamage,
        SoundKey::PlayerDeath,
        SoundKey::EnemyHit,
        SoundKey::EnemyDeath,
    ];

    /// Registry key used by the host mixer.
    pub fn as_str(self) -> &'static str {
        match self {
            SoundKey::PlayerJump => "player_jump",
            SoundKey::PlayerCollectCoin => "player_collect_coin",
            SoundKey::PlayerTakeDamage => "player_take_damage",
            SoundKey::PlayerDeath => "player_death",
            SoundKey::EnemyHit => "enemy_hit",
            SoundKey::EnemyDeath => "enemy_death",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The host has no sound registered under this key.
    UnknownSound(SoundKey),
    /// The mixer could not play anything (not initialized, muted device, ...).
    Unavailable(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSound(key) => write!(f, "no sound registered for '{}'", key.as_str()),
            Self::Unavailable(m) => write!(f, "audio unavailable: {m}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Host-provided sink for sound cues.
pub trait AudioSink {
    fn play(&self, key: SoundKey) -> Result<(), AudioError>;
}

/// Sink that accepts every cue and does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&self, _key: SoundKey) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Play a cue, logging instead of propagating any failure.
pub fn play_best_effort(sink: &dyn AudioSink, key: SoundKey) {
    if let Err(e) = sink.play(key) {
        tracing::warn!("Sound '{}' not played: {e}", key.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let mut names: Vec<&str> = SoundKey::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SoundKey::ALL.len());
    }

    #[test]
    fn error_display_names_the_key() {
        let e = AudioError::UnknownSound(SoundKey::EnemyHit);
        assert_eq!(e.to_string(), "no sound registered for 'enemy_hit'");
    }

    #[test]
    fn best_effort_swallows_failures() {
        struct Broken;
        impl AudioSink for Broken {
            fn play(&self, _key: SoundKey) -> Result<(), AudioError> {
                Err(AudioError::Unavailable("mixer offline".into()))
            }
        }
        play_best_effort(&Broken, SoundKey::PlayerJump);
        play_best_effort(&NullAudio, SoundKey::PlayerJump);
    }
}
