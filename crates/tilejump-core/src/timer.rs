use serde::{Deserialize, Serialize};

/// A one-shot countdown measured in seconds.
///
/// An idle countdown has nothing remaining. `tick` reports the tick on which
/// an active countdown reaches zero, and only that tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Countdown {
    remaining: f32,
    active: bool,
}

impl Countdown {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn started(duration: f32) -> Self {
        let mut c = Self::idle();
        c.start(duration);
        c
    }

    /// (Re)start with `duration` seconds. A non-finite or non-positive
    /// duration leaves the countdown active for exactly one tick.
    pub fn start(&mut self, duration: f32) {
        self.remaining = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        self.active = true;
    }

    /// Advance by `dt`. Returns `true` on the tick the countdown expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        if dt.is_finite() && dt > 0.0 {
            self.remaining -= dt;
        }
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.active = false;
            return true;
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining(&self) -> f32 {
        if self.active { self.remaining } else { 0.0 }
    }

    pub fn clear(&mut self) {
        self.remaining = 0.0;
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_never_fires() {
        let mut c = Countdown::idle();
        assert!(!c.is_active());
        assert!(!c.tick(10.0));
    }

    #[test]
    fn fires_exactly_once() {
        let mut c = Countdown::started(0.5);
        assert!(!c.tick(0.2));
        assert!(c.is_active());
        assert!(c.tick(0.4), "Should expire when remaining crosses zero");
        assert!(!c.is_active());
        assert!(!c.tick(0.4), "Expired countdown must not fire again");
    }

    #[test]
    fn restart_extends() {
        let mut c = Countdown::started(0.1);
        c.tick(0.05);
        c.start(1.0);
        assert!(!c.tick(0.5));
        assert!((c.remaining() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn zero_duration_expires_next_tick() {
        let mut c = Countdown::started(0.0);
        assert!(c.is_active());
        assert!(c.tick(0.0));
    }

    #[test]
    fn nan_dt_is_ignored() {
        let mut c = Countdown::started(1.0);
        assert!(!c.tick(f32::NAN));
        assert!((c.remaining() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn clear_stops_countdown() {
        let mut c = Countdown::started(1.0);
        c.clear();
        assert!(!c.is_active());
        assert_eq!(c.remaining(), 0.0);
        assert!(!c.tick(2.0));
    }
}
