use serde::{Deserialize, Serialize};

/// Hit points of an actor. `0 <= current <= max` always holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    /// Full health. A negative maximum is treated as zero.
    pub fn new(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Apply `amount` of damage, flooring at zero.
    ///
    /// Returns `false` (and changes nothing) when health was already zero.
    /// Negative amounts are treated as zero damage.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.current == 0 {
            return false;
        }
        let amount = amount.max(0);
        self.current = self.current.saturating_sub(amount).max(0);
        true
    }

    /// Restore health, clamped at the maximum. Negative amounts are ignored.
    pub fn heal(&mut self, amount: i32) {
        let amount = amount.max(0);
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    pub fn reset(&mut self) {
        self.current = self.max;
    }

    /// Drop straight to zero, bypassing any damage guards.
    pub fn deplete(&mut self) {
        self.current = 0;
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }
}
