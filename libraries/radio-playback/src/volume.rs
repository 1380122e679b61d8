//! Stepped volume control
//!
//! Volume moves in fixed 0.1 steps between 0.0 and 1.0. The level is held
//! as a whole number of steps so repeated adjustments never drift.

/// Size of one user volume adjustment
pub const VOLUME_STEP: f32 = 0.1;

/// Number of steps between silence and full volume
const MAX_STEPS: u8 = 10;

/// Volume controller with 0.1 step granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    /// Volume level in steps (0-10)
    steps: u8,
}

impl Volume {
    /// Create a volume controller
    ///
    /// # Arguments
    /// * `value` - Initial volume, clamped to 0.0-1.0 and snapped to the nearest step.
    ///   NaN is treated as silence.
    pub fn new(value: f32) -> Self {
        Self {
            steps: Self::value_to_steps(value).unwrap_or(0),
        }
    }

    /// Set volume, clamping to 0.0-1.0 on the 0.1 grid
    ///
    /// Returns true if the level changed. NaN leaves the level unchanged.
    pub fn set(&mut self, value: f32) -> bool {
        match Self::value_to_steps(value) {
            Some(steps) if steps != self.steps => {
                self.steps = steps;
                true
            }
            _ => false,
        }
    }

    /// Raise by one step; returns true if the level changed
    pub fn increase(&mut self) -> bool {
        if self.steps < MAX_STEPS {
            self.steps += 1;
            true
        } else {
            false
        }
    }

    /// Lower by one step; returns true if the level changed
    pub fn decrease(&mut self) -> bool {
        if self.steps > 0 {
            self.steps -= 1;
            true
        } else {
            false
        }
    }

    /// Current volume (0.0-1.0)
    pub fn value(&self) -> f32 {
        f32::from(self.steps) / f32::from(MAX_STEPS)
    }

    /// Current volume in steps (0-10)
    pub fn steps(&self) -> u8 {
        self.steps
    }

    fn value_to_steps(value: f32) -> Option<u8> {
        if value.is_nan() {
            return None;
        }
        let clamped = value.clamp(0.0, 1.0);
        Some((clamped * f32::from(MAX_STEPS)).round() as u8)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}
