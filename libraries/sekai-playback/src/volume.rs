//! Volume control
//!
//! Volume is a linear gain in `0.0..=1.0` shared by both output handles.
//! Mute is tracked separately so unmuting restores the previous level.

/// Volume indicator shown next to the slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VolumeIndicator {
    Muted,
    Low,
    High,
}

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Linear gain (0.0 - 1.0)
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller, clamping `level` into 0.0 - 1.0
    pub fn new(level: f32) -> Self {
        Self {
            level: Self::clamp(level),
            muted: false,
        }
    }

    /// Create from a slider percentage (0-100)
    pub fn from_percent(percent: u8) -> Self {
        Self::new(f32::from(percent.min(100)) / 100.0)
    }

    fn clamp(level: f32) -> f32 {
        if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = Self::clamp(level);
    }

    /// Set from a slider percentage (0-100)
    pub fn set_percent(&mut self, percent: u8) {
        self.set_level(f32::from(percent.min(100)) / 100.0);
    }

    /// Move by a signed number of percentage points
    pub fn step_percent(&mut self, delta: i32) {
        let next = (i32::from(self.percent()) + delta).clamp(0, 100);
        self.set_percent(u8::try_from(next).unwrap_or(100));
    }

    /// Current linear level (ignores mute)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Current level as a slider percentage
    pub fn percent(&self) -> u8 {
        // level is clamped to 0..=1, so the product fits in a u8
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (self.level * 100.0).round() as u8;
        percent
    }

    /// Mute audio (preserves volume level)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute audio (restores previous volume)
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Toggle mute state, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn indicator(&self) -> VolumeIndicator {
        if self.muted || self.level == 0.0 {
            VolumeIndicator::Muted
        } else if self.level < 0.5 {
            VolumeIndicator::Low
        } else {
            VolumeIndicator::High
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.8)
    }
}
