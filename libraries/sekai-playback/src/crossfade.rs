//! Crossfade ramp for smooth track transitions
//!
//! A crossfade is a fixed number of discrete linear gain steps spread
//! evenly across the configured duration. The outgoing handle falls from
//! the current volume to silence while the incoming one rises from silence
//! to the current volume, so at every step both gains sum to the volume.

use std::time::Duration;

use sekai_core::Preferences;

use crate::types::TimerId;

/// Crossfade settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeSettings {
    /// Whether crossfade is enabled
    pub enabled: bool,

    /// Total ramp duration
    pub duration: Duration,

    /// Number of discrete gain steps
    pub steps: u32,
}

impl Default for CrossfadeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            duration: Duration::from_secs(3),
            steps: 20,
        }
    }
}

impl CrossfadeSettings {
    /// Settings from the persisted preferences
    pub fn from_preferences(prefs: &Preferences, steps: u32) -> Self {
        let duration = if prefs.crossfade_duration.is_finite() && prefs.crossfade_duration > 0.0 {
            Duration::from_secs_f64(prefs.crossfade_duration)
        } else {
            Self::default().duration
        };
        Self {
            enabled: prefs.crossfade,
            duration,
            steps: steps.max(1),
        }
    }

    /// Time between two ramp steps
    pub fn step_interval(&self) -> Duration {
        self.duration / self.steps.max(1)
    }
}

/// Gains of the outgoing and incoming handle after `step` of `steps`
///
/// `fade_out = max(0, v - v*k/n)` and `fade_in = min(v, v*k/n)`.
#[inline]
pub fn ramp_gains(step: u32, steps: u32, volume: f32) -> (f32, f32) {
    let steps = steps.max(1);
    let step = step.min(steps);
    #[allow(clippy::cast_precision_loss)]
    let rising = volume * step as f32 / steps as f32;
    ((volume - rising).max(0.0), rising.min(volume))
}

/// One tick of a running ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampStep {
    pub step: u32,
    pub fade_out: f32,
    pub fade_in: f32,
    /// Last step: the outgoing handle must now be stopped
    pub finished: bool,
}

/// Running crossfade ramp
///
/// Owns the timer driving it; ticks for any other timer are not ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossfadeRamp {
    timer: TimerId,
    step: u32,
    steps: u32,
}

impl CrossfadeRamp {
    pub fn new(timer: TimerId, steps: u32) -> Self {
        Self {
            timer,
            step: 0,
            steps: steps.max(1),
        }
    }

    pub fn timer(&self) -> TimerId {
        self.timer
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.steps
    }

    /// Progress from 0.0 to 1.0
    pub fn progress(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let progress = self.step as f32 / self.steps as f32;
        progress
    }

    /// Advance one step at the given volume
    pub fn advance(&mut self, volume: f32) -> RampStep {
        self.step = (self.step + 1).min(self.steps);
        let (fade_out, fade_in) = ramp_gains(self.step, self.steps, volume);
        RampStep {
            step: self.step,
            fade_out,
            fade_in,
            finished: self.is_finished(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_preferences() {
        let prefs = Preferences {
            crossfade: true,
            crossfade_duration: 4.0,
            ..Preferences::default()
        };
        let settings = CrossfadeSettings::from_preferences(&prefs, 20);

        assert!(settings.enabled);
        assert_eq!(settings.step_interval(), Duration::from_millis(200));
    }

    #[test]
    fn invalid_duration_uses_default() {
        let prefs = Preferences {
            crossfade_duration: f64::NAN,
            ..Preferences::default()
        };
        let settings = CrossfadeSettings::from_preferences(&prefs, 0);
        assert_eq!(settings.duration, Duration::from_secs(3));
        assert_eq!(settings.steps, 1);
    }

    #[test]
    fn ramp_endpoints() {
        assert_eq!(ramp_gains(0, 20, 0.8), (0.8, 0.0));
        let (out, inc) = ramp_gains(20, 20, 0.8);
        assert_eq!(out, 0.0);
        assert!((inc - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn ramp_advances_to_completion() {
        let mut ramp = CrossfadeRamp::new(TimerId(7), 4);
        let mut last = None;
        while !ramp.is_finished() {
            last = Some(ramp.advance(1.0));
        }

        let last = last.unwrap();
        assert!(last.finished);
        assert_eq!(last.step, 4);
        assert_eq!(last.fade_out, 0.0);
        assert!((ramp.progress() - 1.0).abs() < f32::EPSILON);

        // extra ticks stay at the final step
        assert_eq!(ramp.advance(1.0).step, 4);
    }

    #[test]
    fn halfway_is_balanced() {
        let mut ramp = CrossfadeRamp::new(TimerId(1), 20);
        let mut step = ramp.advance(0.6);
        for _ in 1..10 {
            step = ramp.advance(0.6);
        }
        assert!((step.fade_out - 0.3).abs() < 1e-6);
        assert!((step.fade_in - 0.3).abs() < 1e-6);
        assert!(!step.finished);
    }
}
