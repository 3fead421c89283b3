//! Intro-skip timeline math
//!
//! Every asset starts with a fixed region that is never played. Users only
//! ever see positions relative to the end of that region; handles only ever
//! receive raw positions. This module is the single place that converts
//! between the two clocks.

use std::time::Duration;

/// Raw/displayed position converter for one fixed intro offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroSkip {
    offset: Duration,
}

/// Result of mapping a progress bar fraction onto a track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekTarget {
    /// Fraction of the displayed duration, 0-100
    pub percent: f64,
    /// Position to show
    pub displayed: Duration,
    /// Position to commit to the handle
    pub raw: Duration,
}

impl IntroSkip {
    pub fn new(offset: Duration) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }

    /// `max(0, raw - offset)`
    pub fn displayed_position(&self, raw: Duration) -> Duration {
        raw.saturating_sub(self.offset)
    }

    /// `max(0, raw_duration - offset)`
    pub fn displayed_duration(&self, raw_duration: Duration) -> Duration {
        raw_duration.saturating_sub(self.offset)
    }

    /// Raw position for a displayed one, never inside the intro
    ///
    /// When the raw duration is known the target is clamped to it.
    pub fn raw_seek_target(&self, displayed: Duration, raw_duration: Option<Duration>) -> Duration {
        let target = displayed.saturating_add(self.offset).max(self.offset);
        match raw_duration {
            Some(end) => target.min(end.max(self.offset)),
            None => target,
        }
    }

    /// Whether a raw position still lies inside the intro (within `tolerance`)
    pub fn is_in_intro(&self, raw: Duration, tolerance: Duration) -> bool {
        raw < self.offset.saturating_sub(tolerance)
    }

    /// Displayed progress in percent (0 when the duration is unknown or empty)
    pub fn percent(&self, raw: Duration, raw_duration: Option<Duration>) -> f64 {
        let Some(total) = raw_duration.map(|d| self.displayed_duration(d)) else {
            return 0.0;
        };
        if total.is_zero() {
            return 0.0;
        }
        let shown = self.displayed_position(raw).min(total);
        shown.as_secs_f64() / total.as_secs_f64() * 100.0
    }

    /// Buffered range in displayed percent, clamped to 0-100
    pub fn buffered_percent(&self, buffered_end: Duration, raw_duration: Option<Duration>) -> f64 {
        self.percent(buffered_end, raw_duration).clamp(0.0, 100.0)
    }

    /// Map a progress bar fraction (clamped to 0-1) to a seek target
    ///
    /// Returns `None` while the duration is unknown or zero.
    pub fn seek_from_fraction(&self, fraction: f64, raw_duration: Option<Duration>) -> Option<SeekTarget> {
        let raw_duration = raw_duration.filter(|d| !d.is_zero())?;
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };

        let displayed = self.displayed_duration(raw_duration).mul_f64(fraction);
        Some(SeekTarget {
            percent: fraction * 100.0,
            displayed,
            raw: self.raw_seek_target(displayed, Some(raw_duration)),
        })
    }

    /// Move a raw position by a signed number of seconds
    ///
    /// Backward moves stop at the end of the intro, forward moves at the
    /// raw duration when it is known.
    pub fn nudge(&self, raw: Duration, delta_secs: f64, raw_duration: Option<Duration>) -> Duration {
        if !delta_secs.is_finite() {
            return raw;
        }
        let step = Duration::from_secs_f64(delta_secs.abs());
        let moved = if delta_secs < 0.0 {
            raw.saturating_sub(step).max(self.offset)
        } else {
            raw.saturating_add(step)
        };
        match raw_duration {
            Some(end) => moved.min(end.max(self.offset)),
            None => moved,
        }
    }
}

impl Default for IntroSkip {
    fn default() -> Self {
        Self::new(Duration::from_secs(9))
    }
}
