/// User preference types shared by the store and the playback controller
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vocal variant priority
///
/// Serialized with the identifiers used in persisted settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VocalPriority {
    /// First variant in catalog order
    #[serde(rename = "default")]
    Default,

    /// Story version, then anything that is not a virtual-singer version
    #[default]
    #[serde(rename = "sekai", alias = "story")]
    PreferStory,

    /// Virtual-singer version
    #[serde(rename = "virtual_singer", alias = "virtual-singer")]
    PreferVirtualSinger,
}

impl VocalPriority {
    /// Persisted identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PreferStory => "sekai",
            Self::PreferVirtualSinger => "virtual_singer",
        }
    }
}

impl fmt::Display for VocalPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Vocal variant priority
    #[serde(default)]
    pub vocal_priority: VocalPriority,

    /// Continue with the next track when one ends
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,

    /// Crossfade between consecutive tracks
    #[serde(default)]
    pub crossfade: bool,

    /// Crossfade length in seconds
    #[serde(default = "default_crossfade_duration")]
    pub crossfade_duration: f64,

    /// Output volume (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_autoplay() -> bool {
    true
}

fn default_crossfade_duration() -> f64 {
    3.0
}

fn default_volume() -> f32 {
    0.8
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            vocal_priority: VocalPriority::default(),
            autoplay: default_autoplay(),
            crossfade: false,
            crossfade_duration: default_crossfade_duration(),
            volume: default_volume(),
        }
    }
}

impl Preferences {
    /// Clamp values that came from outside into their valid ranges
    pub fn sanitized(mut self) -> Self {
        if !self.crossfade_duration.is_finite() || self.crossfade_duration <= 0.0 {
            self.crossfade_duration = default_crossfade_duration();
        }
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            default_volume()
        };
        self
    }
}

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark theme (first launch)
    #[default]
    Dark,
    /// Light theme
    Light,
}

impl Theme {
    /// Persisted identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Parse a persisted identifier, falling back to dark
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "light" => Self::Light,
            _ => Self::Dark,
        }
    }

    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}
