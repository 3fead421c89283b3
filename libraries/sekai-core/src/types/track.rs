/// Catalog track and vocal variant types
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vocal type tag used by the catalog for "story" (セカイ) versions
pub const STORY_TAG: &str = "セカイver.";

/// Vocal type tag used by the catalog for virtual-singer versions
pub const VIRTUAL_SINGER_TAG: &str = "バーチャル・シンガーver.";

/// Unit shown for tracks that carry no unit tag
pub const FALLBACK_UNIT: &str = "VIRTUAL SINGER";

/// Track identifier (catalog `id`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(u32);

impl TrackId {
    /// Create a new track ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw catalog id
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrackId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}

impl From<u32> for TrackId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Vocal variant type
///
/// The catalog stores the type as a free-form tag. Two tags carry meaning
/// for the selection policy; everything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VocalKind {
    /// Story version sung by the unit members
    Story,
    /// Virtual singer version
    VirtualSinger,
    /// Any other tag (another vocal, april fools, ...)
    Other(String),
}

impl VocalKind {
    /// Parse a catalog type tag
    ///
    /// Accepts both the catalog tags and the short English names.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            STORY_TAG | "story" => Self::Story,
            VIRTUAL_SINGER_TAG | "virtual-singer" | "virtual_singer" => Self::VirtualSinger,
            other => Self::Other(other.to_string()),
        }
    }

    /// Catalog tag for this kind
    pub fn tag(&self) -> &str {
        match self {
            Self::Story => STORY_TAG,
            Self::VirtualSinger => VIRTUAL_SINGER_TAG,
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for VocalKind {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<VocalKind> for String {
    fn from(kind: VocalKind) -> Self {
        kind.tag().to_string()
    }
}

impl fmt::Display for VocalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Alternate sung rendition of a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocalVariant {
    /// Variant type tag
    #[serde(rename = "type")]
    pub kind: VocalKind,

    /// Singer names
    ///
    /// The feed stores these either as one display string or as a list.
    #[serde(rename = "vo", default, deserialize_with = "deserialize_singers")]
    pub singers: Vec<String>,

    /// Asset identifier used to derive the audio URL
    #[serde(rename = "assetbundleName")]
    pub asset: String,
}

impl VocalVariant {
    /// Create a new vocal variant
    pub fn new(kind: VocalKind, singers: Vec<String>, asset: impl Into<String>) -> Self {
        Self {
            kind,
            singers,
            asset: asset.into(),
        }
    }

    /// Singer names joined for display
    pub fn singers_display(&self) -> String {
        self.singers.join(", ")
    }
}

fn deserialize_singers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Singers {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Singers>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Singers::One(name)) if name.is_empty() => Vec::new(),
        Some(Singers::One(name)) => vec![name],
        Some(Singers::Many(names)) => names,
    })
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique catalog id
    pub id: TrackId,

    /// Song title
    pub title: String,

    /// Reading of the title (used for search)
    #[serde(default)]
    pub pronunciation: String,

    /// Composer
    #[serde(default)]
    pub composer: String,

    /// Lyricist
    #[serde(default)]
    pub lyricist: String,

    /// Arranger
    #[serde(default)]
    pub arranger: String,

    /// Asset identifier used to derive the artwork URL
    #[serde(rename = "assetbundleName")]
    pub asset: String,

    /// Duration in seconds, when the feed provides it
    #[serde(default)]
    pub duration: Option<f64>,

    /// Ordered unit tags
    #[serde(rename = "unit", default)]
    pub units: Vec<String>,

    /// Ordered vocal variants
    #[serde(default)]
    pub vocals: Vec<VocalVariant>,

    /// Whether the song was written for the game
    #[serde(rename = "isNewlyWrittenMusic", default)]
    pub newly_written: bool,
}

impl Track {
    /// Create a track with the minimal fields set
    pub fn new(id: u32, title: impl Into<String>, asset: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(id),
            title: title.into(),
            pronunciation: String::new(),
            composer: String::new(),
            lyricist: String::new(),
            arranger: String::new(),
            asset: asset.into(),
            duration: None,
            units: Vec::new(),
            vocals: Vec::new(),
            newly_written: false,
        }
    }

    /// Add a unit tag (builder style)
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.units.push(unit.into());
        self
    }

    /// Add a vocal variant (builder style)
    pub fn with_vocal(mut self, vocal: VocalVariant) -> Self {
        self.vocals.push(vocal);
        self
    }

    /// First unit tag, used for theming
    pub fn primary_unit(&self) -> &str {
        self.units.first().map_or(FALLBACK_UNIT, String::as_str)
    }

    /// Whether the given variant belongs to this track
    pub fn has_vocal(&self, vocal: &VocalVariant) -> bool {
        self.vocals.iter().any(|v| v.asset == vocal.asset)
    }

    /// Find a variant by asset identifier
    pub fn vocal_by_asset(&self, asset: &str) -> Option<&VocalVariant> {
        self.vocals.iter().find(|v| v.asset == asset)
    }

    /// Artist line shown by the OS now-playing UI
    ///
    /// Singers of the variant, falling back to the composer.
    pub fn artist_line(&self, vocal: &VocalVariant) -> String {
        if !vocal.singers.is_empty() {
            vocal.singers_display()
        } else if !self.composer.is_empty() {
            self.composer.clone()
        } else {
            "Unknown".to_string()
        }
    }

    /// Case-insensitive search over the text fields
    ///
    /// `needle` must already be lowercase.
    pub fn matches_query(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }

        let fields = [
            self.title.as_str(),
            self.pronunciation.as_str(),
            self.composer.as_str(),
            self.lyricist.as_str(),
            self.arranger.as_str(),
        ];

        fields
            .into_iter()
            .chain(self.units.iter().map(String::as_str))
            .chain(
                self.vocals
                    .iter()
                    .flat_map(|v| v.singers.iter().map(String::as_str)),
            )
            .any(|field| field.to_lowercase().contains(needle))
    }
}
