mod lyrics;
mod preferences;
mod track;

pub use lyrics::{Lyrics, LyricsEntry};
pub use preferences::{Preferences, Theme, VocalPriority};
pub use track::{
    Track, TrackId, VocalKind, VocalVariant, FALLBACK_UNIT, STORY_TAG, VIRTUAL_SINGER_TAG,
};
