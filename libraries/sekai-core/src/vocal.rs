//! Vocal variant selection policy

use crate::types::{Track, VocalKind, VocalPriority, VocalVariant};

/// Pick the variant to play for `track` under `priority`
///
/// Pure function of its inputs. Returns `None` only for tracks without
/// any vocal variant. A single-variant track always yields that variant.
///
/// - `Default`: first variant in catalog order
/// - `PreferStory`: first story variant, else first variant that is not a
///   virtual-singer one, else the first variant
/// - `PreferVirtualSinger`: first virtual-singer variant, else the first
pub fn preferred_vocal(track: &Track, priority: VocalPriority) -> Option<&VocalVariant> {
    let first = track.vocals.first()?;
    if track.vocals.len() == 1 {
        return Some(first);
    }

    let chosen = match priority {
        VocalPriority::Default => None,
        VocalPriority::PreferStory => track
            .vocals
            .iter()
            .find(|v| v.kind == VocalKind::Story)
            .or_else(|| {
                track
                    .vocals
                    .iter()
                    .find(|v| v.kind != VocalKind::VirtualSinger)
            }),
        VocalPriority::PreferVirtualSinger => track
            .vocals
            .iter()
            .find(|v| v.kind == VocalKind::VirtualSinger),
    };

    Some(chosen.unwrap_or(first))
}
