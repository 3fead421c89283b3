//! Prefetch of upcoming playlist entries

use sekai_core::{preferred_vocal, AssetUrls, Playlist, VocalPriority};

/// Background fetcher warming assets before they are needed
///
/// Fire-and-forget: implementations must return immediately and swallow
/// their own failures.
pub trait AssetPreloader: Send + Sync {
    fn preload(&self, urls: Vec<String>);
}

/// Preloader that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPreloader;

impl AssetPreloader for NoopPreloader {
    fn preload(&self, _urls: Vec<String>) {}
}

/// Audio and jacket URLs of up to `count` entries starting at `index`
///
/// Walks forward with wraparound and stops when it comes back to `index`.
/// Each entry contributes the audio of the variant picked by the vocal
/// policy (if any) followed by its jacket.
pub fn preload_window(
    playlist: &Playlist,
    index: usize,
    count: usize,
    priority: VocalPriority,
    urls: &AssetUrls,
) -> Vec<String> {
    let len = playlist.len();
    if len == 0 {
        return Vec::new();
    }
    let start = index % len;

    (0..count.min(len))
        .filter_map(|offset| playlist.get((start + offset) % len))
        .flat_map(|track| {
            let audio = preferred_vocal(track, priority).map(|vocal| urls.vocal_audio(vocal));
            audio.into_iter().chain(std::iter::once(urls.track_jacket(track)))
        })
        .collect()
}
