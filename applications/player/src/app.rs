//! Player facade
//!
//! Ties the catalog, persisted state, playback controller and asset cache
//! together. The host owns the audio handles and timers and forwards their
//! callbacks here; UI-facing state comes out of [`Player::drain_events`].

use std::sync::Arc;

use sekai_cache::AssetCache;
use sekai_core::{CatalogStore, CoreError, Lyrics, Preferences, Theme, TrackId};
use sekai_playback::{
    AudioSink, Gesture, HandleId, Key, MediaAction, PlaybackController, PlayerEvent, Scheduler,
    SinkEvent, TimerId, TransportAdapter,
};
use sekai_storage::{
    favorites, playlists, settings, stats, PreferenceStore, RankedTrack, SavedPlaylist,
    StorageError,
};
use tracing::{debug, warn};

use crate::config::PlayerConfig;
use crate::error::{PlayerError, Result};

/// Everything the player needs besides its audio backend
pub struct PlayerParts {
    pub catalog: CatalogStore,
    pub lyrics: Lyrics,
    pub store: PreferenceStore,
    pub cache: Option<AssetCache>,
}

pub struct Player {
    catalog: CatalogStore,
    lyrics: Lyrics,
    store: PreferenceStore,
    controller: PlaybackController,
    transport: TransportAdapter,
    cache: Option<AssetCache>,
}

impl Player {
    /// Build a player driving `sinks` as handles A and B
    ///
    /// Stored settings and favorites are applied before the first play.
    pub fn new(
        config: &PlayerConfig,
        sinks: [Box<dyn AudioSink>; 2],
        scheduler: Box<dyn Scheduler>,
        parts: PlayerParts,
    ) -> Result<Self> {
        let PlayerParts {
            mut catalog,
            lyrics,
            store,
            cache,
        } = parts;

        let prefs = settings::load(&store)?;
        let favorites = favorites::load(&store)?;
        catalog.set_favorites(favorites.list().iter().copied());

        let mut controller = PlaybackController::new(sinks, scheduler, config.playback_config())
            .with_asset_urls(config.asset_urls())
            .with_preferences(prefs);
        if let Some(cache) = &cache {
            controller = controller.with_preloader(Arc::new(cache.clone()));
        }

        Ok(Self {
            catalog,
            lyrics,
            store,
            controller,
            transport: TransportAdapter::new(),
            cache,
        })
    }

    // ===== Playback =====

    /// Play a track picked from the current view
    ///
    /// With `vocal_asset` unset the preferred variant is chosen. The view
    /// at this moment becomes the session playlist.
    pub fn play(&mut self, id: TrackId, vocal_asset: Option<&str>) -> Result<()> {
        let track = self
            .catalog
            .get(id)
            .cloned()
            .ok_or(PlayerError::TrackNotFound(id))?;
        let playlist = self.catalog.snapshot();

        match vocal_asset {
            Some(asset) => {
                let vocal = track
                    .vocal_by_asset(asset)
                    .cloned()
                    .ok_or_else(|| CoreError::VocalMismatch {
                        track: id,
                        asset: asset.to_string(),
                    })?;
                self.controller.play(track, vocal, playlist, false)?;
            }
            None => self.controller.play_preferred(track, playlist, false)?,
        }
        Ok(())
    }

    pub fn gesture(&mut self, gesture: Gesture) -> Result<()> {
        self.transport.gesture(&mut self.controller, gesture)?;
        Ok(())
    }

    /// Handle a keyboard shortcut by its key code; returns whether it was consumed
    pub fn key(&mut self, code: &str, text_field_focused: bool) -> Result<bool> {
        let Some(key) = Key::from_code(code) else {
            return Ok(false);
        };
        Ok(self
            .transport
            .key(&mut self.controller, key, text_field_focused)?)
    }

    pub fn media_action(&mut self, action: MediaAction) -> Result<()> {
        self.transport.media_action(&mut self.controller, action)?;
        Ok(())
    }

    pub fn handle_sink_event(&mut self, handle: HandleId, event: SinkEvent) {
        self.controller.handle_sink_event(handle, event);
    }

    pub fn handle_timer(&mut self, timer: TimerId) {
        self.controller.handle_timer(timer);
    }

    /// Take pending UI events, counting started tracks as plays
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        let events = self
            .transport
            .filter_events(self.controller.drain_events());

        for event in &events {
            if let PlayerEvent::PlayRecorded { track_id } = event {
                match stats::record_play(&self.store, *track_id) {
                    Ok(_) => debug!(track = %track_id, "Play recorded"),
                    Err(e) => warn!(track = %track_id, error = %e, "Failed to record play"),
                }
            }
        }
        events
    }

    // ===== Settings =====

    /// Change and persist the settings, then apply them to playback
    ///
    /// The stored volume is a startup value only; the live volume is
    /// left as it is.
    pub fn update_settings<F>(&mut self, change: F) -> Result<Preferences>
    where
        F: FnOnce(&mut Preferences),
    {
        let prefs = settings::update(&self.store, change)?;
        self.controller.set_preferences(prefs.clone());
        Ok(prefs)
    }

    pub fn theme(&self) -> Result<Theme> {
        Ok(settings::theme(&self.store)?)
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        Ok(settings::toggle_theme(&self.store)?)
    }

    // ===== Library =====

    /// Toggle a favorite; returns whether the track is now a favorite
    pub fn toggle_favorite(&mut self, id: TrackId) -> Result<bool> {
        let added = favorites::toggle(&self.store, id)?;
        let favorites = favorites::load(&self.store)?;
        self.catalog.set_favorites(favorites.list().iter().copied());
        Ok(added)
    }

    pub fn is_favorite(&self, id: TrackId) -> Result<bool> {
        Ok(favorites::load(&self.store)?.contains(id))
    }

    /// Lyrics of a track, if published
    pub fn lyrics(&self, id: TrackId) -> Option<&[String]> {
        self.lyrics.get(id)
    }

    /// Lyrics of the current track
    pub fn current_lyrics(&self) -> Option<&[String]> {
        let current = self.controller.current()?;
        self.lyrics.get(current.track.id)
    }

    /// Most played tracks, best first
    pub fn ranking(&self, limit: usize) -> Result<Vec<RankedTrack>> {
        Ok(stats::load(&self.store)?.ranking(limit))
    }

    /// Recently played tracks, newest first
    pub fn history(&self, limit: usize) -> Result<Vec<TrackId>> {
        Ok(stats::load(&self.store)?.history(limit))
    }

    // ===== Playlists =====

    pub fn create_playlist(&mut self, name: &str, initial: &[TrackId]) -> Result<SavedPlaylist> {
        let mut book = playlists::load(&self.store)?;
        let catalog = &self.catalog;
        let created = book.create(name, initial, |id| catalog.contains(id))?.clone();
        playlists::save(&self.store, &book)?;
        Ok(created)
    }

    /// Create a playlist from a pasted id list such as `"1, 74 12"`
    pub fn import_playlist(&mut self, name: &str, ids: &str) -> Result<SavedPlaylist> {
        self.create_playlist(name, &playlists::parse_id_string(ids))
    }

    pub fn export_playlist(&self, id: &str) -> Result<String> {
        Ok(playlists::load(&self.store)?.export_ids(id)?)
    }

    /// Add a track; returns `false` when it was already in the playlist
    pub fn add_to_playlist(&mut self, id: &str, track: TrackId) -> Result<bool> {
        let mut book = playlists::load(&self.store)?;
        let added = book.add(id, track)?;
        if added {
            playlists::save(&self.store, &book)?;
            self.refresh_playlist_view(&book, id);
        }
        Ok(added)
    }

    pub fn remove_from_playlist(&mut self, id: &str, track: TrackId) -> Result<bool> {
        let mut book = playlists::load(&self.store)?;
        let removed = book.remove(id, track)?;
        if removed {
            playlists::save(&self.store, &book)?;
            self.refresh_playlist_view(&book, id);
        }
        Ok(removed)
    }

    pub fn delete_playlist(&mut self, id: &str) -> Result<()> {
        let mut book = playlists::load(&self.store)?;
        book.delete(id)?;
        playlists::save(&self.store, &book)?;
        if self.catalog.is_showing_playlist(id) {
            self.catalog.leave_playlist();
        }
        Ok(())
    }

    /// Show a saved playlist in the catalog view
    pub fn open_playlist(&mut self, id: &str) -> Result<()> {
        let book = playlists::load(&self.store)?;
        let playlist = book
            .get(id)
            .ok_or_else(|| StorageError::not_found("Playlist", id))?;
        self.catalog
            .enter_playlist(&playlist.id, &playlist.name, &playlist.items);
        Ok(())
    }

    /// Return the view to the full catalog
    pub fn show_all(&mut self) {
        self.catalog.leave_playlist();
    }

    fn refresh_playlist_view(&mut self, book: &sekai_storage::PlaylistBook, id: &str) {
        if let Some(playlist) = book.get(id) {
            self.catalog.refresh_playlist(id, &playlist.items);
        }
    }

    // ===== Accessors =====

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Catalog view controls (filter, search, sort)
    pub fn catalog_mut(&mut self) -> &mut CatalogStore {
        &mut self.catalog
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn cache(&self) -> Option<&AssetCache> {
        self.cache.as_ref()
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("tracks", &self.catalog.len())
            .field("state", &self.controller.state())
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}
