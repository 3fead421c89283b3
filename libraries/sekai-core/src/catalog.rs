//! Catalog store
//!
//! Holds the immutable track list loaded from the catalog feed and the
//! current filtered view. The view is what the grid shows and what a play
//! call snapshots as its playlist.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::error::{CoreError, Result};
use crate::types::{Track, TrackId};

/// Immutable ordered track list shared between the catalog and playback
///
/// Cloning is cheap; the tracks themselves are never copied.
#[derive(Debug, Clone, Default)]
pub struct Playlist(Arc<[Arc<Track>]>);

impl Playlist {
    /// Create from an ordered list of tracks
    pub fn new(tracks: Vec<Arc<Track>>) -> Self {
        Self(tracks.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<&Arc<Track>> {
        self.0.get(index)
    }

    /// Index of the first entry with `id`
    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.0.iter().position(|t| t.id == id)
    }

    /// Iterate over the entries in order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Track>> {
        self.0.iter()
    }
}

impl FromIterator<Arc<Track>> for Playlist {
    fn from_iter<I: IntoIterator<Item = Arc<Track>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Grid filter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogFilter {
    /// Every track
    #[default]
    All,
    /// Tracks marked as favorite
    Favorites,
    /// Tracks carrying the unit tag
    Unit(String),
}

impl CatalogFilter {
    /// Parse a filter chip identifier (`all`, `favorites` or a unit tag)
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "all" => Self::All,
            "favorites" => Self::Favorites,
            unit => Self::Unit(unit.to_string()),
        }
    }
}

/// Grid ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Catalog order
    #[default]
    Default,
    /// Newly written songs first, catalog order otherwise
    NewlyWrittenFirst,
}

impl SortMode {
    /// Parse a sort identifier (`newly_written` or anything else)
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "newly_written" => Self::NewlyWrittenFirst,
            _ => Self::Default,
        }
    }
}

/// What the view is built from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewContext {
    /// The full catalog with filter, search and sort applied
    #[default]
    All,
    /// A saved playlist's items in playlist order
    Playlist {
        /// Saved playlist id
        id: String,
        /// Saved playlist name
        name: String,
    },
}

/// Catalog of tracks plus the current filtered view
#[derive(Debug, Default)]
pub struct CatalogStore {
    tracks: Vec<Arc<Track>>,
    by_id: HashMap<TrackId, usize>,
    filter: CatalogFilter,
    query: String,
    sort: SortMode,
    context: ViewContext,
    favorites: HashSet<TrackId>,
    view: Vec<Arc<Track>>,
}

impl CatalogStore {
    /// Build the store from catalog tracks
    ///
    /// Duplicate ids are rejected since every lookup is keyed by id.
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(tracks.len());
        for (index, track) in tracks.iter().enumerate() {
            if by_id.insert(track.id, index).is_some() {
                return Err(CoreError::invalid_catalog(format!(
                    "duplicate track id {}",
                    track.id
                )));
            }
        }

        let tracks: Vec<Arc<Track>> = tracks.into_iter().map(Arc::new).collect();
        let view = tracks.clone();
        Ok(Self {
            tracks,
            by_id,
            view,
            ..Self::default()
        })
    }

    /// Parse the catalog feed document
    pub fn from_json(json: &str) -> Result<Self> {
        let tracks: Vec<Track> = serde_json::from_str(json)?;
        Self::new(tracks)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Every track in catalog order
    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    /// Look up a track by id
    pub fn get(&self, id: TrackId) -> Option<&Arc<Track>> {
        self.by_id.get(&id).map(|&index| &self.tracks[index])
    }

    /// Whether the catalog has a track with `id`
    pub fn contains(&self, id: TrackId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Resolve ids against the catalog, dropping unknown ones
    pub fn resolve(&self, ids: &[TrackId]) -> Vec<Arc<Track>> {
        ids.iter().filter_map(|id| self.get(*id).cloned()).collect()
    }

    /// Distinct unit tags in first-seen order
    pub fn units(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tracks
            .iter()
            .flat_map(|t| t.units.iter())
            .filter(|unit| seen.insert(unit.as_str()))
            .cloned()
            .collect()
    }

    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    pub fn context(&self) -> &ViewContext {
        &self.context
    }

    /// Change the filter chip
    pub fn set_filter(&mut self, filter: CatalogFilter) {
        self.filter = filter;
        self.refilter();
    }

    /// Change the search query
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    /// Change the sort mode
    pub fn set_sort_mode(&mut self, sort: SortMode) {
        self.sort = sort;
        self.refilter();
    }

    /// Replace the favorite set used by [`CatalogFilter::Favorites`]
    pub fn set_favorites(&mut self, favorites: impl IntoIterator<Item = TrackId>) {
        self.favorites = favorites.into_iter().collect();
        if self.filter == CatalogFilter::Favorites {
            self.refilter();
        }
    }

    /// Show a saved playlist instead of the filtered catalog
    ///
    /// The search query is cleared; unknown ids are dropped from the view.
    pub fn enter_playlist(&mut self, id: impl Into<String>, name: impl Into<String>, items: &[TrackId]) {
        self.context = ViewContext::Playlist {
            id: id.into(),
            name: name.into(),
        };
        self.query.clear();
        self.view = self.resolve(items);
        debug!(tracks = self.view.len(), "Switched view to playlist");
    }

    /// Re-resolve the playlist view after its items changed
    ///
    /// Ignored unless the view currently shows playlist `id`.
    pub fn refresh_playlist(&mut self, id: &str, items: &[TrackId]) {
        if matches!(&self.context, ViewContext::Playlist { id: current, .. } if current == id) {
            self.view = self.resolve(items);
        }
    }

    /// Return to the full catalog with the filter reset to all
    pub fn leave_playlist(&mut self) {
        self.context = ViewContext::All;
        self.filter = CatalogFilter::All;
        self.refilter();
    }

    /// Whether the view shows playlist `id`
    pub fn is_showing_playlist(&self, id: &str) -> bool {
        matches!(&self.context, ViewContext::Playlist { id: current, .. } if current == id)
    }

    /// Current view
    pub fn view(&self) -> &[Arc<Track>] {
        &self.view
    }

    /// Snapshot of the current view for a playback session
    pub fn snapshot(&self) -> Playlist {
        self.view.iter().cloned().collect()
    }

    fn refilter(&mut self) {
        if self.context != ViewContext::All {
            return;
        }

        let needle = self.query.trim().to_lowercase();
        let mut view: Vec<Arc<Track>> = self
            .tracks
            .iter()
            .filter(|track| match &self.filter {
                CatalogFilter::All => true,
                CatalogFilter::Favorites => self.favorites.contains(&track.id),
                CatalogFilter::Unit(unit) => track.units.iter().any(|u| u == unit),
            })
            .filter(|track| track.matches_query(&needle))
            .cloned()
            .collect();

        if self.sort == SortMode::NewlyWrittenFirst {
            // stable: catalog order within each group
            view.sort_by_key(|track| !track.newly_written);
        }

        self.view = view;
    }
}
