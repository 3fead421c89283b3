//! Player settings and theme
//!
//! ```rust
//! use sekai_storage::{settings, PreferenceStore};
//! use sekai_core::Theme;
//!
//! let store = PreferenceStore::in_memory();
//! assert_eq!(settings::theme(&store)?, Theme::Dark);
//! assert_eq!(settings::toggle_theme(&store)?, Theme::Light);
//! # Ok::<(), sekai_storage::StorageError>(())
//! ```

use sekai_core::{Preferences, Theme};

use crate::error::Result;
use crate::store::PreferenceStore;

/// Settings document key
pub const SETTINGS_KEY: &str = "sekai_settings";

/// Theme key
pub const THEME_KEY: &str = "theme";

/// Load settings, falling back to defaults for absent or invalid fields
pub fn load(store: &PreferenceStore) -> Result<Preferences> {
    let prefs: Preferences = store.load_or_default(SETTINGS_KEY)?;
    Ok(prefs.sanitized())
}

pub fn save(store: &PreferenceStore, prefs: &Preferences) -> Result<()> {
    store.save(SETTINGS_KEY, &prefs.clone().sanitized())
}

/// Apply `change` to the stored settings and persist the result
pub fn update<F>(store: &PreferenceStore, change: F) -> Result<Preferences>
where
    F: FnOnce(&mut Preferences),
{
    let mut prefs = load(store)?;
    change(&mut prefs);
    let prefs = prefs.sanitized();
    save(store, &prefs)?;
    Ok(prefs)
}

pub fn theme(store: &PreferenceStore) -> Result<Theme> {
    store.load_or_default(THEME_KEY)
}

pub fn set_theme(store: &PreferenceStore, theme: Theme) -> Result<()> {
    store.save(THEME_KEY, &theme)
}

/// Flip between dark and light, returning the new theme
pub fn toggle_theme(store: &PreferenceStore) -> Result<Theme> {
    let next = theme(store)?.toggled();
    set_theme(store, next)?;
    Ok(next)
}
