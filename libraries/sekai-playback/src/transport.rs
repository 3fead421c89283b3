//! Transport UI adapter
//!
//! Maps pointer gestures, keyboard shortcuts and OS media-session actions
//! onto controller operations. The adapter only owns the seek-drag state;
//! everything else lives in the controller.

use std::time::Duration;

use tracing::debug;

use crate::controller::PlaybackController;
use crate::error::{PlaybackError, Result};
use crate::events::PlayerEvent;

/// Pointer gesture on the transport bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    TogglePlay,
    Next,
    Previous,
    ToggleRepeat,
    ToggleShuffle,
    /// Volume slider, 0-100
    SetVolume(u8),
    ToggleMute,
    /// Click on the progress bar at a fraction of its width
    SeekClick(f64),
    DragStart,
    DragMove(f64),
    DragEnd(f64),
    Lyrics,
}

/// Keyboard shortcut key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    M,
    L,
}

impl Key {
    /// Parse a physical key code (`Space`, `ArrowLeft`, `KeyM`, ...)
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Space" => Some(Self::Space),
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            "ArrowUp" => Some(Self::ArrowUp),
            "ArrowDown" => Some(Self::ArrowDown),
            "KeyM" => Some(Self::M),
            "KeyL" => Some(Self::L),
            _ => None,
        }
    }
}

/// OS media-session action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaAction {
    Play,
    Pause,
    PreviousTrack,
    NextTrack,
    /// Target position on the displayed clock
    SeekTo(Duration),
}

/// Transport UI adapter
#[derive(Debug, Default)]
pub struct TransportAdapter {
    dragging: bool,
}

impl TransportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a seek drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Apply a pointer gesture
    pub fn gesture(&mut self, controller: &mut PlaybackController, gesture: Gesture) -> Result<()> {
        match gesture {
            Gesture::TogglePlay => controller.toggle_play_pause(),
            Gesture::Next => controller.play_next(true),
            Gesture::Previous => controller.play_prev(),
            Gesture::ToggleRepeat => {
                controller.toggle_repeat();
                Ok(())
            }
            Gesture::ToggleShuffle => {
                controller.toggle_shuffle();
                Ok(())
            }
            Gesture::SetVolume(percent) => {
                controller.set_volume_percent(percent);
                Ok(())
            }
            Gesture::ToggleMute => {
                controller.toggle_mute();
                Ok(())
            }
            Gesture::SeekClick(fraction) => ignore_no_media(controller.seek_fraction(fraction)),
            Gesture::DragStart => {
                self.dragging = true;
                Ok(())
            }
            Gesture::DragMove(fraction) => {
                if self.dragging {
                    controller.preview_seek(fraction);
                }
                Ok(())
            }
            Gesture::DragEnd(fraction) => {
                if !self.dragging {
                    return Ok(());
                }
                self.dragging = false;
                ignore_no_media(controller.seek_fraction(fraction))
            }
            Gesture::Lyrics => {
                controller.request_lyrics();
                Ok(())
            }
        }
    }

    /// Apply a keyboard shortcut; returns whether the key was consumed
    ///
    /// Keys typed into a text field are never shortcuts.
    pub fn key(
        &mut self,
        controller: &mut PlaybackController,
        key: Key,
        text_field_focused: bool,
    ) -> Result<bool> {
        if text_field_focused {
            return Ok(false);
        }

        let seek_step = controller.config().key_seek_step.as_secs_f64();
        let volume_step = i32::from(controller.config().key_volume_step);
        match key {
            Key::Space => controller.toggle_play_pause()?,
            Key::ArrowLeft => ignore_no_media(controller.seek_by(-seek_step))?,
            Key::ArrowRight => ignore_no_media(controller.seek_by(seek_step))?,
            Key::ArrowUp => controller.step_volume(volume_step),
            Key::ArrowDown => controller.step_volume(-volume_step),
            Key::M => controller.toggle_mute(),
            Key::L => {
                controller.request_lyrics();
            }
        }
        Ok(true)
    }

    /// Apply an OS media-session action
    pub fn media_action(
        &mut self,
        controller: &mut PlaybackController,
        action: MediaAction,
    ) -> Result<()> {
        debug!(action = ?action, "Media session action");
        match action {
            MediaAction::Play => controller.resume(),
            MediaAction::Pause => {
                controller.pause();
                Ok(())
            }
            MediaAction::PreviousTrack => controller.play_prev(),
            MediaAction::NextTrack => controller.play_next(false),
            MediaAction::SeekTo(position) => ignore_no_media(controller.seek(position)),
        }
    }

    /// Drop progress updates while a drag owns the progress bar
    pub fn filter_events(&self, events: Vec<PlayerEvent>) -> Vec<PlayerEvent> {
        if !self.dragging {
            return events;
        }
        events
            .into_iter()
            .filter(|e| !matches!(e, PlayerEvent::Progress { .. }))
            .collect()
    }
}

/// Seeking with nothing loaded, or before metadata is known, is a no-op
fn ignore_no_media(result: Result<()>) -> Result<()> {
    match result {
        Err(PlaybackError::NoTrackLoaded | PlaybackError::DurationUnknown) => Ok(()),
        other => other,
    }
}
