//! Controller scenarios driven through fake output handles
//!
//! Every test runs the controller against two `FakeSink`s and a manual
//! timer, delivering handle notifications by hand so each interleaving is
//! explicit.

mod common;

use common::*;
use sekai_core::{Preferences, TrackId};
use sekai_playback::{HandleId, PlayTicket, PlayerEvent, PlayerState, TimerId};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

// ============================================================================
// Starting tracks
// ============================================================================

#[test]
fn first_play_loads_skips_intro_and_records() {
    let mut h = Harness::new();
    let list = playlist(3);
    let track = list.get(0).cloned().unwrap();
    let vocal = track.vocals[0].clone();

    h.controller.play(track, vocal, list.clone(), false).unwrap();
    assert_eq!(h.controller.state(), PlayerState::Loading);

    let events = h.events();
    let announced = events
        .iter()
        .position(|e| matches!(e, PlayerEvent::TrackChanged(now) if now.track_id == TrackId::new(1)))
        .unwrap();
    let loading = events
        .iter()
        .position(|e| matches!(e, PlayerEvent::StateChanged { state: PlayerState::Loading }))
        .unwrap();
    assert!(announced < loading);
    assert_eq!(count(&events, |e| matches!(e, PlayerEvent::MediaMetadata(_))), 1);

    // nothing is requested before metadata arrives
    assert!(h.sinks[0].state().tickets.is_empty());

    h.metadata(HandleId::A);
    assert_eq!(h.sinks[0].state().position, secs(9));
    h.accept(HandleId::A);

    assert_eq!(h.controller.state(), PlayerState::Playing);
    assert_eq!(h.controller.position(), secs(0));
    assert_eq!(h.controller.duration(), Some(secs(180)));

    let events = h.events();
    assert!(events.contains(&PlayerEvent::PlayRecorded {
        track_id: TrackId::new(1)
    }));
    assert!(events.contains(&PlayerEvent::Buffering { active: false }));
}

#[test]
fn mismatched_vocal_is_rejected() {
    let mut h = Harness::new();
    let list = playlist(2);
    let track = list.get(0).cloned().unwrap();
    let foreign = list.get(1).unwrap().vocals[0].clone();

    assert!(h.controller.play(track, foreign, list, false).is_err());
    assert_eq!(h.controller.state(), PlayerState::Idle);
}

#[test]
fn crossfade_disabled_reuses_active_handle() {
    let mut h = Harness::new();
    let list = playlist(3);
    h.play_started(&list, 0);

    let next = list.get(1).cloned().unwrap();
    let vocal = next.vocals[0].clone();
    h.controller.play(next, vocal, list.clone(), true).unwrap();

    assert_eq!(h.controller.active_handle(), HandleId::A);
    assert_eq!(h.controller.state(), PlayerState::Loading);
    assert!(h.sinks[0].state().source.as_deref().unwrap().ends_with("0002_01.mp3"));
    assert!(h.sinks[1].state().loads.is_empty());

    h.start(HandleId::A);
    assert_eq!(h.controller.state(), PlayerState::Playing);
    assert_eq!(h.timers.state().next, 0);
    assert_eq!(
        count(&h.events(), |e| matches!(e, PlayerEvent::CrossfadeStarted { .. })),
        0
    );
}

#[test]
fn same_source_is_not_reloaded() {
    let mut h = Harness::new();
    let list = playlist(1);
    h.play_started(&list, 0);

    h.controller.play_next(false).unwrap();
    assert_eq!(h.sinks[0].state().loads.len(), 1);
    // handle is already ready, so the start is requested right away
    assert_eq!(h.sinks[0].state().tickets.len(), 2);
}

#[test]
fn replaying_current_track_restarts_after_intro() {
    let mut h = Harness::new();
    let list = playlist(3);
    h.play_started(&list, 0);
    h.advance_to(HandleId::A, secs(100));

    let track = list.get(0).cloned().unwrap();
    let vocal = track.vocals[0].clone();
    h.controller.play(track, vocal, list.clone(), false).unwrap();

    {
        let a = h.sinks[0].state();
        assert_eq!(a.loads.len(), 1);
        assert_eq!(a.position, secs(9));
        assert_eq!(a.tickets.len(), 2);
    }
    h.accept(HandleId::A);
    assert_eq!(h.controller.position(), secs(0));
}

#[test]
fn autoplay_on_single_track_playlist_restarts_it() {
    let mut h = Harness::new();
    let list = playlist(1);
    h.play_started(&list, 0);
    h.events();

    h.end(HandleId::A);
    {
        let a = h.sinks[0].state();
        assert_eq!(a.loads.len(), 1);
        assert_eq!(a.position, secs(9));
    }

    h.accept(HandleId::A);
    assert_eq!(h.controller.state(), PlayerState::Playing);
    assert!(h.events().contains(&PlayerEvent::PlayRecorded {
        track_id: TrackId::new(1)
    }));
}

#[test]
fn pause_while_loading_still_records_the_play() {
    let mut h = Harness::new();
    let list = playlist(3);
    let track = list.get(1).cloned().unwrap();
    let vocal = track.vocals[0].clone();

    h.controller.play(track, vocal, list.clone(), false).unwrap();
    h.controller.pause();
    h.metadata(HandleId::A);
    assert!(h.sinks[0].state().tickets.is_empty());
    h.events();

    h.controller.resume().unwrap();
    h.accept(HandleId::A);

    assert_eq!(h.controller.state(), PlayerState::Playing);
    let events = h.events();
    assert_eq!(
        count(&events, |e| matches!(e, PlayerEvent::PlayRecorded { .. })),
        1
    );
    assert!(events.contains(&PlayerEvent::PlayRecorded {
        track_id: TrackId::new(2)
    }));

    // later pauses are plain resumes
    h.controller.pause();
    h.controller.resume().unwrap();
    h.accept(HandleId::A);
    assert_eq!(
        count(&h.events(), |e| matches!(e, PlayerEvent::PlayRecorded { .. })),
        0
    );
}

#[test]
fn stale_start_outcome_is_ignored() {
    let mut h = Harness::new();
    let list = playlist(3);
    let first = list.get(0).cloned().unwrap();
    let second = list.get(1).cloned().unwrap();

    h.controller
        .play(first.clone(), first.vocals[0].clone(), list.clone(), false)
        .unwrap();
    h.metadata(HandleId::A);
    let stale = h.sinks[0].last_ticket();

    h.controller
        .play(second.clone(), second.vocals[0].clone(), list.clone(), false)
        .unwrap();
    h.events();

    h.controller
        .handle_sink_event(HandleId::A, sekai_playback::SinkEvent::PlayStarted(stale));
    assert_eq!(h.controller.state(), PlayerState::Loading);
    assert_eq!(
        count(&h.events(), |e| matches!(e, PlayerEvent::PlayRecorded { .. })),
        0
    );

    h.start(HandleId::A);
    assert!(h.sinks[0].last_ticket() > stale);
    assert_eq!(
        h.events()
            .into_iter()
            .filter(|e| matches!(e, PlayerEvent::PlayRecorded { .. }))
            .collect::<Vec<_>>(),
        vec![PlayerEvent::PlayRecorded {
            track_id: TrackId::new(2)
        }]
    );
}

#[test]
fn rejected_start_pauses_without_recording() {
    let mut h = Harness::new();
    let list = playlist(2);
    let track = list.get(0).cloned().unwrap();
    h.controller
        .play(track.clone(), track.vocals[0].clone(), list, false)
        .unwrap();
    h.metadata(HandleId::A);
    h.reject(HandleId::A, "autoplay blocked");

    assert_eq!(h.controller.state(), PlayerState::Paused);
    let events = h.events();
    assert!(events.contains(&PlayerEvent::PlaybackFailed {
        reason: "autoplay blocked".to_string()
    }));
    assert_eq!(count(&events, |e| matches!(e, PlayerEvent::PlayRecorded { .. })), 0);

    // the track stays loaded and a later resume plays it
    h.controller.resume().unwrap();
    h.accept(HandleId::A);
    assert_eq!(h.controller.state(), PlayerState::Playing);
    assert_eq!(count(&h.events(), |e| matches!(e, PlayerEvent::PlayRecorded { .. })), 0);
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn next_wraps_around() {
    let mut h = Harness::new();
    let list = playlist(3);
    h.play_started(&list, 2);

    h.controller.play_next(false).unwrap();
    assert_eq!(h.controller.session().index(), Some(0));
    assert_eq!(h.controller.current().unwrap().track.id, TrackId::new(1));
}

#[test]
fn prev_restarts_past_threshold() {
    let mut h = Harness::new();
    let list = playlist(3);
    h.play_started(&list, 1);

    h.advance_to(HandleId::A, secs(20));
    h.controller.play_prev().unwrap();
    assert_eq!(h.controller.session().index(), Some(1));
    assert_eq!(h.sinks[0].state().position, secs(9));
}

#[test]
fn prev_goes_back_near_start() {
    let mut h = Harness::new();
    let list = playlist(3);
    h.play_started(&list, 0);

    h.advance_to(HandleId::A, secs(11));
    h.controller.play_prev().unwrap();
    assert_eq!(h.controller.session().index(), Some(2));
    assert_eq!(h.controller.current().unwrap().track.id, TrackId::new(3));
}

#[test]
fn navigation_without_playlist_fails() {
    let mut h = Harness::new();
    assert!(h.controller.play_next(false).is_err());
    assert!(h.controller.play_prev().is_err());
    assert!(h.controller.resume().is_err());
}

// ============================================================================
// Seeking
// ============================================================================

#[test]
fn seeks_use_displayed_clock() {
    let mut h = Harness::new();
    let list = playlist(1);
    h.play_started(&list, 0);

    h.controller.seek(secs(60)).unwrap();
    assert_eq!(h.sinks[0].state().position, secs(69));

    h.controller.seek_fraction(0.5).unwrap();
    assert_eq!(h.sinks[0].state().position, secs(99));

    h.controller.seek(secs(500)).unwrap();
    assert_eq!(h.sinks[0].state().position, ASSET_LENGTH);

    h.controller.seek_by(-600.0).unwrap();
    assert_eq!(h.sinks[0].state().position, secs(9));
}

#[test]
fn seek_before_metadata_is_refused() {
    let mut h = Harness::new();
    let list = playlist(1);
    let track = list.get(0).cloned().unwrap();
    h.controller
        .play(track.clone(), track.vocals[0].clone(), list, false)
        .unwrap();

    assert!(h.controller.seek_fraction(0.5).is_err());
    assert!(h.controller.preview_seek(0.5).is_none());
}

// ============================================================================
// Crossfade
// ============================================================================

#[test]
fn crossfade_ramps_and_completes() {
    let mut h = Harness::with_crossfade();
    let list = playlist(3);
    h.play_started(&list, 0);
    h.events();

    h.controller.play_next(true).unwrap();
    assert_eq!(h.controller.state(), PlayerState::Transitioning);
    assert_eq!(h.controller.active_handle(), HandleId::B);
    assert_eq!(h.sinks[1].state().gain, 0.0);

    h.start(HandleId::B);
    let events = h.events();
    assert!(events.contains(&PlayerEvent::CrossfadeStarted {
        from: HandleId::A,
        to: HandleId::B,
        duration: secs(3),
    }));
    let timers = h.timers.state().active.clone();
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].1, std::time::Duration::from_millis(150));

    h.tick(10);
    assert!(close(h.sinks[0].state().gain, 0.4));
    assert!(close(h.sinks[1].state().gain, 0.4));

    h.tick(10);
    assert_eq!(h.controller.state(), PlayerState::Playing);
    assert!(h.timers.active().is_empty());
    {
        let a = h.sinks[0].state();
        assert!(a.paused);
        assert_eq!(a.position, secs(0));
        assert!(close(a.gain, 0.8));
    }
    assert!(close(h.sinks[1].state().gain, 0.8));
    assert!(h.events().contains(&PlayerEvent::CrossfadeCompleted));
}

#[test]
fn new_play_supersedes_running_ramp() {
    let mut h = Harness::with_crossfade();
    let list = playlist(3);
    h.play_started(&list, 0);
    h.controller.play_next(true).unwrap();
    h.start(HandleId::B);
    h.tick(5);

    let third = list.get(2).cloned().unwrap();
    h.controller
        .play(third.clone(), third.vocals[0].clone(), list.clone(), true)
        .unwrap();

    // a second crossfade never starts while one runs
    assert_eq!(h.controller.active_handle(), HandleId::B);
    assert_eq!(h.controller.state(), PlayerState::Loading);
    assert!(h.timers.active().is_empty());
    assert_eq!(h.timers.state().cancelled, vec![TimerId(1)]);
    {
        let a = h.sinks[0].state();
        assert!(a.paused);
        assert_eq!(a.position, secs(0));
    }
    assert!(h.sinks[1].state().source.as_deref().unwrap().ends_with("0003_01.mp3"));

    h.events();
    h.controller.handle_timer(TimerId(1));
    assert!(!h.controller.has_pending_events());

    h.start(HandleId::B);
    h.controller.handle_timer(TimerId(1));
    assert_eq!(h.controller.state(), PlayerState::Playing);
    {
        let a = h.sinks[0].state();
        assert!(a.paused);
        assert!(close(a.gain, 0.8));
    }
    {
        let b = h.sinks[1].state();
        assert!(!b.paused);
        assert!(close(b.gain, 0.8));
    }
    assert!(h.events().contains(&PlayerEvent::PlayRecorded {
        track_id: TrackId::new(3)
    }));
}

#[test]
fn rejected_crossfade_keeps_previous_track() {
    let mut h = Harness::with_crossfade();
    let list = playlist(3);
    h.play_started(&list, 0);

    h.controller.play_next(true).unwrap();
    h.metadata(HandleId::B);
    h.reject(HandleId::B, "decode error");

    assert_eq!(h.controller.active_handle(), HandleId::A);
    assert_eq!(h.controller.state(), PlayerState::Playing);
    assert_eq!(h.controller.current().unwrap().track.id, TrackId::new(1));
    assert_eq!(h.controller.session().index(), Some(0));
    assert!(!h.sinks[0].state().paused);
    assert!(close(h.sinks[0].state().gain, 0.8));
    assert!(h.sinks[1].state().paused);

    let events = h.events();
    assert!(events.contains(&PlayerEvent::CrossfadeCompleted));
    assert!(events.contains(&PlayerEvent::PlaybackFailed {
        reason: "decode error".to_string()
    }));
}

#[test]
fn pause_finishes_crossfade() {
    let mut h = Harness::with_crossfade();
    let list = playlist(3);
    h.play_started(&list, 0);
    h.controller.play_next(true).unwrap();
    h.start(HandleId::B);
    h.tick(3);

    h.controller.pause();
    assert_eq!(h.controller.state(), PlayerState::Paused);
    assert!(h.timers.active().is_empty());
    assert!(h.sinks[0].state().paused);
    assert!(h.sinks[1].state().paused);
}

#[test]
fn volume_change_during_ramp_applies_on_next_step() {
    let mut h = Harness::with_crossfade();
    let list = playlist(3);
    h.play_started(&list, 0);
    h.controller.play_next(true).unwrap();
    h.start(HandleId::B);
    h.tick(10);

    h.controller.set_volume(0.4);
    h.tick(1);
    assert!(close(h.sinks[1].state().gain, 0.4 * 11.0 / 20.0));
    assert!(close(h.sinks[0].state().gain, 0.4 - 0.4 * 11.0 / 20.0));
}

// ============================================================================
// End of track
// ============================================================================

#[test]
fn ended_advances_with_autoplay() {
    let mut h = Harness::new();
    let list = playlist(3);
    h.play_started(&list, 0);

    h.end(HandleId::A);
    assert_eq!(h.controller.session().index(), Some(1));
    assert_eq!(h.controller.state(), PlayerState::Loading);
    assert!(h.sinks[0].state().source.as_deref().unwrap().ends_with("0002_01.mp3"));
}

#[test]
fn ended_with_repeat_replays_current() {
    let mut h = Harness::new();
    let list = playlist(3);
    h.play_started(&list, 0);
    h.controller.set_repeat(true);

    h.end(HandleId::A);
    assert_eq!(h.controller.current().unwrap().track.id, TrackId::new(1));
    assert_eq!(h.sinks[0].state().position, secs(9));
    assert_eq!(h.sinks[0].last_ticket(), PlayTicket(2));

    h.accept(HandleId::A);
    assert_eq!(h.controller.state(), PlayerState::Playing);
}

#[test]
fn ended_without_autoplay_stops() {
    let mut h = Harness::with_preferences(Preferences {
        autoplay: false,
        ..Preferences::default()
    });
    let list = playlist(3);
    h.play_started(&list, 0);

    h.end(HandleId::A);
    assert_eq!(h.controller.state(), PlayerState::Paused);
    assert_eq!(h.controller.session().index(), Some(0));
}

#[test]
fn ended_on_outgoing_handle_is_ignored() {
    let mut h = Harness::with_crossfade();
    let list = playlist(3);
    h.play_started(&list, 0);
    h.controller.play_next(true).unwrap();
    h.start(HandleId::B);

    h.end(HandleId::A);
    assert_eq!(h.controller.state(), PlayerState::Transitioning);
    assert_eq!(h.controller.session().index(), Some(1));
}

#[test]
fn auto_crossfade_near_end() {
    let mut h = Harness::with_crossfade();
    let list = playlist(3);
    h.play_started(&list, 0);

    h.advance_to(HandleId::A, secs(170));
    assert_eq!(h.controller.state(), PlayerState::Playing);

    h.advance_to(HandleId::A, secs(187));
    assert_eq!(h.controller.state(), PlayerState::Transitioning);
    assert_eq!(h.controller.active_handle(), HandleId::B);
    assert_eq!(h.controller.session().index(), Some(1));
}

#[test]
fn repeat_suppresses_auto_crossfade() {
    let mut h = Harness::with_crossfade();
    let list = playlist(3);
    h.play_started(&list, 0);
    h.controller.set_repeat(true);

    h.advance_to(HandleId::A, secs(187));
    assert_eq!(h.controller.state(), PlayerState::Playing);
    assert_eq!(h.controller.active_handle(), HandleId::A);
}

// ============================================================================
// Volume, stop and external state
// ============================================================================

#[test]
fn volume_and_mute_reach_both_handles() {
    let mut h = Harness::new();
    h.controller.set_volume_percent(50);
    assert!(close(h.sinks[0].state().gain, 0.5));
    assert!(close(h.sinks[1].state().gain, 0.5));

    h.controller.toggle_mute();
    assert!(h.sinks[0].state().muted && h.sinks[1].state().muted);
    assert!(h.events().contains(&PlayerEvent::VolumeChanged {
        level: 0.5,
        muted: true,
        indicator: sekai_playback::VolumeIndicator::Muted,
    }));
}

#[test]
fn stop_clears_current_but_keeps_playlist() {
    let mut h = Harness::new();
    let list = playlist(3);
    h.play_started(&list, 1);

    h.controller.stop();
    assert_eq!(h.controller.state(), PlayerState::Idle);
    assert!(h.controller.current().is_none());
    assert_eq!(h.controller.session().playlist().len(), 3);
    assert!(h.sinks[0].state().paused);
}

#[test]
fn external_pause_is_mirrored() {
    let mut h = Harness::new();
    let list = playlist(2);
    h.play_started(&list, 0);

    h.sinks[0].state().paused = true;
    h.controller
        .handle_sink_event(HandleId::A, sekai_playback::SinkEvent::Paused);
    assert_eq!(h.controller.state(), PlayerState::Paused);

    // inactive handle notifications never change the session
    h.controller
        .handle_sink_event(HandleId::B, sekai_playback::SinkEvent::Playing);
    assert_eq!(h.controller.state(), PlayerState::Paused);
}

#[test]
fn lyrics_request_names_current_track() {
    let mut h = Harness::new();
    assert_eq!(h.controller.request_lyrics(), None);

    let list = playlist(2);
    h.play_started(&list, 1);
    assert_eq!(h.controller.request_lyrics(), Some(TrackId::new(2)));
    assert!(h.events().contains(&PlayerEvent::LyricsRequested {
        track_id: TrackId::new(2)
    }));
}
