// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{cell::RefCell, collections::HashSet, rc::Rc, sync::mpsc};

use proptest::prelude::*;

use super::*;
use crate::{
    model::fixtures::{track, tracks},
    player::testing::{Call, FakeBackend},
};

fn sequencer(ids: &[&str]) -> (Sequencer, FakeBackend) {
    let backend = FakeBackend::default();
    let player = AudioPlayer::new(Box::new(backend.clone()), 1.0, false);
    let mut sequencer = Sequencer::new(player);
    if !ids.is_empty() {
        sequencer.load_catalog(tracks(ids));
    }
    (sequencer, backend)
}

/// Delivers `event` as a notification about the currently attached source.
fn deliver(sequencer: &mut Sequencer, event: PlayerEvent) -> &PlayerState {
    let generation = sequencer.player().generation();
    sequencer.handle_player_event(generation, event)
}

fn numbered(len: usize) -> Vec<String> {
    (0..len).map(|i| format!("t{i}")).collect()
}

fn current(sequencer: &Sequencer) -> Option<&str> {
    sequencer.state().current_track_id.as_deref()
}

fn last_call(backend: &FakeBackend) -> Option<Call> {
    backend.recorder.borrow().calls.last().cloned()
}

fn loads_of(backend: &FakeBackend, source: &str) -> usize {
    backend
        .recorder
        .borrow()
        .calls
        .iter()
        .filter(|call| **call == Call::Load(source.to_string()))
        .count()
}

#[derive(Clone, Default)]
struct Recording(Rc<RefCell<Vec<PlayerState>>>);

impl PlaybackObserver for Recording {
    fn on_state_changed(&self, state: &PlayerState) {
        self.0.borrow_mut().push(state.clone());
    }
}

#[test]
fn catalog_load_cues_the_first_track_paused() {
    let (sequencer, backend) = sequencer(&["a", "b", "c"]);

    assert_eq!(current(&sequencer), Some("a"));
    assert!(!sequencer.state().is_playing);
    assert_eq!(backend.recorder.borrow().attached(), Some("/music/a.mp3"));
    assert!(
        !backend
            .recorder
            .borrow()
            .calls
            .contains(&Call::Paused(false))
    );
}

#[test]
fn three_track_playlist_stops_after_the_last_track() {
    let (mut sequencer, _) = sequencer(&["a", "b", "c"]);

    sequencer.select_track("a");
    assert!(sequencer.play().is_playing);

    assert_eq!(sequencer.advance(AdvanceReason::Manual).current_track_id.as_deref(), Some("b"));
    assert_eq!(sequencer.advance(AdvanceReason::Manual).current_track_id.as_deref(), Some("c"));

    let state = sequencer.advance(AdvanceReason::Manual);
    assert_eq!(state.current_track_id.as_deref(), Some("c"));
    assert!(!state.is_playing);
}

#[test]
fn three_track_playlist_wraps_under_repeat_all() {
    let (mut sequencer, _) = sequencer(&["a", "b", "c"]);
    sequencer.toggle_repeat();
    assert_eq!(sequencer.state().repeat_mode, RepeatMode::All);

    sequencer.select_track("a");
    sequencer.play();
    sequencer.advance(AdvanceReason::Manual);
    sequencer.advance(AdvanceReason::Manual);

    let state = sequencer.advance(AdvanceReason::Manual);
    assert_eq!(state.current_track_id.as_deref(), Some("a"));
    assert!(state.is_playing);
}

#[test]
fn natural_end_moves_on_and_keeps_playing() {
    let (mut sequencer, backend) = sequencer(&["a", "b", "c"]);
    sequencer.play();

    let state = deliver(&mut sequencer, PlayerEvent::TrackFinished);

    assert_eq!(state.current_track_id.as_deref(), Some("b"));
    assert!(state.is_playing);
    assert_eq!(backend.recorder.borrow().attached(), Some("/music/b.mp3"));
    assert_eq!(last_call(&backend), Some(Call::Paused(false)));
}

#[test]
fn late_end_of_the_previous_track_does_not_skip_the_next() {
    let (mut sequencer, _) = sequencer(&["a", "b", "c"]);
    sequencer.play();
    let playing_a = sequencer.player().generation();

    sequencer.advance(AdvanceReason::Manual);
    assert_eq!(current(&sequencer), Some("b"));

    sequencer.handle_player_event(playing_a, PlayerEvent::TimeChanged(120.0));
    let state = sequencer.handle_player_event(playing_a, PlayerEvent::TrackFinished);
    assert_eq!(state.current_track_id.as_deref(), Some("b"));
    assert!(state.is_playing);

    // Early in b, so previous goes back to a rather than restarting b.
    sequencer.retreat();
    assert_eq!(current(&sequencer), Some("a"));
}

#[test]
fn natural_end_of_last_track_stops_without_repeat() {
    let (mut sequencer, _) = sequencer(&["a", "b", "c"]);
    sequencer.select_track("c");
    sequencer.play();

    let state = deliver(&mut sequencer, PlayerEvent::TrackFinished);

    assert_eq!(state.current_track_id.as_deref(), Some("c"));
    assert!(!state.is_playing);
}

#[test]
fn repeat_one_replays_the_same_track_on_natural_end() {
    let (mut sequencer, backend) = sequencer(&["a", "b", "c"]);
    sequencer.toggle_repeat();
    sequencer.toggle_repeat();
    assert_eq!(sequencer.state().repeat_mode, RepeatMode::One);

    sequencer.play();
    let state = deliver(&mut sequencer, PlayerEvent::TrackFinished);

    assert_eq!(state.current_track_id.as_deref(), Some("a"));
    assert!(state.is_playing);
    assert_eq!(loads_of(&backend, "/music/a.mp3"), 2);
    assert_eq!(last_call(&backend), Some(Call::Paused(false)));
}

#[test]
fn manual_next_under_repeat_one_restarts() {
    let (mut sequencer, backend) = sequencer(&["a", "b", "c"]);
    sequencer.toggle_repeat();
    sequencer.toggle_repeat();
    sequencer.play();
    deliver(&mut sequencer, PlayerEvent::TimeChanged(42.0));

    let state = sequencer.advance(AdvanceReason::Manual);

    assert_eq!(state.current_track_id.as_deref(), Some("a"));
    assert!(state.is_playing);
    assert_eq!(sequencer.player().elapsed(), 0.0);
    assert!(backend.recorder.borrow().calls.contains(&Call::Seek(0.0)));
}

#[test]
fn previous_after_three_seconds_restarts_the_track() {
    let (mut sequencer, backend) = sequencer(&["a", "b", "c"]);
    sequencer.select_track("b");
    sequencer.play();
    deliver(&mut sequencer, PlayerEvent::TimeChanged(3.5));

    let state = sequencer.retreat();

    assert_eq!(state.current_track_id.as_deref(), Some("b"));
    assert_eq!(sequencer.player().elapsed(), 0.0);
    assert!(backend.recorder.borrow().calls.contains(&Call::Seek(0.0)));
}

#[test]
fn previous_early_in_a_track_goes_back() {
    let (mut sequencer, _) = sequencer(&["a", "b", "c"]);
    sequencer.select_track("b");
    deliver(&mut sequencer, PlayerEvent::TimeChanged(1.0));

    assert_eq!(sequencer.retreat().current_track_id.as_deref(), Some("a"));
}

#[test]
fn previous_at_the_start_restarts_unless_repeating_all() {
    let (mut sequencer, _) = sequencer(&["a", "b", "c"]);

    assert_eq!(sequencer.retreat().current_track_id.as_deref(), Some("a"));

    sequencer.toggle_repeat();
    assert_eq!(sequencer.retreat().current_track_id.as_deref(), Some("c"));
}

#[test]
fn selecting_keeps_the_play_pause_intent() {
    let (mut sequencer, backend) = sequencer(&["a", "b", "c"]);

    let state = sequencer.select_track("c");
    assert!(!state.is_playing);
    assert_eq!(last_call(&backend), Some(Call::Load("/music/c.mp3".into())));

    sequencer.play();
    let state = sequencer.select_track("b");
    assert!(state.is_playing);
    assert_eq!(last_call(&backend), Some(Call::Paused(false)));
    assert_eq!(sequencer.position(), 1);
}

#[test]
fn selecting_an_unknown_id_changes_nothing() {
    let (mut sequencer, backend) = sequencer(&["a", "b"]);
    let before = sequencer.state().clone();
    let calls = backend.recorder.borrow().calls.len();

    let state = sequencer.select_track("missing");

    assert_eq!(state, &before);
    assert_eq!(backend.recorder.borrow().calls.len(), calls);
}

#[test]
fn empty_catalog_makes_every_transition_a_no_op() {
    let (mut sequencer, backend) = sequencer(&[]);
    let before = sequencer.state().clone();

    sequencer.select_track("a");
    sequencer.play();
    sequencer.pause();
    sequencer.toggle_play();
    sequencer.advance(AdvanceReason::Manual);
    sequencer.advance(AdvanceReason::NaturalEnd);
    sequencer.retreat();
    sequencer.toggle_shuffle();
    sequencer.toggle_repeat();
    sequencer.set_search_query("anything");
    sequencer.seek(30.0);
    deliver(&mut sequencer, PlayerEvent::TrackFinished);

    assert_eq!(sequencer.state(), &before);
    assert!(sequencer.visible_tracks().next().is_none());
    assert!(
        backend
            .recorder
            .borrow()
            .calls
            .iter()
            .all(|call| matches!(call, Call::Volume(_)))
    );
}

#[test]
fn shuffle_pins_the_current_track_and_keeps_playing_it() {
    let (mut sequencer, backend) = sequencer(&["a", "b", "c", "d", "e"]);
    sequencer.select_track("c");
    sequencer.play();
    let calls = backend.recorder.borrow().calls.len();

    let state = sequencer.toggle_shuffle();

    assert!(state.shuffle_enabled);
    assert!(state.is_playing);
    assert_eq!(state.current_track_id.as_deref(), Some("c"));
    assert_eq!(sequencer.active_order()[0], 2);
    assert_eq!(sequencer.position(), 0);
    assert_eq!(backend.recorder.borrow().calls.len(), calls);
}

#[test]
fn disabling_shuffle_resumes_the_sequential_position() {
    let (mut sequencer, _) = sequencer(&["a", "b", "c", "d", "e"]);
    sequencer.select_track("c");
    sequencer.toggle_shuffle();
    sequencer.advance(AdvanceReason::Manual);
    sequencer.advance(AdvanceReason::Manual);

    let state = sequencer.toggle_shuffle();
    assert!(!state.shuffle_enabled);
    assert_eq!(sequencer.position(), 2);

    assert_eq!(sequencer.advance(AdvanceReason::Manual).current_track_id.as_deref(), Some("d"));
}

#[test]
fn shuffle_covers_the_whole_catalog_while_searching() {
    let mut catalog = tracks(&["a", "b", "c", "d"]);
    catalog[1].title = "Needle".into();

    let (mut sequencer, _) = sequencer(&[]);
    sequencer.load_catalog(catalog);
    sequencer.set_search_query("needle");
    assert_eq!(sequencer.view().len(), 1);

    sequencer.toggle_shuffle();

    let unique: HashSet<usize> = sequencer.active_order().iter().copied().collect();
    assert_eq!(unique, HashSet::from([0, 1, 2, 3]));
}

#[test]
fn narrowing_the_search_clamps_the_stored_position() {
    let ids = numbered(10);
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut catalog = tracks(&ids);
    for track in catalog.iter_mut().take(3) {
        track.title = format!("Blue {}", track.id);
    }

    let (mut sequencer, backend) = sequencer(&[]);
    sequencer.load_catalog(catalog);
    sequencer.select_track("t9");
    sequencer.play();
    assert_eq!(sequencer.position(), 9);

    let state = sequencer.set_search_query("blue").clone();

    assert!(sequencer.position() <= 2);
    assert_eq!(state.current_track_id.as_deref(), Some("t9"));
    assert!(state.is_playing);
    assert_eq!(backend.recorder.borrow().attached(), Some("/music/t9.mp3"));

    sequencer.toggle_repeat();
    let state = sequencer.advance(AdvanceReason::Manual);
    assert_eq!(state.current_track_id.as_deref(), Some("t0"));
}

#[test]
fn search_follows_the_playing_track_when_it_stays_visible() {
    let mut catalog = tracks(&["a", "b", "c", "d"]);
    catalog[1].artist = "Shared".into();
    catalog[3].artist = "Shared".into();

    let (mut sequencer, _) = sequencer(&[]);
    sequencer.load_catalog(catalog);
    sequencer.select_track("d");

    sequencer.set_search_query("shared");
    assert_eq!(sequencer.position(), 1);

    sequencer.set_search_query("");
    assert_eq!(sequencer.position(), 3);
}

#[test]
fn volume_and_mute_round_trip() {
    let (mut sequencer, backend) = sequencer(&["a"]);

    sequencer.set_volume(0.6);
    let state = sequencer.toggle_mute();
    assert!(state.is_muted);
    assert_eq!(backend.recorder.borrow().last_volume(), Some(0.0));

    let state = sequencer.toggle_mute();
    assert!(!state.is_muted);
    assert_eq!(state.volume, 0.6);
    assert_eq!(state.last_non_zero_volume, 0.6);
    assert_eq!(sequencer.player().effective_volume(), 0.6);
}

#[test]
fn seek_ratio_uses_the_track_duration() {
    let (mut sequencer, backend) = sequencer(&["a"]);

    sequencer.seek_ratio(0.5);

    assert_eq!(sequencer.player().elapsed(), 90.0);
    assert_eq!(last_call(&backend), Some(Call::Seek(90.0)));
}

#[test]
fn backend_failure_stops_playback_and_is_recorded() {
    let (mut sequencer, _) = sequencer(&["a", "b"]);
    sequencer.play();

    let state = deliver(&mut sequencer, PlayerEvent::Failed("decode error".into()));

    assert!(!state.is_playing);
    assert!(state.last_error.as_deref().is_some_and(|e| e.contains("decode error")));
    assert_eq!(state.current_track_id.as_deref(), Some("a"));
}

#[test]
fn lost_backend_is_a_recoverable_error() {
    let (mut sequencer, backend) = sequencer(&["a", "b"]);
    backend.recorder.borrow_mut().disconnected = true;

    let state = sequencer.play();
    assert!(!state.is_playing);
    assert!(state.last_error.is_some());

    backend.recorder.borrow_mut().disconnected = false;
    let state = sequencer.play();
    assert!(state.is_playing);
    assert_eq!(state.last_error, None);
}

#[test]
fn observers_see_every_transition() {
    let (mut sequencer, _) = sequencer(&["a", "b"]);
    let recording = Recording::default();
    sequencer.subscribe(Box::new(recording.clone()));

    sequencer.play();
    sequencer.advance(AdvanceReason::Manual);

    let seen = recording.0.borrow();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].is_playing);
    assert_eq!(seen[1].current_track_id.as_deref(), Some("b"));
}

#[test]
fn channel_observer_forwards_state_events() {
    let (mut sequencer, _) = sequencer(&["a"]);
    let (tx, rx) = mpsc::channel();
    sequencer.subscribe(Box::new(tx));

    sequencer.toggle_repeat();

    match rx.try_recv() {
        Ok(AppEvent::StateChanged(state)) => assert_eq!(state.repeat_mode, RepeatMode::All),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn replacing_the_catalog_resets_the_position() {
    let (mut sequencer, _) = sequencer(&["a", "b", "c"]);
    sequencer.select_track("c");
    sequencer.play();

    let state = sequencer.load_catalog(vec![track("x"), track("y")]);

    assert_eq!(state.current_track_id.as_deref(), Some("x"));
    assert!(!state.is_playing);
    assert_eq!(sequencer.position(), 0);
    assert_eq!(sequencer.tracks().len(), 2);
}

proptest! {
    #[test]
    fn advancing_len_times_under_repeat_all_returns_home(len in 1usize..40, start in any::<prop::sample::Index>()) {
        let ids = numbered(len);
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        let (mut sequencer, _) = sequencer(&ids);
        sequencer.toggle_repeat();

        let home = ids[start.index(len)].to_string();
        sequencer.select_track(&home);

        for _ in 0..len {
            sequencer.advance(AdvanceReason::Manual);
        }

        prop_assert_eq!(current(&sequencer), Some(home.as_str()));
    }

    #[test]
    fn every_shuffle_is_a_permutation_led_by_the_current_track(
        len in 1usize..40,
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..6),
    ) {
        let ids = numbered(len);
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        let (mut sequencer, _) = sequencer(&ids);

        for pick in picks {
            let idx = pick.index(len);
            sequencer.select_track(ids[idx]);
            if sequencer.state().shuffle_enabled {
                sequencer.toggle_shuffle();
            }
            sequencer.toggle_shuffle();

            let order = sequencer.active_order();
            prop_assert_eq!(order.len(), len);
            prop_assert_eq!(order[0], idx);
            let unique: HashSet<usize> = order.iter().copied().collect();
            prop_assert_eq!(unique.len(), len);
        }
    }
}
