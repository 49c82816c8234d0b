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

//! Playback sequencing.
//!
//! The [`Sequencer`] decides what plays next. It owns the canonical track
//! list, the search-filtered [`PlaylistView`], the [`PlaybackOrder`], the
//! repeat mode and the single [`PlayerState`], and drives the
//! [`AudioPlayer`] adapter.
//!
//! Every operation is a named transition that mutates state synchronously and
//! returns the resulting state. Interested parties subscribe with a
//! [`PlaybackObserver`] rather than being called directly.
//!
//! # Positions
//!
//! `position` is the stored index into the *active* order: the shuffled
//! permutation when shuffle is on, otherwise the playlist view. Navigation
//! always works from this index, which is what lets a search filter hide the
//! playing track without losing our place.

#[cfg(test)]
mod tests;

use std::sync::mpsc::Sender;

use crate::{
    events::AppEvent,
    model::{
        AdvanceReason, PlayerState, RepeatMode, Track, order::PlaybackOrder,
        search::PlaylistView,
    },
    player::{AudioPlayer, PlaybackError, PlaybackNotice, PlayerEvent},
};

/// Elapsed time after which "previous" restarts the current track instead.
const RESTART_THRESHOLD_SECS: f64 = 3.0;

/// Receives a copy of the state after every transition that changed it.
pub(crate) trait PlaybackObserver {
    fn on_state_changed(&self, state: &PlayerState);
}

impl PlaybackObserver for Sender<AppEvent> {
    fn on_state_changed(&self, state: &PlayerState) {
        // The receiver only goes away during shutdown.
        let _ = self.send(AppEvent::StateChanged(state.clone()));
    }
}

pub(crate) struct Sequencer {
    tracks: Vec<Track>,
    view: PlaylistView,
    order: PlaybackOrder,

    /// Canonical index of the loaded track.
    current: Option<usize>,

    /// Stored index into the active order.
    position: usize,

    /// Sequential position remembered while shuffle is on.
    resume_position: Option<usize>,

    state: PlayerState,
    player: AudioPlayer,
    observers: Vec<Box<dyn PlaybackObserver>>,
}

impl Sequencer {
    pub(crate) fn new(player: AudioPlayer) -> Self {
        let state = PlayerState {
            volume: player.volume(),
            is_muted: player.is_muted(),
            last_non_zero_volume: player.last_non_zero_volume(),
            ..PlayerState::default()
        };

        Self {
            tracks: vec![],
            view: PlaylistView::default(),
            order: PlaybackOrder::Sequential,
            current: None,
            position: 0,
            resume_position: None,
            state,
            player,
            observers: vec![],
        }
    }

    pub(crate) fn subscribe(&mut self, observer: Box<dyn PlaybackObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn state(&self) -> &PlayerState {
        &self.state
    }

    pub(crate) fn player(&self) -> &AudioPlayer {
        &self.player
    }

    pub(crate) fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub(crate) fn view(&self) -> &PlaylistView {
        &self.view
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|idx| self.tracks.get(idx))
    }

    /// Tracks visible in the playlist view, in display order.
    pub(crate) fn visible_tracks(&self) -> impl Iterator<Item = &Track> {
        self.view.indices().iter().filter_map(|&idx| self.tracks.get(idx))
    }

    /// The canonical indices navigation currently walks through.
    pub(crate) fn active_order(&self) -> &[usize] {
        match &self.order {
            PlaybackOrder::Shuffled(order) => order,
            PlaybackOrder::Sequential => self.view.indices(),
        }
    }

    /// Replaces the canonical track list and loads, without playing, the first
    /// track of the active order.
    pub(crate) fn load_catalog(&mut self, tracks: Vec<Track>) -> &PlayerState {
        if self.current.is_some() {
            if let Err(e) = self.player.stop() {
                tracing::warn!(error = %e, "failed to stop before replacing catalog");
            }
        }

        let query = self.view.query().to_string();
        self.tracks = tracks;
        self.view = PlaylistView::filter(&self.tracks, &query);
        self.current = None;
        self.position = 0;
        self.resume_position = None;
        self.state.current_track_id = None;
        self.state.is_playing = false;

        if self.order.is_shuffled() {
            self.order = PlaybackOrder::shuffled(self.tracks.len(), None);
            self.resume_position = Some(0);
        }

        tracing::info!(tracks = self.tracks.len(), "catalog loaded into sequencer");

        if let Some(&first) = self.active_order().first() {
            self.load_index(first);
        }

        self.notify();
        &self.state
    }

    /// Makes the track with `id` current, keeping the play/pause intent.
    /// Unknown ids are ignored.
    pub(crate) fn select_track(&mut self, id: &str) -> &PlayerState {
        let Some(idx) = self.tracks.iter().position(|t| t.id == id) else {
            tracing::debug!(id, "ignoring selection of unknown track");
            return &self.state;
        };

        self.load_index(idx);
        self.notify();
        &self.state
    }

    pub(crate) fn play(&mut self) -> &PlayerState {
        if self.tracks.is_empty() {
            return &self.state;
        }

        if !self.player.is_loaded() {
            let order = self.active_order();
            let Some(&idx) = order.get(self.position.min(order.len().saturating_sub(1))) else {
                return &self.state;
            };
            self.load_index(idx);
        }

        match self.player.play() {
            Ok(()) => {
                self.state.is_playing = true;
                self.state.last_error = None;
            }
            Err(e) => self.fail(e),
        }

        self.notify();
        &self.state
    }

    pub(crate) fn pause(&mut self) -> &PlayerState {
        if self.tracks.is_empty() {
            return &self.state;
        }

        if let Err(e) = self.player.pause() {
            self.fail(e);
        }
        self.state.is_playing = false;

        self.notify();
        &self.state
    }

    pub(crate) fn toggle_play(&mut self) -> &PlayerState {
        if self.state.is_playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Moves forward through the active order.
    ///
    /// Under repeat-one both a manual "next" and a natural end restart the
    /// current track. Otherwise running off the end stops playback unless
    /// repeat-all wraps around.
    pub(crate) fn advance(&mut self, reason: AdvanceReason) -> &PlayerState {
        if self.tracks.is_empty() {
            return &self.state;
        }

        if self.state.repeat_mode == RepeatMode::One {
            tracing::debug!(?reason, "repeat-one restart");
            self.restart(reason == AdvanceReason::NaturalEnd);
            self.notify();
            return &self.state;
        }

        let len = self.active_order().len();
        if len == 0 {
            return &self.state;
        }

        let position = self.position.min(len - 1);
        let next = (position + 1) % len;

        if next == 0 && self.state.repeat_mode != RepeatMode::All {
            tracing::debug!(?reason, "end of playlist");
            if let Err(e) = self.player.stop() {
                self.fail(e);
            }
            self.state.is_playing = false;
            self.notify();
            return &self.state;
        }

        // A natural end means the track was playing, so the next one should too.
        if reason == AdvanceReason::NaturalEnd {
            self.state.is_playing = true;
        }

        let idx = self.active_order()[next];
        self.position = next;
        self.load_index(idx);

        tracing::debug!(?reason, position = next, "advanced");
        self.notify();
        &self.state
    }

    /// Moves back through the active order, or restarts the current track if
    /// it has played for more than a few seconds.
    pub(crate) fn retreat(&mut self) -> &PlayerState {
        if self.tracks.is_empty() {
            return &self.state;
        }

        if self.player.elapsed() > RESTART_THRESHOLD_SECS
            || self.state.repeat_mode == RepeatMode::One
        {
            self.restart(false);
            self.notify();
            return &self.state;
        }

        let len = self.active_order().len();
        if len == 0 {
            return &self.state;
        }

        let position = self.position.min(len - 1);
        if position == 0 && self.state.repeat_mode != RepeatMode::All {
            self.restart(false);
            self.notify();
            return &self.state;
        }

        let previous = (position + len - 1) % len;
        let idx = self.active_order()[previous];
        self.position = previous;
        self.load_index(idx);

        tracing::debug!(position = previous, "retreated");
        self.notify();
        &self.state
    }

    /// Switches shuffle on (pinning the current track first) or off
    /// (returning to the remembered sequential position). The loaded track
    /// keeps playing either way.
    pub(crate) fn toggle_shuffle(&mut self) -> &PlayerState {
        if self.tracks.is_empty() {
            return &self.state;
        }

        if self.state.shuffle_enabled {
            self.order = PlaybackOrder::Sequential;
            let restored = self.resume_position.take().unwrap_or(self.position);
            self.position = restored.min(self.view.len().saturating_sub(1));
            self.state.shuffle_enabled = false;
        } else {
            self.resume_position = Some(self.position);
            self.order = PlaybackOrder::shuffled(self.tracks.len(), self.current);
            self.position = 0;
            self.state.shuffle_enabled = true;
        }

        tracing::debug!(shuffle = self.state.shuffle_enabled, "shuffle toggled");
        self.notify();
        &self.state
    }

    pub(crate) fn toggle_repeat(&mut self) -> &PlayerState {
        if self.tracks.is_empty() {
            return &self.state;
        }

        self.state.repeat_mode = self.state.repeat_mode.cycle();

        tracing::debug!(repeat = ?self.state.repeat_mode, "repeat toggled");
        self.notify();
        &self.state
    }

    /// Recomputes the playlist view. What is loaded is never affected; only
    /// the stored position is moved so that it stays inside the view.
    pub(crate) fn set_search_query(&mut self, query: &str) -> &PlayerState {
        if self.tracks.is_empty() {
            return &self.state;
        }

        self.view = PlaylistView::filter(&self.tracks, query);

        if !self.order.is_shuffled() {
            let visible = self.current.and_then(|idx| self.view.position_of(idx));
            self.position = match visible {
                Some(position) => position,
                None => self.position.min(self.view.len().saturating_sub(1)),
            };
        }

        tracing::debug!(query, matches = self.view.len(), "search applied");
        self.notify();
        &self.state
    }

    pub(crate) fn set_volume(&mut self, volume: f64) -> &PlayerState {
        if let Err(e) = self.player.set_volume(volume) {
            self.fail(e);
        }
        self.sync_volume();
        self.notify();
        &self.state
    }

    /// Adjusts the volume relative to its current level.
    pub(crate) fn adjust_volume(&mut self, delta: f64) -> &PlayerState {
        let volume = self.player.volume() + delta;
        self.set_volume(volume)
    }

    pub(crate) fn toggle_mute(&mut self) -> &PlayerState {
        if let Err(e) = self.player.toggle_mute() {
            self.fail(e);
        }
        self.sync_volume();
        self.notify();
        &self.state
    }

    pub(crate) fn seek(&mut self, seconds: f64) -> &PlayerState {
        if let Err(e) = self.player.seek(seconds) {
            self.fail(e);
            self.notify();
        }
        &self.state
    }

    pub(crate) fn seek_by(&mut self, delta: f64) -> &PlayerState {
        let target = self.player.elapsed() + delta;
        self.seek(target)
    }

    /// Seeks to a fraction of the track's duration.
    pub(crate) fn seek_ratio(&mut self, ratio: f64) -> &PlayerState {
        match self.player.duration() {
            Some(duration) => self.seek(duration * ratio.clamp(0.0, 1.0)),
            None => &self.state,
        }
    }

    /// Feeds a backend notification through the adapter and reacts to natural
    /// completion and failure. Notifications about an earlier load are
    /// ignored, so a completion is acted on once at most.
    pub(crate) fn handle_player_event(&mut self, generation: u64, event: PlayerEvent) -> &PlayerState {
        match self.player.on_event(generation, event) {
            Some(PlaybackNotice::Ended) => self.advance(AdvanceReason::NaturalEnd),
            Some(PlaybackNotice::Failed(e)) => {
                self.fail(e);
                self.notify();
                &self.state
            }
            None => &self.state,
        }
    }

    /// Loads the track at canonical index `idx`, autoplaying if the listener
    /// was already playing.
    fn load_index(&mut self, idx: usize) {
        let Some(track) = self.tracks.get(idx) else {
            return;
        };

        self.current = Some(idx);
        self.state.current_track_id = Some(track.id.clone());

        if let Some(position) = self.active_order().iter().position(|&i| i == idx) {
            self.position = position;
        }

        let track = &self.tracks[idx];
        tracing::debug!(id = %track.id, title = %track.title, "loading track");

        if let Err(e) = self.player.load(track) {
            self.fail(e);
            return;
        }

        if self.state.is_playing {
            if let Err(e) = self.player.play() {
                self.fail(e);
            } else {
                self.state.last_error = None;
            }
        }
    }

    /// Rewinds the current track. A natural end also resumes playback, since
    /// the track was playing when it finished.
    fn restart(&mut self, resume: bool) {
        if let Err(e) = self.player.seek(0.0) {
            self.fail(e);
            return;
        }

        if resume || self.state.is_playing {
            match self.player.play() {
                Ok(()) => self.state.is_playing = true,
                Err(e) => self.fail(e),
            }
        }
    }

    fn fail(&mut self, error: PlaybackError) {
        tracing::warn!(error = %error, "playback error");
        self.state.is_playing = false;
        self.state.last_error = Some(error.to_string());
    }

    fn sync_volume(&mut self) {
        self.state.volume = self.player.volume();
        self.state.is_muted = self.player.is_muted();
        self.state.last_non_zero_volume = self.player.last_non_zero_volume();
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer.on_state_changed(&self.state);
        }
    }
}
