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

use std::time::Instant;

use crate::{
    App, CatalogStatus,
    model::{PlayerState, Track},
    player::PlayerEvent,
    theme::Theme,
    util,
};

pub(super) fn handle_frame(app: &mut App) {
    if let Some(query) = app.search_box.poll_query(Instant::now()) {
        handle_search_query(app, &query);
    }

    if let Some(visualizer) = app.visualizer.as_mut() {
        app.analyser
            .set_position(app.sequencer.player().elapsed(), app.player_state.is_playing);
        visualizer.tick(&mut app.analyser);
    }
}

/// Drops the frame rate whenever nothing on screen needs animating.
pub(super) fn refresh_ticker(app: &App) {
    let Some(ticker) = &app.ticker else {
        return;
    };

    let animating = app
        .visualizer
        .as_ref()
        .is_some_and(|v| app.player_state.is_playing || v.is_active());

    ticker.set_idle(!animating && !app.search_box.is_pending());
}

pub(super) fn handle_catalog_loaded(app: &mut App, tracks: Vec<Track>) {
    app.catalog_status = CatalogStatus::Ready;
    app.sequencer.load_catalog(tracks);
    refresh_playlist(app);
}

pub(super) fn handle_catalog_failed(app: &mut App, message: String) {
    app.sequencer.load_catalog(vec![]);
    app.catalog_status = CatalogStatus::Failed(message);
    refresh_playlist(app);
}

pub(super) fn handle_player_event(app: &mut App, generation: u64, event: PlayerEvent) {
    app.sequencer.handle_player_event(generation, event);
}

/// Mirrors the sequencer's state into the view and follows track changes.
pub(super) fn handle_state_changed(app: &mut App, state: PlayerState) {
    if state.current_track_id != app.player_state.current_track_id {
        let source = app.sequencer.current_track().map(|t| t.source.as_str());
        app.analyser.track_changed(source);
    }

    if state.last_error.is_some() && state.last_error != app.player_state.last_error {
        app.status_message = state.last_error.clone();
    }

    app.player_state = state;
}

pub(super) fn handle_play_track(app: &mut App, id: &str) {
    app.sequencer.select_track(id);
    app.sequencer.play();
}

pub(super) fn handle_search_query(app: &mut App, query: &str) {
    app.sequencer.set_search_query(query);
    refresh_playlist(app);
}

pub(super) fn handle_error(app: &mut App, message: String) {
    tracing::warn!(message = %message, "reported error");
    app.status_message = Some(message);
}

/// Switches palette, repaints the terminal background and remembers the
/// choice.
pub(super) fn handle_toggle_theme(app: &mut App) {
    let name = app.theme.name.toggle();
    app.theme = Theme::from_name(name);
    app.config.theme = name;

    if let Some(hex) = Theme::to_hex(app.theme.background_colour) {
        if let Err(e) = util::term::set_terminal_bg(&hex) {
            tracing::warn!(error = %e, "failed to set terminal background");
        }
    }

    app.save_preferences();
}

/// Rebuilds the playlist rows after the view changed.
fn refresh_playlist(app: &mut App) {
    let ids = app.sequencer.visible_tracks().map(|t| t.id.clone()).collect();
    let current = app.sequencer.state().current_track_id.as_deref();
    app.playlist.set_rows(ids, current);
}
