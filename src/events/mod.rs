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

//! Application event handling.
//!
//! This module acts as the central hub for the "Controller" logic of the
//! application. Every input, whether a key press, a frame tick, a catalog
//! result or a notification from the audio worker, arrives as an
//! [`AppEvent`] on a single channel and is processed on the main thread one
//! at a time. That serialisation is what lets the sequencer mutate its state
//! without any locking.
//!
//! # Organization
//!
//! * [`handlers`]: One function per non-key event.
//! * [`key_handlers`]: Routing of keyboard input to components and global
//!   transport bindings.

mod handlers;
mod key_handlers;

use handlers::*;
use key_handlers::process_key_event;

use std::{io::Stdout, sync::mpsc::Sender};

use anyhow::Result;
use crossterm::event::{Event, KeyEvent};
use ratatui::{Terminal, prelude::CrosstermBackend};

use crate::{
    App,
    model::{PlayerState, Track},
    player::PlayerEvent,
    render::draw,
};

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),

    /// One display frame has elapsed.
    Frame,

    CatalogLoaded(Vec<Track>),
    CatalogFailed(String),

    /// A backend notification for the load numbered `generation`.
    Player { generation: u64, event: PlayerEvent },
    StateChanged(PlayerState),

    PlayTrack(String),
    SearchQuery(String),

    ExitApplication,

    Error(String),
}

/// Implemented by components that consume raw terminal input.
pub(crate) trait AppEventProcessor {
    /// Returns `true` when the event was consumed.
    fn process_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> Result<bool>;
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until a 'quit' event is received or the event channel
/// is closed.
pub(crate) fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    terminal.draw(|f| draw(f, app))?;

    while let Ok(event) = app.event_rx.recv() {
        if matches!(event, AppEvent::ExitApplication) {
            break;
        }

        dispatch(app, event)?;

        terminal.draw(|f| draw(f, app))?;
    }

    Ok(())
}

/// Applies a single event to the application state.
pub(crate) fn dispatch(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => process_key_event(app, key)?,
        AppEvent::Frame => handle_frame(app),
        AppEvent::CatalogLoaded(tracks) => handle_catalog_loaded(app, tracks),
        AppEvent::CatalogFailed(message) => handle_catalog_failed(app, message),
        AppEvent::Player { generation, event } => handle_player_event(app, generation, event),
        AppEvent::StateChanged(state) => handle_state_changed(app, state),
        AppEvent::PlayTrack(id) => handle_play_track(app, &id),
        AppEvent::SearchQuery(query) => handle_search_query(app, &query),
        AppEvent::Error(message) => handle_error(app, message),
        AppEvent::ExitApplication => {}
    }

    refresh_ticker(app);

    Ok(())
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::{CatalogStatus, model::fixtures::tracks, testing, theme::ThemeName};

    fn press(app: &mut App, code: KeyCode) {
        dispatch(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))).unwrap();
    }

    /// Processes everything queued so far, as the main loop would.
    fn settle(app: &mut App) -> bool {
        let mut exit = false;
        while let Ok(event) = app.event_rx.try_recv() {
            if matches!(event, AppEvent::ExitApplication) {
                exit = true;
                continue;
            }
            dispatch(app, event).unwrap();
        }
        exit
    }

    #[test]
    fn enter_plays_the_selected_row() {
        let (mut app, _backend, _tasks) = testing::app();
        dispatch(&mut app, AppEvent::CatalogLoaded(tracks(&["a", "b", "c"]))).unwrap();
        settle(&mut app);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        assert_eq!(app.player_state.current_track_id.as_deref(), Some("b"));
        assert!(app.player_state.is_playing);
        assert_eq!(app.catalog_status, CatalogStatus::Ready);
    }

    #[test]
    fn transport_keys_drive_the_sequencer() {
        let (mut app, _backend, _tasks) = testing::app();
        dispatch(&mut app, AppEvent::CatalogLoaded(tracks(&["a", "b"]))).unwrap();

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('m'));
        settle(&mut app);

        let state = &app.player_state;
        assert_eq!(state.current_track_id.as_deref(), Some("b"));
        assert!(state.is_playing);
        assert!(state.shuffle_enabled);
        assert_ne!(state.repeat_mode, crate::model::RepeatMode::Off);
        assert!(state.is_muted);
    }

    #[test]
    fn search_keys_filter_the_playlist() {
        let (mut app, _backend, _tasks) = testing::app();
        dispatch(&mut app, AppEvent::CatalogLoaded(tracks(&["a", "b", "c"]))).unwrap();

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('b'));
        // Typed into the box, not treated as a transport key.
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        assert_eq!(app.sequencer.view().len(), 1);
        assert_eq!(app.playlist.selected_id(), Some("b"));
        // Filtering never touches what is loaded.
        assert_eq!(app.player_state.current_track_id.as_deref(), Some("a"));
        assert!(!app.player_state.is_playing);
    }

    #[test]
    fn failed_catalog_leaves_an_inert_player() {
        let (mut app, _backend, _tasks) = testing::app();
        dispatch(&mut app, AppEvent::CatalogFailed("no such file".into())).unwrap();

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        assert_eq!(app.catalog_status, CatalogStatus::Failed("no such file".into()));
        assert_eq!(app.player_state.current_track_id, None);
        assert!(!app.player_state.is_playing);
    }

    #[test]
    fn q_requests_exit() {
        let (mut app, _backend, _tasks) = testing::app();

        press(&mut app, KeyCode::Char('q'));

        assert!(settle(&mut app));
    }

    #[test]
    fn errors_show_until_the_next_key() {
        let (mut app, _backend, _tasks) = testing::app();

        dispatch(&mut app, AppEvent::Error("boom".into())).unwrap();
        assert_eq!(app.status_message.as_deref(), Some("boom"));

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.status_message, None);
    }
    #[test]
    fn t_switches_between_dark_and_light() {
        let (mut app, _backend, _tasks) = testing::app();
        assert_eq!(app.theme.name, ThemeName::Dark);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme.name, ThemeName::Light);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme.name, ThemeName::Dark);
    }
}
