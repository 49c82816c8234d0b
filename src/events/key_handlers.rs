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

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

use crate::{
    App,
    events::{AppEvent, AppEventProcessor, handlers::handle_toggle_theme},
    model::AdvanceReason,
};

const FINE_VOLUME_DELTA: f64 = 0.05;
const VOLUME_DELTA: f64 = 0.10;

const FINE_SEEK_DELTA: f64 = 5.0;
const SEEK_DELTA: f64 = 20.0;

/// Maps keyboard input to application actions and playback commands.
///
/// The search box sees the key first while it has focus, then the playlist
/// table gets a chance at navigation keys, and whatever is left is treated
/// as a global transport binding.
///
/// # Errors
///
/// Returns an error if an event fails to send on the application channel.
pub(super) fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    app.status_message = None;

    let event = Event::Key(key);

    if app.search_box.process_event(&event, &app.event_tx)? {
        return Ok(());
    }

    if app.playlist.process_event(&event, &app.event_tx)? {
        return Ok(());
    }

    process_global_key_event(app, key)
}

fn process_global_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    let sequencer = &mut app.sequencer;

    match key.code {
        KeyCode::Char('q') => app.event_tx.send(AppEvent::ExitApplication)?,

        KeyCode::Char(' ') => {
            sequencer.toggle_play();
        }
        KeyCode::Char('n') => {
            sequencer.advance(AdvanceReason::Manual);
        }
        KeyCode::Char('p') => {
            sequencer.retreat();
        }
        KeyCode::Char('s') => {
            sequencer.toggle_shuffle();
        }
        KeyCode::Char('r') => {
            sequencer.toggle_repeat();
        }

        KeyCode::Char('m') => {
            sequencer.toggle_mute();
        }
        KeyCode::Char('-') => {
            sequencer.adjust_volume(-FINE_VOLUME_DELTA);
        }
        KeyCode::Char('=') => {
            sequencer.adjust_volume(FINE_VOLUME_DELTA);
        }
        KeyCode::Char('_') => {
            sequencer.adjust_volume(-VOLUME_DELTA);
        }
        KeyCode::Char('+') => {
            sequencer.adjust_volume(VOLUME_DELTA);
        }

        KeyCode::Left => {
            sequencer.seek_by(-FINE_SEEK_DELTA);
        }
        KeyCode::Right => {
            sequencer.seek_by(FINE_SEEK_DELTA);
        }
        KeyCode::Char('<') => {
            sequencer.seek_by(-SEEK_DELTA);
        }
        KeyCode::Char('>') => {
            sequencer.seek_by(SEEK_DELTA);
        }
        // Jump to a tenth of the track, like a click on the progress bar.
        KeyCode::Char(digit @ '0'..='9') => {
            let tenths = f64::from(digit.to_digit(10).unwrap_or_default());
            sequencer.seek_ratio(tenths / 10.0);
        }

        KeyCode::Char('t') => handle_toggle_theme(app),

        _ => {}
    }

    Ok(())
}
