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

//! Keyboard navigation for the playlist table.

use std::sync::mpsc::Sender;

use anyhow::Result;
use crossterm::event::{Event, KeyCode};

use crate::{
    components::PlaylistTable,
    events::{AppEvent, AppEventProcessor},
};

impl AppEventProcessor for PlaylistTable {
    fn process_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> Result<bool> {
        let Event::Key(key) = event else {
            return Ok(false);
        };

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.goto_next(),
            KeyCode::Char('k') | KeyCode::Up => self.goto_previous(),
            KeyCode::Char('g') | KeyCode::Home => self.goto_first(),
            KeyCode::Char('G') | KeyCode::End => self.goto_last(),
            KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    event_tx.send(AppEvent::PlayTrack(id.to_string()))?;
                }
            }
            _ => return Ok(false),
        }

        Ok(true)
    }
}
