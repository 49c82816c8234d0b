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

//! The playlist table.
//!
//! Holds the ids of the tracks currently visible (after search filtering) and
//! the table cursor. Moving the cursor never changes playback; activating a
//! row asks the sequencer to play it.

mod event;
mod render;

use ratatui::widgets::TableState;

pub(crate) struct PlaylistTable {
    rows: Vec<String>,
    pub(crate) table_state: TableState,
}

impl PlaylistTable {
    pub(crate) fn new() -> Self {
        Self {
            rows: vec![],
            table_state: TableState::new(),
        }
    }

    /// Replaces the visible rows, keeping the cursor on the playing track
    /// when it is still listed.
    pub(crate) fn set_rows(&mut self, rows: Vec<String>, current: Option<&str>) {
        let selected = current
            .and_then(|id| rows.iter().position(|row| row == id))
            .or(if rows.is_empty() { None } else { Some(0) });

        self.rows = rows;
        self.table_state.select(selected);
    }

    pub(crate) fn selected_id(&self) -> Option<&str> {
        self.table_state
            .selected()
            .and_then(|i| self.rows.get(i))
            .map(String::as_str)
    }

    fn goto_next(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    fn goto_previous(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    fn goto_first(&mut self) {
        if !self.rows.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    fn goto_last(&mut self) {
        if let Some(last) = self.rows.len().checked_sub(1) {
            self.table_state.select(Some(last));
        }
    }
}
