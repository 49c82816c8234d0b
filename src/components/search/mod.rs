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

//! The search box.
//!
//! Typing edits the query immediately but only hands it to the sequencer once
//! typing pauses, via a [`SearchDebounce`]. Enter applies the query straight
//! away and Esc clears it.

mod event;
mod render;

use std::time::{Duration, Instant};

use tui_input::Input;

use crate::model::search::SearchDebounce;

pub(crate) struct SearchBox {
    pub(crate) input: Input,
    active: bool,
    debounce: SearchDebounce,
}

impl SearchBox {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            input: Input::default(),
            active: false,
            debounce: SearchDebounce::new(delay),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Returns the query once the debounce window has elapsed.
    pub(crate) fn poll_query(&mut self, now: Instant) -> Option<String> {
        self.debounce.poll(now)
    }
}
