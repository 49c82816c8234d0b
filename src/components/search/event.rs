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

use std::{sync::mpsc::Sender, time::Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyCode};
use tui_input::backend::crossterm::EventHandler;

use crate::{
    components::SearchBox,
    events::{AppEvent, AppEventProcessor},
};

impl AppEventProcessor for SearchBox {
    fn process_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> Result<bool> {
        let Event::Key(key) = event else {
            return Ok(false);
        };

        if !self.active {
            if key.code == KeyCode::Char('/') {
                self.active = true;
                return Ok(true);
            }
            return Ok(false);
        }

        match key.code {
            KeyCode::Enter => {
                self.active = false;
                self.debounce.flush();
                event_tx.send(AppEvent::SearchQuery(self.input.value().to_string()))?;
            }

            KeyCode::Esc => {
                self.active = false;
                self.debounce.flush();
                self.input.reset();
                event_tx.send(AppEvent::SearchQuery(String::new()))?;
            }

            _ => {
                // Cursor movement changes nothing worth searching for.
                let before = self.input.value().to_string();
                self.input.handle_event(event);
                if self.input.value() != before {
                    self.debounce
                        .schedule(self.input.value().to_string(), Instant::now());
                }
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, time::Duration};

    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(search: &mut SearchBox, tx: &Sender<AppEvent>, text: &str) {
        for c in text.chars() {
            search.process_event(&key(KeyCode::Char(c)), tx).unwrap();
        }
    }

    #[test]
    fn ignores_keys_until_focused() {
        let (tx, _rx) = mpsc::channel();
        let mut search = SearchBox::new(Duration::from_millis(300));

        assert!(!search.process_event(&key(KeyCode::Char('n')), &tx).unwrap());
        assert!(search.process_event(&key(KeyCode::Char('/')), &tx).unwrap());
        assert!(search.is_active());
        assert_eq!(search.input.value(), "");
    }

    #[test]
    fn typing_is_debounced() {
        let (tx, rx) = mpsc::channel();
        let mut search = SearchBox::new(Duration::from_millis(300));
        search.process_event(&key(KeyCode::Char('/')), &tx).unwrap();

        type_text(&mut search, &tx, "blue");

        assert!(search.is_pending());
        assert_eq!(search.poll_query(Instant::now()), None);
        assert_eq!(
            search.poll_query(Instant::now() + Duration::from_millis(400)).as_deref(),
            Some("blue")
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn enter_applies_immediately() {
        let (tx, rx) = mpsc::channel();
        let mut search = SearchBox::new(Duration::from_millis(300));
        search.process_event(&key(KeyCode::Char('/')), &tx).unwrap();
        type_text(&mut search, &tx, "jazz");

        search.process_event(&key(KeyCode::Enter), &tx).unwrap();

        assert!(!search.is_active());
        assert!(!search.is_pending());
        assert!(matches!(rx.try_recv(), Ok(AppEvent::SearchQuery(q)) if q == "jazz"));
    }

    #[test]
    fn escape_clears_the_query() {
        let (tx, rx) = mpsc::channel();
        let mut search = SearchBox::new(Duration::from_millis(300));
        search.process_event(&key(KeyCode::Char('/')), &tx).unwrap();
        type_text(&mut search, &tx, "rock");

        search.process_event(&key(KeyCode::Esc), &tx).unwrap();

        assert_eq!(search.input.value(), "");
        assert!(!search.is_pending());
        assert!(matches!(rx.try_recv(), Ok(AppEvent::SearchQuery(q)) if q.is_empty()));
    }
}
