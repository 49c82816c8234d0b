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

//! User interface rendering logic.
//!
//! This module handles the translation of the [`App`] state into visual
//! widgets using the `ratatui` framework. It is responsible for layout
//! management, widget styling, and terminal frame composition.
//!
//! # Rendering Pipeline
//!
//! The primary entry point is the [`draw`] function, which is called after
//! every processed event, including each visualizer frame.

pub(crate) mod icons;
mod player;
mod visualizer;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::{
    App, CatalogStatus,
    model::Track,
    render::{player::draw_player, visualizer::draw_visualizer},
};

const HELP: &str = "/ search  ⏎ play  space pause  n/p next/prev  s shuffle  r repeat  m mute  -/+ volume  ←/→ seek  t theme  q quit";

/// Renders the user interface to the terminal frame.
///
/// The screen is split into the search box, the playlist (with the
/// visualizer alongside when enabled), the player panel and a one-line
/// footer.
pub(crate) fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();

    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.background_colour)),
        area,
    );

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(area);

    app.search_box.draw(f, outer[0], &app.theme);

    let main = match &app.visualizer {
        Some(_) => Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(outer[1]),
        None => Layout::default()
            .constraints([Constraint::Min(0)])
            .split(outer[1]),
    };

    let empty_message = empty_message(app);
    let tracks: Vec<&Track> = app.sequencer.visible_tracks().collect();
    app.playlist.draw(
        f,
        main[0],
        &tracks,
        &app.player_state,
        &empty_message,
        &app.theme,
    );

    if let Some(visualizer) = &app.visualizer {
        draw_visualizer(f, main[1], visualizer, &app.theme);
    }

    draw_player(f, outer[2], app);

    draw_footer(f, outer[3], app);
}

fn empty_message(app: &App) -> String {
    match &app.catalog_status {
        CatalogStatus::Loading => "Loading catalog…".to_string(),
        CatalogStatus::Failed(message) => format!("Catalog unavailable: {message}"),
        CatalogStatus::Ready if app.sequencer.tracks().is_empty() => {
            "The catalog has no tracks".to_string()
        }
        CatalogStatus::Ready => format!("No tracks match \"{}\"", app.sequencer.view().query()),
    }
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.status_message {
        Some(message) => Line::from(Span::raw(message.as_str()).fg(app.theme.error_colour)),
        None => Line::from(Span::raw(HELP).fg(app.theme.muted_text_colour)),
    };

    f.render_widget(Paragraph::new(line), area);
}
