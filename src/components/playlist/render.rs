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

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Table, Wrap},
};

use crate::{
    components::PlaylistTable,
    model::{PlayerState, Track},
    render::icons::{ICON_PAUSE, ICON_PLAY},
    theme::Theme,
    util::format::format_time,
};

impl PlaylistTable {
    /// Draws the visible tracks, or `empty_message` when there are none.
    pub(crate) fn draw(
        &mut self,
        f: &mut Frame,
        area: Rect,
        tracks: &[&Track],
        state: &PlayerState,
        empty_message: &str,
        theme: &Theme,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let total: f64 = tracks.iter().filter_map(|t| t.duration_seconds).sum();
        let header = Paragraph::new(format!(
            "Playlist | {} tracks | {}",
            tracks.len(),
            format_time(total)
        ))
        .style(Style::default().fg(theme.text_colour))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.border_colour))
                .padding(Padding::horizontal(1)),
        );
        f.render_widget(header, chunks[0]);

        if tracks.is_empty() {
            let message = Paragraph::new(empty_message)
                .style(Style::default().fg(theme.muted_text_colour))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().padding(Padding::top(1)));
            f.render_widget(message, chunks[1]);
            return;
        }

        let current = state.current_track_id.as_deref();
        let rows = tracks.iter().map(|track| {
            let indicator = match current {
                Some(id) if id == track.id && state.is_playing => ICON_PLAY,
                Some(id) if id == track.id => ICON_PAUSE,
                _ => "",
            };

            let time = track.duration_seconds.map(format_time).unwrap_or_default();

            let row = Row::new(vec![
                Cell::from(Line::from(indicator).style(Style::default().fg(theme.accent_colour))),
                Cell::from(
                    Line::from(time)
                        .style(Style::default().fg(theme.table_time_fg))
                        .alignment(Alignment::Right),
                ),
                Cell::from(""),
                Cell::from(Line::from(track.artist.as_str()).style(Style::default().fg(theme.table_artist_fg))),
                Cell::from(
                    Line::from(track.album.as_deref().unwrap_or_default())
                        .style(Style::default().fg(theme.table_album_fg)),
                ),
                Cell::from(Line::from(track.title.as_str()).style(Style::default().fg(theme.table_track_fg))),
            ]);

            if Some(track.id.as_str()) == current {
                row.bold()
            } else {
                row
            }
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(2),
                Constraint::Length(7),
                Constraint::Length(1),
                Constraint::Percentage(25),
                Constraint::Percentage(30),
                Constraint::Percentage(45),
            ],
        )
        .header(
            Row::new(vec![
                Cell::from(""),
                Cell::from(Line::from("Time").alignment(Alignment::Right)),
                Cell::from(""),
                Cell::from("Artist"),
                Cell::from("Album"),
                Cell::from("Title"),
            ])
            .style(Style::default().bold().fg(theme.accent_colour))
            .bottom_margin(1),
        )
        .row_highlight_style(Style::default().bg(theme.highlight_bg).fg(theme.highlight_fg));

        f.render_stateful_widget(table, chunks[1], &mut self.table_state);
    }
}
