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

//! Render the music player interface.
//!
//! This module renders the current track, the playback mode indicators, and
//! the position and volume gauges.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};

use crate::{
    App,
    model::RepeatMode,
    render::icons::{
        ICON_MUTED, ICON_PAUSE, ICON_PLAY, ICON_REPEAT, ICON_REPEAT_ONE, ICON_SHUFFLE, ICON_STOP,
        ICON_VOLUME_HIGH, ICON_VOLUME_LOW, ICON_VOLUME_MEDIUM,
    },
    util::format::format_time,
};

/// Renders the main player widget including track info and controls.
pub(crate) fn draw_player(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let state = &app.player_state;
    let player = app.sequencer.player();

    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border_colour))
        .padding(Padding::horizontal(1));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    let info_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(20)])
        .split(chunks[0]);

    let bold = Style::default().add_modifier(Modifier::BOLD);

    let icon = match (&state.current_track_id, state.is_playing) {
        (Some(_), true) => ICON_PLAY,
        (Some(_), false) => ICON_PAUSE,
        (None, _) => ICON_STOP,
    };

    let mut track_line = vec![Span::styled(format!(" {icon} "), bold).fg(theme.text_colour)];
    match app.sequencer.current_track() {
        Some(track) => {
            track_line.push(Span::styled(track.title.as_str(), bold).fg(theme.accent_colour));
            if let Some(album) = &track.album {
                track_line.push(Span::raw(" from ").fg(theme.text_colour));
                track_line.push(Span::styled(album.as_str(), bold).fg(theme.accent_colour));
            }
            track_line.push(Span::raw(" by ").fg(theme.text_colour));
            track_line.push(Span::styled(track.artist.as_str(), bold).fg(theme.accent_colour));
        }
        None => track_line.push(Span::raw("Nothing playing").fg(theme.muted_text_colour)),
    }
    f.render_widget(Paragraph::new(Line::from(track_line)), info_chunks[0]);

    let elapsed = player.elapsed();
    let duration = player
        .duration()
        .or_else(|| app.sequencer.current_track().and_then(|t| t.duration_seconds))
        .unwrap_or(0.0);

    if state.current_track_id.is_some() {
        let time_line = Line::from(vec![
            Span::styled(format_time(elapsed), bold).fg(theme.accent_colour),
            Span::styled(" / ", bold).fg(theme.text_colour),
            Span::styled(format_time(duration), bold).fg(theme.accent_colour),
        ]);
        f.render_widget(Paragraph::new(time_line).alignment(Alignment::Right), info_chunks[1]);
    }

    let control_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(30)])
        .split(chunks[2]);

    let lit = |on: bool| if on { theme.accent_colour } else { theme.muted_text_colour };
    let repeat_icon = match state.repeat_mode {
        RepeatMode::One => ICON_REPEAT_ONE,
        _ => ICON_REPEAT,
    };
    let repeat_label = match state.repeat_mode {
        RepeatMode::Off => "off",
        RepeatMode::All => "all",
        RepeatMode::One => "one",
    };
    let modes = Line::from(vec![
        Span::raw(format!(" {ICON_SHUFFLE} shuffle ")).fg(lit(state.shuffle_enabled)),
        Span::raw(format!(" {repeat_icon} repeat {repeat_label} "))
            .fg(lit(state.repeat_mode != RepeatMode::Off)),
    ]);

    let status = match &state.last_error {
        Some(error) => Line::from(Span::raw(error.as_str()).fg(theme.error_colour)),
        None => modes,
    };
    f.render_widget(Paragraph::new(status), control_chunks[0]);

    let volume_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(6)])
        .split(control_chunks[1]);

    let volume = player.effective_volume().clamp(0.0, 1.0);
    let volume_icon = match volume {
        _ if state.is_muted => ICON_MUTED,
        v if v >= 0.66 => ICON_VOLUME_HIGH,
        v if v >= 0.33 => ICON_VOLUME_MEDIUM,
        _ => ICON_VOLUME_LOW,
    };
    f.render_widget(Paragraph::new(volume_icon).fg(theme.text_colour), volume_layout[0]);

    let volume_gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.accent_colour).bg(theme.gauge_track_colour))
        .ratio(volume)
        .label("")
        .use_unicode(true);
    f.render_widget(volume_gauge, volume_layout[1]);

    let volume_label = Paragraph::new(format!(" {}%", (volume * 100.0).round() as u16))
        .alignment(Alignment::Right)
        .fg(theme.text_colour);
    f.render_widget(volume_label, volume_layout[2]);

    let position = if duration > 0.0 {
        (elapsed / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let position_gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.accent_colour).bg(theme.gauge_track_colour))
        .ratio(position)
        .label("")
        .use_unicode(true);

    f.render_widget(position_gauge, chunks[4]);
}
