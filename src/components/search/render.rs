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
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::{components::SearchBox, theme::Theme};

impl SearchBox {
    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let border = if self.active {
            theme.accent_colour
        } else {
            theme.border_colour
        };

        let block = Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);

        let text = if self.input.value().is_empty() && !self.active {
            Paragraph::new("Press / to search by title, artist or album")
                .style(Style::default().fg(theme.muted_text_colour))
        } else {
            let scroll = self.input.visual_scroll(inner.width as usize);
            Paragraph::new(self.input.value())
                .style(Style::default().fg(theme.text_colour))
                .scroll((0, scroll as u16))
        };

        f.render_widget(text.block(block), area);

        if self.active {
            let scroll = self.input.visual_scroll(inner.width as usize);
            let cursor_x = inner.x + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            f.set_cursor_position((cursor_x, inner.y));
        }
    }
}
