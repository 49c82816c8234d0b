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

//! Spectrum bars.

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::{
    theme::Theme,
    visualizer::{Visualizer, VisualizerStatus},
};

/// Partial blocks indexed by eighths of a cell.
const BLOCKS: [&str; 9] = [" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];

pub(crate) fn draw_visualizer(f: &mut Frame, area: Rect, visualizer: &Visualizer, theme: &Theme) {
    let block = Block::default()
        .title(" Visualizer ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_colour));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if visualizer.status() == VisualizerStatus::Unavailable {
        let message = Paragraph::new("No analysis for this track")
            .style(Style::default().fg(theme.muted_text_colour))
            .alignment(Alignment::Center);
        f.render_widget(message, inner);
        return;
    }

    f.render_widget(
        SpectrumBars {
            bars: visualizer.bars(),
            theme,
        },
        inner,
    );
}

/// Vertical bars drawn with eighth-block glyphs, lowest frequency on the
/// left.
pub(crate) struct SpectrumBars<'a> {
    pub(crate) bars: &'a [f32],
    pub(crate) theme: &'a Theme,
}

impl SpectrumBars<'_> {
    fn colour(&self, row: usize, height: usize) -> Color {
        let fraction = (row + 1) as f32 / height.max(1) as f32;
        if fraction > 0.8 {
            self.theme.bar_high
        } else if fraction > 0.5 {
            self.theme.bar_mid
        } else {
            self.theme.bar_low
        }
    }
}

impl Widget for SpectrumBars<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let count = self.bars.len();
        if count == 0 || area.is_empty() {
            return;
        }

        let width = area.width as usize;
        let height = area.height as usize;
        let slot = (width / count).max(1);

        for x in 0..width {
            // Too narrow for one column per bar: sample the bars instead.
            let bar = if width >= count { x / slot } else { x * count / width };
            if bar >= count {
                break;
            }
            if slot > 1 && x % slot == slot - 1 {
                continue;
            }

            let level = self.bars[bar].clamp(0.0, 1.0);
            let eighths = (level * (height * 8) as f32).round() as usize;

            for row in 0..height {
                let filled = eighths.saturating_sub(row * 8);
                if filled == 0 {
                    break;
                }

                let position = (area.x + x as u16, area.bottom() - 1 - row as u16);
                if let Some(cell) = buf.cell_mut(position) {
                    cell.set_symbol(BLOCKS[filled.min(8)])
                        .set_fg(self.colour(row, height));
                }
            }
        }
    }
}
