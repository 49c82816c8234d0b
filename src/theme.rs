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

//! Visual styling and color configuration for the TUI.
//!
//! This module defines the dark and light palettes and provides utilities for
//! converting colors between Ratatui's internal representation and the
//! hexadecimal strings used for terminal emulator styling.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// The persisted theme preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl ThemeName {
    pub(crate) fn toggle(self) -> Self {
        match self {
            ThemeName::Dark => ThemeName::Light,
            ThemeName::Light => ThemeName::Dark,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Theme {
    pub(crate) name: ThemeName,

    pub(crate) background_colour: Color,
    pub(crate) text_colour: Color,
    pub(crate) muted_text_colour: Color,
    pub(crate) accent_colour: Color,
    pub(crate) border_colour: Color,
    pub(crate) gauge_track_colour: Color,
    pub(crate) error_colour: Color,

    pub(crate) highlight_bg: Color,
    pub(crate) highlight_fg: Color,

    pub(crate) table_time_fg: Color,
    pub(crate) table_artist_fg: Color,
    pub(crate) table_album_fg: Color,
    pub(crate) table_track_fg: Color,

    /// Bar colours from the bottom of the spectrum to the top.
    pub(crate) bar_low: Color,
    pub(crate) bar_mid: Color,
    pub(crate) bar_high: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub(crate) fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    pub(crate) const fn dark() -> Self {
        Self {
            name: ThemeName::Dark,

            background_colour: Color::Rgb(40, 20, 50),
            text_colour: Color::Rgb(255, 255, 255),
            muted_text_colour: Color::Rgb(162, 161, 166),
            accent_colour: Color::Rgb(250, 189, 47),
            border_colour: Color::Rgb(102, 102, 102),
            gauge_track_colour: Color::Rgb(50, 30, 60),
            error_colour: Color::Rgb(255, 107, 107),

            highlight_bg: Color::Rgb(70, 90, 200),
            highlight_fg: Color::Rgb(255, 255, 255),

            table_time_fg: Color::Rgb(162, 161, 166),
            table_artist_fg: Color::Rgb(255, 215, 0),
            table_album_fg: Color::Rgb(179, 157, 219),
            table_track_fg: Color::Rgb(255, 255, 255),

            bar_low: Color::Rgb(179, 157, 219),
            bar_mid: Color::Rgb(250, 189, 47),
            bar_high: Color::Rgb(255, 107, 107),
        }
    }

    pub(crate) const fn light() -> Self {
        Self {
            name: ThemeName::Light,

            background_colour: Color::Rgb(246, 244, 240),
            text_colour: Color::Rgb(30, 30, 36),
            muted_text_colour: Color::Rgb(110, 108, 118),
            accent_colour: Color::Rgb(176, 86, 0),
            border_colour: Color::Rgb(190, 186, 180),
            gauge_track_colour: Color::Rgb(225, 220, 212),
            error_colour: Color::Rgb(190, 30, 45),

            highlight_bg: Color::Rgb(60, 80, 170),
            highlight_fg: Color::Rgb(255, 255, 255),

            table_time_fg: Color::Rgb(110, 108, 118),
            table_artist_fg: Color::Rgb(150, 90, 0),
            table_album_fg: Color::Rgb(100, 70, 160),
            table_track_fg: Color::Rgb(30, 30, 36),

            bar_low: Color::Rgb(100, 70, 160),
            bar_mid: Color::Rgb(176, 86, 0),
            bar_high: Color::Rgb(190, 30, 45),
        }
    }

    /// Converts a [`ratatui::style::Color`] into a CSS-style hexadecimal
    /// string.
    ///
    /// This is primarily used to set the terminal emulator's background color
    /// via escape sequences. Non-RGB colours have no hex form.
    pub(crate) fn to_hex(colour: Color) -> Option<String> {
        match colour {
            Color::Rgb(r, g, b) => Some(format!("#{:02x}{:02x}{:02x}", r, g, b)),
            _ => None,
        }
    }
}
