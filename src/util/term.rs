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

//! Terminal emulator escape sequences.

use std::io::{self, Write};

/// Sets the terminal background colour (OSC 11).
pub(crate) fn set_terminal_bg(hex_color: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\x1b]11;{hex_color}\x07")?;
    stdout.flush()
}

/// Restores the terminal's own background colour (OSC 111).
pub(crate) fn reset_terminal_bg() -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\x1b]111\x07")?;
    stdout.flush()
}
