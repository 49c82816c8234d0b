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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the player: the immutable
//! [`Track`] records supplied by the catalog, and the [`PlayerState`] snapshot
//! owned by the sequencer and observed by the user interface.

pub(crate) mod order;
pub(crate) mod search;

/// A single playable item from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Track {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) album: Option<String>,
    pub(crate) cover: Option<String>,
    pub(crate) source: String,
    pub(crate) year: Option<u32>,
    pub(crate) duration_seconds: Option<f64>,
}

/// How the sequencer behaves when it runs off either end of the play order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    /// The next mode in the `Off -> All -> One -> Off` cycle.
    pub(crate) fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Why the sequencer is being asked to move to the next track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AdvanceReason {
    /// The listener asked for the next track.
    Manual,
    /// The current track played through to the end.
    NaturalEnd,
}

/// Snapshot of everything the interface needs to reflect playback.
///
/// There is exactly one live instance, owned by the
/// [`Sequencer`](crate::sequencer::Sequencer); observers receive clones.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlayerState {
    pub(crate) current_track_id: Option<String>,
    pub(crate) is_playing: bool,
    pub(crate) is_muted: bool,
    pub(crate) shuffle_enabled: bool,
    pub(crate) repeat_mode: RepeatMode,
    pub(crate) volume: f64,
    pub(crate) last_non_zero_volume: f64,
    pub(crate) last_error: Option<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_track_id: None,
            is_playing: false,
            is_muted: false,
            shuffle_enabled: false,
            repeat_mode: RepeatMode::Off,
            volume: 1.0,
            last_non_zero_volume: 1.0,
            last_error: None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_mode_cycles_through_all_three() {
        let mut mode = RepeatMode::default();
        let mut seen = vec![mode];
        for _ in 0..3 {
            mode = mode.cycle();
            seen.push(mode);
        }

        assert_eq!(
            seen,
            vec![RepeatMode::Off, RepeatMode::All, RepeatMode::One, RepeatMode::Off]
        );
    }
}
