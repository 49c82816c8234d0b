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

//! Playlist search filtering.
//!
//! This module provides the filtered [`PlaylistView`] over the canonical track
//! list, and the [`SearchDebounce`] used to coalesce keystrokes in the search
//! box before the view is recomputed.

use std::time::{Duration, Instant};

use crate::model::Track;

/// An ordered, filtered subsequence of the canonical track list.
///
/// The view stores indices into the canonical list rather than copies of the
/// tracks, so it can never disagree with the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PlaylistView {
    query: String,
    indices: Vec<usize>,
}

impl PlaylistView {
    /// A view containing every track, in catalog order.
    pub(crate) fn all(tracks: &[Track]) -> Self {
        Self {
            query: String::new(),
            indices: (0..tracks.len()).collect(),
        }
    }

    /// A view containing the tracks whose title, artist or album contain
    /// `query`, ignoring case. Surrounding whitespace is ignored and a blank
    /// query matches everything.
    pub(crate) fn filter(tracks: &[Track], query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Self::all(tracks);
        }

        let indices = tracks
            .iter()
            .enumerate()
            .filter(|(_, track)| matches(track, &needle))
            .map(|(idx, _)| idx)
            .collect();

        Self {
            query: query.to_string(),
            indices,
        }
    }

    pub(crate) fn query(&self) -> &str {
        &self.query
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub(crate) fn len(&self) -> usize {
        self.indices.len()
    }

    /// Position within the view of the given canonical index, if visible.
    pub(crate) fn position_of(&self, canonical: usize) -> Option<usize> {
        self.indices.iter().position(|&idx| idx == canonical)
    }
}

/// Case-insensitive substring match; `needle` must already be lowercase.
fn matches(track: &Track, needle: &str) -> bool {
    track.title.to_lowercase().contains(needle)
        || track.artist.to_lowercase().contains(needle)
        || track
            .album
            .as_deref()
            .is_some_and(|album| album.to_lowercase().contains(needle))
}

/// Holds back a search query until typing pauses.
///
/// Scheduling a new query replaces (cancels) any query still pending, so only
/// the last keystroke within the window causes a recompute.
#[derive(Debug)]
pub(crate) struct SearchDebounce {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl SearchDebounce {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub(crate) fn schedule(&mut self, query: String, now: Instant) {
        self.pending = Some((query, now + self.delay));
    }

    /// Returns the pending query once its deadline has passed.
    pub(crate) fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(q, _)| q),
            _ => None,
        }
    }

    /// Returns the pending query immediately, regardless of its deadline.
    pub(crate) fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(q, _)| q)
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
