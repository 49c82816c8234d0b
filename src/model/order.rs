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

//! Playback order.
//!
//! Tracks either play in the order of the (possibly filtered) playlist view,
//! or in a shuffled permutation of the whole catalog.

use rand::{rng, seq::SliceRandom};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) enum PlaybackOrder {
    /// Follow the playlist view.
    #[default]
    Sequential,
    /// Follow a permutation of every canonical index.
    Shuffled(Vec<usize>),
}

impl PlaybackOrder {
    /// Builds a fresh shuffled order over `len` canonical tracks, with
    /// `pinned` (the track playing when shuffle was switched on) first.
    pub(crate) fn shuffled(len: usize, pinned: Option<usize>) -> Self {
        let pinned = pinned.filter(|&idx| idx < len);

        let mut order: Vec<usize> = (0..len).filter(|&idx| Some(idx) != pinned).collect();
        order.shuffle(&mut rng());

        if let Some(idx) = pinned {
            order.insert(0, idx);
        }

        PlaybackOrder::Shuffled(order)
    }

    pub(crate) fn is_shuffled(&self) -> bool {
        matches!(self, PlaybackOrder::Shuffled(_))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    fn indices(order: &PlaybackOrder) -> &[usize] {
        match order {
            PlaybackOrder::Shuffled(order) => order,
            PlaybackOrder::Sequential => panic!("expected a shuffled order"),
        }
    }

    #[test]
    fn empty_catalog_shuffles_to_nothing() {
        assert_eq!(PlaybackOrder::shuffled(0, None), PlaybackOrder::Shuffled(vec![]));
        assert_eq!(PlaybackOrder::shuffled(0, Some(3)), PlaybackOrder::Shuffled(vec![]));
    }

    proptest! {
        #[test]
        fn shuffled_order_is_a_permutation_with_pinned_head(len in 1usize..200, pin in any::<prop::sample::Index>()) {
            let pinned = pin.index(len);
            let order = PlaybackOrder::shuffled(len, Some(pinned));
            let order = indices(&order);

            prop_assert_eq!(order.len(), len);
            prop_assert_eq!(order[0], pinned);

            let unique: HashSet<usize> = order.iter().copied().collect();
            prop_assert_eq!(unique.len(), len);
            prop_assert!(order.iter().all(|&idx| idx < len));
        }
    }
}
