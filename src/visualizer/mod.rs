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

//! Frequency visualizer.
//!
//! Each display frame the [`Visualizer`] pulls a snapshot of frequency bin
//! intensities from a [`FrequencySource`], folds the bins onto a smaller
//! number of bars using a power-law index mapping (so the low end gets more
//! bars), and smooths each bar so that it decays instead of flickering.
//!
//! The visualizer only reads audio analysis data. It never touches the
//! playback state.

pub(crate) mod analyser;
pub(crate) mod ticker;

pub(crate) use analyser::TrackAnalyser;
pub(crate) use ticker::FrameTicker;

/// Bars whose smoothed intensity falls below this are considered at rest.
const REST_THRESHOLD: f32 = 0.001;

/// Outcome of a single request for frequency data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Snapshot {
    /// The buffer holds fresh intensities in `[0, 1]`.
    Live,
    /// Nothing is playing right now; the buffer is untouched.
    Silent,
    /// Frequency analysis is not possible for the current audio.
    Unavailable,
}

/// A live source of frequency bin intensities.
pub(crate) trait FrequencySource {
    /// Number of bins written by [`frequency_data`](Self::frequency_data).
    fn bin_count(&self) -> usize;

    /// Fills `bins` (of length [`bin_count`](Self::bin_count)) with the
    /// latest intensities.
    fn frequency_data(&mut self, bins: &mut [f32]) -> Snapshot;
}

/// What the last tick saw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum VisualizerStatus {
    #[default]
    Idle,
    Live,
    Unavailable,
}

#[derive(Debug)]
pub(crate) struct Visualizer {
    bars: Vec<f32>,
    bins: Vec<f32>,
    exponent: f32,
    smoothing: f32,
    status: VisualizerStatus,
}

impl Visualizer {
    pub(crate) fn new(bar_count: usize, exponent: f32, smoothing: f32) -> Self {
        Self {
            bars: vec![0.0; bar_count.max(1)],
            bins: vec![],
            exponent: if exponent > 0.0 { exponent } else { 1.0 },
            smoothing: smoothing.clamp(0.0, 0.99),
            status: VisualizerStatus::Idle,
        }
    }

    /// Smoothed bar intensities in `[0, 1]`, lowest frequency first.
    pub(crate) fn bars(&self) -> &[f32] {
        &self.bars
    }

    pub(crate) fn status(&self) -> VisualizerStatus {
        self.status
    }

    /// True while any bar is still visibly moving.
    pub(crate) fn is_active(&self) -> bool {
        self.status == VisualizerStatus::Live || self.bars.iter().any(|&bar| bar > REST_THRESHOLD)
    }

    /// Advances the visualizer by one frame.
    pub(crate) fn tick(&mut self, source: &mut dyn FrequencySource) -> VisualizerStatus {
        let bin_count = source.bin_count();
        self.bins.resize(bin_count, 0.0);

        let snapshot = if bin_count == 0 {
            Snapshot::Unavailable
        } else {
            source.frequency_data(&mut self.bins)
        };

        let status = match snapshot {
            Snapshot::Live => {
                let bar_count = self.bars.len();
                for (i, bar) in self.bars.iter_mut().enumerate() {
                    let idx = bar_bin_index(i, bar_count, bin_count, self.exponent);
                    let value = self.bins[idx];
                    let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
                    *bar = smooth(value, *bar, self.smoothing);
                }
                VisualizerStatus::Live
            }
            Snapshot::Silent => {
                for bar in self.bars.iter_mut() {
                    *bar = smooth(0.0, *bar, self.smoothing);
                }
                VisualizerStatus::Idle
            }
            Snapshot::Unavailable => {
                if self.status != VisualizerStatus::Unavailable {
                    tracing::warn!("frequency analysis unavailable, visualizer idle");
                }
                self.bars.fill(0.0);
                VisualizerStatus::Unavailable
            }
        };

        self.status = status;
        status
    }
}

/// Maps bar `i` of `bar_count` onto a frequency bin using
/// `floor((i / bar_count)^k * (bin_count - 1))`.
pub(crate) fn bar_bin_index(i: usize, bar_count: usize, bin_count: usize, exponent: f32) -> usize {
    if bar_count == 0 || bin_count == 0 {
        return 0;
    }

    let ratio = i as f32 / bar_count as f32;
    let idx = (ratio.powf(exponent) * (bin_count - 1) as f32).floor() as usize;
    idx.min(bin_count - 1)
}

/// Peak-hold with exponential decay.
pub(crate) fn smooth(value: f32, previous: f32, factor: f32) -> f32 {
    value.max(previous * factor)
}
