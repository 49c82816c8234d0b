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

//! Audio playback control and state management.
//!
//! This module provides the [`AudioPlayer`] adapter used by the sequencer to
//! control music playback. The adapter owns exactly one [`AudioBackend`] and
//! keeps the bookkeeping the backend does not: which source is attached, the
//! last reported position and duration, and the volume/mute pair.
//!
//! The production backend is [`MpvBackend`], which forwards commands to a
//! background worker thread so that heavy audio operations never block the
//! main application thread.

mod commands;

use thiserror::Error;

pub(crate) use commands::MpvBackend;

use crate::model::Track;

/// Failures surfaced by the playback adapter.
///
/// None of these are fatal: the sequencer records them and carries on with
/// playback stopped.
#[derive(Debug, Error, Clone, PartialEq)]
pub(crate) enum PlaybackError {
    #[error("audio backend is not running")]
    Disconnected,

    #[error("no track is loaded")]
    NothingLoaded,

    #[error("failed to play {source_ref}: {reason}")]
    Failed { source_ref: String, reason: String },
}

/// Notifications reported by a backend, delivered through the application
/// event channel together with the generation of the load they belong to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlayerEvent {
    DurationChanged(f64),
    TimeChanged(f64),
    TrackFinished,
    Failed(String),
}

/// What the sequencer needs to react to after the adapter consumes a
/// [`PlayerEvent`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlaybackNotice {
    Ended,
    Failed(PlaybackError),
}

/// The raw capability wrapped by [`AudioPlayer`].
pub(crate) trait AudioBackend {
    /// Attaches `source` in a paused state. Every event reported for this
    /// source must carry `generation`.
    fn load(&mut self, source: &str, generation: u64) -> Result<(), PlaybackError>;

    /// Releases whatever source is attached.
    fn unload(&mut self) -> Result<(), PlaybackError>;

    fn set_paused(&mut self, paused: bool) -> Result<(), PlaybackError>;

    /// Moves to an absolute position in seconds.
    fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError>;

    /// Sets the output volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f64) -> Result<(), PlaybackError>;
}

/// The playback engine adapter.
pub(crate) struct AudioPlayer {
    backend: Box<dyn AudioBackend>,

    /// Source reference of the attached track.
    loaded: Option<String>,

    /// Set once the backend finished the attached source and released it; the
    /// next `play` attaches it again.
    needs_reload: bool,

    /// Guards against reporting the same natural completion twice.
    end_reported: bool,

    /// Bumped on every attach; events tagged with an older value are stale.
    generation: u64,

    elapsed: f64,
    duration: Option<f64>,

    volume: f64,
    muted: bool,
    last_non_zero_volume: f64,
}

impl AudioPlayer {
    /// Creates an adapter over `backend` and applies the initial volume.
    pub(crate) fn new(backend: Box<dyn AudioBackend>, volume: f64, muted: bool) -> Self {
        let volume = sanitise_volume(volume);

        let mut player = Self {
            backend,
            loaded: None,
            needs_reload: false,
            end_reported: false,
            generation: 0,
            elapsed: 0.0,
            duration: None,
            volume,
            muted,
            last_non_zero_volume: if volume > 0.0 { volume } else { 1.0 },
        };

        if let Err(e) = player.apply_volume() {
            tracing::warn!(error = %e, "failed to apply initial volume");
        }

        player
    }

    /// Attaches `track`, releasing any previously attached source first.
    pub(crate) fn load(&mut self, track: &Track) -> Result<(), PlaybackError> {
        if self.loaded.take().is_some() {
            self.backend.unload()?;
        }

        self.elapsed = 0.0;
        self.duration = track.duration_seconds;
        self.end_reported = false;
        self.needs_reload = false;

        self.attach(&track.source)?;
        self.loaded = Some(track.source.clone());

        Ok(())
    }

    pub(crate) fn play(&mut self) -> Result<(), PlaybackError> {
        let source = self.loaded.clone().ok_or(PlaybackError::NothingLoaded)?;

        if self.needs_reload {
            self.attach(&source)?;
            self.needs_reload = false;
            self.end_reported = false;
            self.elapsed = 0.0;
        }

        self.backend.set_paused(false)
    }

    pub(crate) fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.loaded.is_none() {
            return Ok(());
        }

        self.backend.set_paused(true)
    }

    /// Pauses and rewinds, keeping the source attached.
    pub(crate) fn stop(&mut self) -> Result<(), PlaybackError> {
        if self.loaded.is_none() {
            return Ok(());
        }

        self.backend.set_paused(true)?;
        if !self.needs_reload {
            self.backend.seek(0.0)?;
        }
        self.elapsed = 0.0;

        Ok(())
    }

    /// Moves to `seconds`, clamped into `[0, duration]`.
    pub(crate) fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        if self.loaded.is_none() {
            return Ok(());
        }

        let target = self.clamp_position(seconds);
        self.elapsed = target;
        self.end_reported = false;

        // A finished source is re-attached by `play`, which starts from zero.
        if self.needs_reload {
            return Ok(());
        }

        self.backend.seek(target)
    }

    pub(crate) fn set_volume(&mut self, volume: f64) -> Result<(), PlaybackError> {
        let volume = sanitise_volume(volume);
        self.volume = volume;
        if volume > 0.0 {
            self.last_non_zero_volume = volume;
        }

        self.apply_volume()
    }

    /// Mutes, or unmutes restoring the last audible volume.
    pub(crate) fn toggle_mute(&mut self) -> Result<(), PlaybackError> {
        if self.muted {
            self.muted = false;
            if self.volume <= 0.0 {
                self.volume = self.last_non_zero_volume;
            }
        } else {
            self.muted = true;
        }

        self.apply_volume()
    }

    /// Consumes a backend notification, updating the cached position and
    /// duration. Events left over from an earlier load are dropped.
    pub(crate) fn on_event(&mut self, generation: u64, event: PlayerEvent) -> Option<PlaybackNotice> {
        if generation != self.generation {
            tracing::trace!(generation, current = self.generation, ?event, "dropping stale player event");
            return None;
        }

        match event {
            PlayerEvent::TimeChanged(seconds) if seconds.is_finite() => {
                self.elapsed = seconds.max(0.0);
                None
            }
            PlayerEvent::DurationChanged(seconds) if seconds.is_finite() && seconds > 0.0 => {
                self.duration = Some(seconds);
                None
            }
            PlayerEvent::TrackFinished => {
                if self.loaded.is_none() || self.end_reported {
                    return None;
                }

                self.end_reported = true;
                self.needs_reload = true;
                if let Some(duration) = self.duration {
                    self.elapsed = duration;
                }

                Some(PlaybackNotice::Ended)
            }
            PlayerEvent::Failed(reason) => {
                self.needs_reload = self.loaded.is_some();

                Some(PlaybackNotice::Failed(PlaybackError::Failed {
                    source_ref: self.loaded.clone().unwrap_or_default(),
                    reason,
                }))
            }
            _ => None,
        }
    }

    /// Generation of the most recent attach.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub(crate) fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub(crate) fn volume(&self) -> f64 {
        self.volume
    }

    pub(crate) fn is_muted(&self) -> bool {
        self.muted
    }

    pub(crate) fn last_non_zero_volume(&self) -> f64 {
        self.last_non_zero_volume
    }

    /// The volume actually sent to the backend.
    pub(crate) fn effective_volume(&self) -> f64 {
        if self.muted { 0.0 } else { self.volume }
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn attach(&mut self, source: &str) -> Result<(), PlaybackError> {
        self.generation += 1;
        self.backend.load(source, self.generation)
    }

    fn apply_volume(&mut self) -> Result<(), PlaybackError> {
        let volume = self.effective_volume();
        self.backend.set_volume(volume)
    }

    fn clamp_position(&self, seconds: f64) -> f64 {
        if !seconds.is_finite() {
            return 0.0;
        }

        match self.duration {
            Some(duration) => seconds.clamp(0.0, duration),
            None => seconds.max(0.0),
        }
    }
}

fn sanitise_volume(volume: f64) -> f64 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A recording backend used in place of mpv.

    use std::{cell::RefCell, rc::Rc};

    use super::{AudioBackend, PlaybackError};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Load(String),
        Unload,
        Paused(bool),
        Seek(f64),
        Volume(f64),
    }

    #[derive(Default)]
    pub(crate) struct Recorder {
        pub(crate) calls: Vec<Call>,
        pub(crate) disconnected: bool,
    }

    impl Recorder {
        /// Source currently attached, according to the recorded calls.
        pub(crate) fn attached(&self) -> Option<&str> {
            let mut attached = None;
            for call in &self.calls {
                match call {
                    Call::Load(source) => attached = Some(source.as_str()),
                    Call::Unload => attached = None,
                    _ => {}
                }
            }
            attached
        }

        pub(crate) fn last_volume(&self) -> Option<f64> {
            self.calls.iter().rev().find_map(|call| match call {
                Call::Volume(v) => Some(*v),
                _ => None,
            })
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeBackend {
        pub(crate) recorder: Rc<RefCell<Recorder>>,
    }

    impl FakeBackend {
        fn record(&self, call: Call) -> Result<(), PlaybackError> {
            let mut recorder = self.recorder.borrow_mut();
            if recorder.disconnected {
                return Err(PlaybackError::Disconnected);
            }
            recorder.calls.push(call);
            Ok(())
        }
    }

    impl AudioBackend for FakeBackend {
        fn load(&mut self, source: &str, _generation: u64) -> Result<(), PlaybackError> {
            self.record(Call::Load(source.to_string()))
        }

        fn unload(&mut self) -> Result<(), PlaybackError> {
            self.record(Call::Unload)
        }

        fn set_paused(&mut self, paused: bool) -> Result<(), PlaybackError> {
            self.record(Call::Paused(paused))
        }

        fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError> {
            self.record(Call::Seek(seconds))
        }

        fn set_volume(&mut self, volume: f64) -> Result<(), PlaybackError> {
            self.record(Call::Volume(volume))
        }
    }
}
