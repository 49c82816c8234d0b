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

//! MPV-backed audio playback engine and event processing.
//!
//! This module provides the production [`AudioBackend`], leveraging `libmpv`
//! for audio decoding and output. It manages a background worker thread that
//! bridges the gap between the adapter's command-based interface and the
//! low-level MPV property observation system.
//!
//! # Architecture
//!
//! The engine operates using a dual-channel communication pattern:
//! 1. **Command Channel**: Receives [`BackendCommand`]s from the adapter to
//!    control playback (load, pause, seek, volume).
//! 2. **Event Channel**: Broadcasts [`PlayerEvent`]s, wrapped in
//!    [`AppEvent::Player`], to report progress, duration, natural completion
//!    and failures.
//!
//! Each event is tagged with the generation of the load it belongs to. Before
//! a new file replaces the current one, events mpv has already queued are
//! flushed under the old generation.
//!
//! The worker exits when the command channel is dropped.

use anyhow::{Context, Result};
use mpv::Format;
use std::{
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread,
};

use crate::{
    events::AppEvent,
    player::{AudioBackend, PlaybackError, PlayerEvent},
};

#[derive(Debug)]
pub(crate) enum BackendCommand {
    Load { source: String, generation: u64 },
    Unload,
    SetPaused(bool),
    Seek(f64),
    SetVolume(f64),
}

/// A handle to the MPV worker thread.
///
/// This struct acts as a command proxy; it does not perform audio processing
/// itself but instead sends instructions to the background worker.
pub(crate) struct MpvBackend {
    command_tx: Sender<BackendCommand>,
}

impl MpvBackend {
    /// Spawns the audio worker thread and returns a handle to it.
    ///
    /// # Arguments
    ///
    /// * `event_tx` - A channel to send playback notifications back to the
    ///   main event loop.
    pub(crate) fn spawn(event_tx: Sender<AppEvent>) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<BackendCommand>();

        spawn_player_worker(command_rx, event_tx);

        Self { command_tx }
    }

    fn send(&self, command: BackendCommand) -> Result<(), PlaybackError> {
        self.command_tx
            .send(command)
            .map_err(|_| PlaybackError::Disconnected)
    }
}

impl AudioBackend for MpvBackend {
    fn load(&mut self, source: &str, generation: u64) -> Result<(), PlaybackError> {
        self.send(BackendCommand::Load {
            source: source.to_string(),
            generation,
        })
    }

    fn unload(&mut self) -> Result<(), PlaybackError> {
        self.send(BackendCommand::Unload)
    }

    fn set_paused(&mut self, paused: bool) -> Result<(), PlaybackError> {
        self.send(BackendCommand::SetPaused(paused))
    }

    fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        self.send(BackendCommand::Seek(seconds))
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), PlaybackError> {
        self.send(BackendCommand::SetVolume(volume))
    }
}

/// Spawns the audio worker thread to process playback commands.
///
/// If the worker cannot start (for example libmpv is missing) the failure is
/// reported as an application error and the command receiver is dropped, so
/// every later command fails with [`PlaybackError::Disconnected`] instead of
/// taking the application down.
fn spawn_player_worker(command_rx: Receiver<BackendCommand>, event_tx: Sender<AppEvent>) {
    let error_tx = event_tx.clone();

    thread::spawn(move || {
        if let Err(e) = audio_player_worker(command_rx, event_tx) {
            tracing::error!(error = ?e, "mpv worker stopped");
            let _ = error_tx.send(AppEvent::Error(format!("audio backend failure: {e:#}")));
        }
    });
}

/// The primary execution loop for the audio player backend.
///
/// This function initializes a local `libmpv` context and alternates between
/// draining incoming commands and waiting briefly for MPV events.
fn audio_player_worker(
    command_rx: Receiver<BackendCommand>,
    event_tx: Sender<AppEvent>,
) -> Result<()> {
    let mut handler = (|| {
        let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
        builder
            .set_option("vo", "null")
            .context("Failed to set no video output")?;
        builder.build().context("Failed to build MPV handler")
    })()?;

    handler
        .observe_property::<f64>("duration", 0)
        .context("Failed to observe duration")?;
    handler
        .observe_property::<f64>("time-pos", 0)
        .context("Failed to observe time-pos")?;

    tracing::info!("mpv worker started");

    let mut generation = 0;
    while process_commands(&mut handler, &command_rx, &event_tx, &mut generation)? {
        process_mpv_event(&mut handler, &event_tx, generation, 0.05)?;
    }

    tracing::info!("mpv worker shutting down");
    Ok(())
}

/// Drains and executes all pending commands.
///
/// Returns `false` once the adapter has gone away. Individual command failures
/// are logged, and load failures reported, without stopping the worker.
fn process_commands(
    handler: &mut mpv::MpvHandler,
    command_rx: &Receiver<BackendCommand>,
    event_tx: &Sender<AppEvent>,
    generation: &mut u64,
) -> Result<bool> {
    loop {
        let command = match command_rx.try_recv() {
            Ok(command) => command,
            Err(TryRecvError::Empty) => return Ok(true),
            Err(TryRecvError::Disconnected) => return Ok(false),
        };

        tracing::trace!(?command, "mpv command");

        if let BackendCommand::Load { generation: next, .. } = &command {
            while process_mpv_event(handler, event_tx, *generation, 0.0)? {}
            *generation = *next;
        }

        let result = match &command {
            BackendCommand::Load { source, .. } => handler
                .set_property("pause", true)
                .and_then(|_| handler.command(&["loadfile", source, "replace"])),
            BackendCommand::Unload => handler.command(&["stop"]),
            BackendCommand::SetPaused(paused) => handler.set_property("pause", *paused),
            BackendCommand::Seek(seconds) => {
                handler.command(&["seek", &format!("{seconds:.3}"), "absolute"])
            }
            BackendCommand::SetVolume(volume) => handler.set_property("volume", volume * 100.0),
        };

        if let Err(e) = result {
            tracing::warn!(?command, error = ?e, "mpv command failed");
            if let BackendCommand::Load { source, generation } = command {
                event_tx
                    .send(AppEvent::Player {
                        generation,
                        event: PlayerEvent::Failed(format!("could not load {source}: {e:?}")),
                    })
                    .context("Failed to send load failure")?;
            }
        }
    }
}

/// Waits up to `timeout` seconds for one MPV event and forwards it, tagged
/// with `generation`, if the adapter cares about it.
///
/// Returns whether an event was waiting.
fn process_mpv_event(
    handler: &mut mpv::MpvHandler,
    event_tx: &Sender<AppEvent>,
    generation: u64,
    timeout: f64,
) -> Result<bool> {
    if let Some(mpv_event) = handler.wait_event(timeout) {
        let player_event = match mpv_event {
            mpv::Event::PropertyChange { name, change, .. } => match (name, change) {
                ("duration", Format::Double(duration)) => Some(PlayerEvent::DurationChanged(duration)),
                ("time-pos", Format::Double(seconds)) if seconds >= 0.0 => {
                    Some(PlayerEvent::TimeChanged(seconds))
                }
                _ => None,
            },
            mpv::Event::EndFile(Ok(mpv::EndFileReason::MPV_END_FILE_REASON_EOF)) => {
                Some(PlayerEvent::TrackFinished)
            }
            mpv::Event::EndFile(Err(e)) => Some(PlayerEvent::Failed(format!("{e:?}"))),
            _ => None,
        };

        if let Some(event) = player_event {
            event_tx
                .send(AppEvent::Player { generation, event })
                .context("Failed to send player event")?;
        }

        return Ok(true);
    }

    Ok(false)
}
