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

//! # beats
//!
//! A terminal music player with a spectrum visualizer.
//!
//! This application coordinates a TUI frontend built with `ratatui`, an mpv
//! playback worker, and a handful of background producers.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** owns every piece of mutable state (the sequencer,
//!   the visualizer, the view components) and renders the UI.
//! * **Background Workers** load the catalog, drive mpv, decode audio for
//!   analysis and tick the display frames.
//! * Every producer talks to the main thread through a single
//!   `std::sync::mpsc` channel of [`AppEvent`]s.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is preserved even in the event of a crash.

mod catalog;
mod components;
mod config;
mod events;
mod logging;
mod model;
mod player;
mod render;
mod sequencer;
mod tasks;
mod theme;
mod util;
mod visualizer;

use std::{
    io,
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::{
    catalog::CatalogSource,
    components::{PlaylistTable, SearchBox},
    config::{AppConfig, ConfigFile},
    events::{AppEvent, process_events},
    model::PlayerState,
    player::{AudioBackend, AudioPlayer, MpvBackend},
    sequencer::Sequencer,
    tasks::AppTask,
    theme::Theme,
    visualizer::{FrameTicker, TrackAnalyser, Visualizer},
};

const DEFAULT_CATALOG: &str = "catalog.json";

/// Command-line options, layered over the configuration file.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON catalog of tracks to play.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Directory to scan for audio files, may be repeated.
    #[arg(long = "media-dir", value_name = "DIR")]
    media_dirs: Vec<PathBuf>,

    /// Run without the spectrum visualizer.
    #[arg(long)]
    no_visualizer: bool,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if self.catalog.is_some() || !self.media_dirs.is_empty() {
            config.catalog = self.catalog;
            config.media_dirs = self.media_dirs;
        }
        if self.no_visualizer {
            config.visualizer.enabled = false;
        }
    }
}

/// Where the catalog currently stands, for the playlist's empty state.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CatalogStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Application state.
pub(crate) struct App {
    /// The configuration in effect for this session, overrides included.
    pub(crate) config: AppConfig,
    config_file: ConfigFile,
    pub(crate) theme: Theme,

    pub(crate) event_tx: Sender<AppEvent>,
    pub(crate) event_rx: Receiver<AppEvent>,

    pub(crate) task_tx: Sender<AppTask>,

    pub(crate) sequencer: Sequencer,
    /// Last state published by the sequencer.
    pub(crate) player_state: PlayerState,

    pub(crate) search_box: SearchBox,
    pub(crate) playlist: PlaylistTable,

    pub(crate) visualizer: Option<Visualizer>,
    pub(crate) analyser: TrackAnalyser,
    pub(crate) ticker: Option<FrameTicker>,

    pub(crate) catalog_status: CatalogStatus,
    pub(crate) status_message: Option<String>,
}

impl App {
    /// Create a new instance of application state.
    pub(crate) fn new(
        config: AppConfig,
        config_file: ConfigFile,
        backend: Box<dyn AudioBackend>,
        event_tx: Sender<AppEvent>,
        event_rx: Receiver<AppEvent>,
        task_tx: Sender<AppTask>,
    ) -> Self {
        let player = AudioPlayer::new(backend, config.volume, config.muted);
        let mut sequencer = Sequencer::new(player);
        sequencer.subscribe(Box::new(event_tx.clone()));

        let visualizer = config.visualizer.enabled.then(|| {
            Visualizer::new(
                config.visualizer.bars,
                config.visualizer.exponent,
                config.visualizer.smoothing,
            )
        });

        Self {
            theme: Theme::from_name(config.theme),
            event_tx,
            event_rx,
            task_tx,
            player_state: sequencer.state().clone(),
            sequencer,
            search_box: SearchBox::new(Duration::from_millis(config.search_debounce_ms)),
            playlist: PlaylistTable::new(),
            visualizer,
            analyser: TrackAnalyser::new(),
            ticker: None,
            catalog_status: CatalogStatus::Loading,
            status_message: None,
            config,
            config_file,
        }
    }

    fn catalog_source(&self) -> CatalogSource {
        match &self.config.catalog {
            Some(path) => CatalogSource::File(path.clone()),
            None if !self.config.media_dirs.is_empty() => {
                CatalogSource::Directories(self.config.media_dirs.clone())
            }
            None => CatalogSource::File(PathBuf::from(DEFAULT_CATALOG)),
        }
    }

    /// Writes theme, volume and mute back to the configuration file.
    /// Command-line overrides stay in the session.
    pub(crate) fn save_preferences(&mut self) {
        let player = self.sequencer.player();
        let result =
            self.config_file
                .save_preferences(self.theme.name, player.volume(), player.is_muted());

        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to save preferences");
        }
    }
}

/// The entry point of the application.
///
/// Sets up logging and the communication channels, initializes the
/// application state, manages the terminal lifecycle, and returns an error if
/// any part of the execution fails.
fn main() -> Result<()> {
    let _log_guard = logging::init_logging()?;

    let config_file = ConfigFile::load();
    let mut config = config_file.config().clone();
    Cli::parse().apply(&mut config);

    let (event_tx, event_rx) = mpsc::channel();
    let (task_tx, task_rx) = mpsc::channel();

    let backend = MpvBackend::spawn(event_tx.clone());
    let mut app = App::new(
        config,
        config_file,
        Box::new(backend),
        event_tx,
        event_rx,
        task_tx,
    );

    let mut terminal = setup_terminal(&app)?;
    let res = run(&mut terminal, &mut app, task_rx);
    restore_terminal(&mut terminal);

    if let Some(mut ticker) = app.ticker.take() {
        ticker.stop();
    }
    app.save_preferences();

    tracing::info!("exiting");
    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Sets the terminal background color based on the provided theme.
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal(app: &App) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Set the background of the entire terminal window, without this we'd get
    // a thin black outline
    if let Some(hex) = Theme::to_hex(app.theme.background_colour) {
        if let Err(e) = util::term::set_terminal_bg(&hex) {
            tracing::warn!(error = %e, "failed to set terminal background");
        }
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This reverses the changes made by [`setup_terminal`], including disabling
/// raw mode, leaving the alternate screen, and resetting the background color.
/// It also ensures the cursor is made visible again.
///
/// This function is "best-effort" and does not return a result, as it is
/// called during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    util::term::reset_terminal_bg().ok();
    terminal.show_cursor().ok();
}

/// Starts the application's background workers and enters the main event loop.
///
/// This function spawns:
/// * A task worker to load the catalog.
/// * An input thread to poll for keyboard events.
/// * The frame ticker that drives the visualizer and search debounce.
///
/// After spawning the workers, it hands control to [`process_events`] to
/// manage the UI and state updates.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    task_rx: Receiver<AppTask>,
) -> Result<()> {
    tasks::spawn_task_worker(task_rx, app.event_tx.clone());

    // Spawn a thread to translate raw key events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event::Event::Key(key)) => {
                    if tx_keys.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "failed to read terminal input");
                    break;
                }
            }
        }
    });

    // Frames stop once the event loop has gone away.
    let tx_frame = app.event_tx.clone();
    app.ticker = Some(FrameTicker::start(app.config.visualizer.fps, move || {
        tx_frame.send(AppEvent::Frame).is_ok()
    }));

    app.task_tx
        .send(AppTask::LoadCatalog(app.catalog_source()))
        .context("Failed to request the catalog")?;

    // Application event loop, process events until the user quits
    process_events(terminal, app)
}

#[cfg(test)]
pub(crate) mod testing {
    //! An [`App`] wired to the recording backend.

    use super::*;
    use crate::player::testing::FakeBackend;

    pub(crate) fn app() -> (App, FakeBackend, Receiver<AppTask>) {
        let (event_tx, event_rx) = mpsc::channel();
        let (task_tx, task_rx) = mpsc::channel();
        let backend = FakeBackend::default();

        let app = App::new(
            AppConfig::default(),
            ConfigFile::detached(AppConfig::default()),
            Box::new(backend.clone()),
            event_tx,
            event_rx,
            task_tx,
        );
        (app, backend, task_rx)
    }
}
