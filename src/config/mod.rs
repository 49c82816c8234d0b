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

//! Application configuration.
//!
//! This module manages the application configuration file. Keys missing from
//! an older file fall back to their defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::theme::ThemeName;

const CONFIG_NAME: &str = "beats";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub catalog: Option<PathBuf>,
    pub media_dirs: Vec<PathBuf>,
    pub theme: ThemeName,
    pub volume: f64,
    pub muted: bool,
    pub search_debounce_ms: u64,
    pub visualizer: VisualizerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            catalog: None,
            media_dirs: vec![],
            theme: ThemeName::default(),
            volume: 1.0,
            muted: false,
            search_debounce_ms: 300,
            visualizer: VisualizerConfig::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VisualizerConfig {
    pub enabled: bool,
    pub bars: usize,
    pub fps: u32,
    /// Power applied by the bin-to-bar index mapping.
    pub exponent: f32,
    /// Per-frame decay factor for the bars.
    pub smoothing: f32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bars: 64,
            fps: 60,
            exponent: 2.0,
            smoothing: 0.7,
        }
    }
}

/// Where the configuration lives on disk.
#[derive(Debug, Clone)]
enum Location {
    Profile,
    Path(PathBuf),
    #[cfg(test)]
    Nowhere,
}

/// The configuration as read from disk.
///
/// Session overrides are applied to a clone of [`ConfigFile::config`], never
/// to the file's copy, so saving only ever writes back the preferences the
/// user changed from inside the application.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    location: Location,
    saved: AppConfig,
}

impl ConfigFile {
    /// Loads the `beats` profile, falling back to defaults if unreadable.
    pub fn load() -> Self {
        let saved = confy::load(CONFIG_NAME, None).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "unreadable configuration, using defaults");
            AppConfig::default()
        });

        Self {
            location: Location::Profile,
            saved,
        }
    }

    /// Loads a configuration file at an explicit path.
    pub fn load_path(path: impl Into<PathBuf>) -> Result<Self, confy::ConfyError> {
        let path = path.into();
        let saved = confy::load_path(&path)?;

        Ok(Self {
            location: Location::Path(path),
            saved,
        })
    }

    /// A configuration that is never written anywhere.
    #[cfg(test)]
    pub fn detached(saved: AppConfig) -> Self {
        Self {
            location: Location::Nowhere,
            saved,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.saved
    }

    /// Records the theme, volume and mute preferences and writes the file.
    pub fn save_preferences(
        &mut self,
        theme: ThemeName,
        volume: f64,
        muted: bool,
    ) -> Result<(), confy::ConfyError> {
        self.saved.theme = theme;
        self.saved.volume = volume;
        self.saved.muted = muted;

        match &self.location {
            Location::Profile => confy::store(CONFIG_NAME, None, &self.saved),
            Location::Path(path) => confy::store_path(path, &self.saved),
            #[cfg(test)]
            Location::Nowhere => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beats.toml");
        fs::write(&path, "volume = 0.4\ntheme = \"light\"\n").unwrap();

        let file = ConfigFile::load_path(&path).unwrap();
        let cfg = file.config();

        assert_eq!(cfg.volume, 0.4);
        assert_eq!(cfg.theme, ThemeName::Light);
        assert_eq!(cfg.search_debounce_ms, 300);
        assert_eq!(cfg.visualizer, VisualizerConfig::default());
    }

    #[test]
    fn saving_preferences_keeps_everything_else_as_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beats.toml");
        fs::write(&path, "catalog = \"/music/catalog.json\"\n\n[visualizer]\nbars = 32\n").unwrap();

        let mut file = ConfigFile::load_path(&path).unwrap();
        file.save_preferences(ThemeName::Light, 0.25, true).unwrap();

        let reread = ConfigFile::load_path(&path).unwrap();
        let cfg = reread.config();
        assert_eq!(cfg.theme, ThemeName::Light);
        assert_eq!(cfg.volume, 0.25);
        assert!(cfg.muted);
        assert_eq!(cfg.catalog, Some(PathBuf::from("/music/catalog.json")));
        assert_eq!(cfg.visualizer.bars, 32);
        assert!(cfg.visualizer.enabled);
    }
}
