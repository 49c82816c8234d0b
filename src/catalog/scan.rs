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

//! Media directory scanning.
//!
//! Uses `WalkDir` for traversal and `Lofty` for metadata extraction. Files are
//! visited in file-name order so the resulting catalog is stable between runs.

use std::path::{Path, PathBuf};

use lofty::prelude::*;
use lofty::probe::Probe;
use walkdir::WalkDir;

use crate::{catalog::CatalogError, model::Track};

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "m4a", "wav"];

/// Recursively scans `dirs` for audio files, one [`Track`] per file.
///
/// Files that cannot be probed are skipped with a warning. Files without tags
/// are kept, titled after their file name.
pub(crate) fn scan_directories(dirs: &[PathBuf]) -> Result<Vec<Track>, CatalogError> {
    let mut tracks = vec![];

    for root in dirs {
        if !root.is_dir() {
            return Err(CatalogError::MissingDirectory(root.clone()));
        }

        let before = tracks.len();

        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_audio(e.path()))
        {
            if let Some(track) = read_track(entry.path()) {
                tracks.push(track);
            }
        }

        tracing::info!(root = %root.display(), found = tracks.len() - before, "scanned media directory");
    }

    Ok(tracks)
}

fn is_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn read_track(path: &Path) -> Option<Track> {
    let tagged_file = match Probe::open(path).and_then(|p| p.read()) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
            return None;
        }
    };

    let source = path.to_string_lossy().into_owned();
    let file_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.clone());

    let duration = tagged_file.properties().duration().as_secs_f64();
    let duration_seconds = (duration > 0.0).then_some(duration);

    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

    let Some(tag) = tag else {
        return Some(Track {
            id: source.clone(),
            title: file_name,
            artist: "Unknown Artist".into(),
            album: None,
            cover: None,
            source,
            year: None,
            duration_seconds,
        });
    };

    Some(Track {
        id: source.clone(),
        title: tag.title().map(|t| t.to_string()).unwrap_or(file_name),
        artist: tag
            .artist()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "Unknown Artist".into()),
        album: tag.album().map(|a| a.to_string()),
        cover: None,
        source,
        year: tag.year(),
        duration_seconds,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn recognises_audio_extensions_case_insensitively() {
        assert!(is_audio(Path::new("/m/a.mp3")));
        assert!(is_audio(Path::new("/m/b.FLAC")));
        assert!(!is_audio(Path::new("/m/cover.jpg")));
        assert!(!is_audio(Path::new("/m/README")));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let result = scan_directories(&[missing.clone()]);

        assert!(matches!(result, Err(CatalogError::MissingDirectory(p)) if p == missing));
    }

    #[test]
    fn unreadable_audio_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.mp3"), b"not really audio").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let tracks = scan_directories(&[dir.path().to_path_buf()]).unwrap();

        assert!(tracks.is_empty());
    }
}
