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

//! Track catalog loading.
//!
//! A catalog is either a JSON document listing songs, or one or more media
//! directories that are scanned for tagged audio files. Both produce the same
//! ordered list of [`Track`] records for the sequencer.
//!
//! # JSON format
//!
//! ```json
//! { "songs": [ { "title": "...", "artist": "...", "file": "audio/a.mp3" } ] }
//! ```
//!
//! `id`, `album`, `cover`, `year` and `duration` are optional. The source may
//! be given as `file` or `sourceRef`. Relative paths are resolved against the
//! directory containing the catalog file.

mod scan;

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::model::Track;

#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    #[error("failed to read catalog {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed catalog {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("media directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),
}

/// Where the track list comes from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CatalogSource {
    File(PathBuf),
    Directories(Vec<PathBuf>),
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    songs: Vec<CatalogRecord>,
}

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(default)]
    id: Option<String>,
    title: String,
    artist: String,
    #[serde(default)]
    album: Option<String>,
    #[serde(default)]
    cover: Option<String>,
    #[serde(alias = "sourceRef", alias = "source_ref")]
    file: String,
    #[serde(default)]
    year: Option<NumberOrText>,
    #[serde(default)]
    duration: Option<NumberOrText>,
}

/// Catalogs written by hand mix `"year": 1998` with `"year": "1998"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn year(&self) -> Option<u32> {
        match self {
            NumberOrText::Number(n) if n.is_finite() && *n >= 0.0 => Some(*n as u32),
            NumberOrText::Number(_) => None,
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Seconds, from either a number or an `M:SS` / `H:MM:SS` string.
    fn seconds(&self) -> Option<f64> {
        match self {
            NumberOrText::Number(n) if n.is_finite() && *n > 0.0 => Some(*n),
            NumberOrText::Number(_) => None,
            NumberOrText::Text(s) => s
                .trim()
                .split(':')
                .try_fold(0.0, |acc, part| part.parse::<f64>().ok().map(|v| acc * 60.0 + v))
                .filter(|secs| *secs > 0.0),
        }
    }
}

/// Loads the track list from `source`.
pub(crate) fn load(source: &CatalogSource) -> Result<Vec<Track>, CatalogError> {
    match source {
        CatalogSource::File(path) => load_file(path),
        CatalogSource::Directories(dirs) => scan::scan_directories(dirs),
    }
}

fn load_file(path: &Path) -> Result<Vec<Track>, CatalogError> {
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));

    parse(&text, base).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `track-<index>`, suffixed until it clashes with no id already taken.
fn synthesise_id(index: usize, seen: &HashSet<String>) -> String {
    let base = format!("track-{index}");
    if !seen.contains(&base) {
        return base;
    }

    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !seen.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Parses a JSON catalog, resolving relative paths against `base`.
pub(crate) fn parse(text: &str, base: &Path) -> Result<Vec<Track>, serde_json::Error> {
    let document: CatalogDocument = serde_json::from_str(text)?;

    let mut seen = HashSet::new();
    let tracks = document
        .songs
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let id = record
                .id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty() && !seen.contains(id))
                .unwrap_or_else(|| synthesise_id(index, &seen));
            seen.insert(id.clone());

            Track {
                id,
                title: record.title,
                artist: record.artist,
                album: record.album.filter(|a| !a.trim().is_empty()),
                cover: record.cover.map(|c| resolve(base, &c)),
                source: resolve(base, &record.file),
                year: record.year.as_ref().and_then(NumberOrText::year),
                duration_seconds: record.duration.as_ref().and_then(NumberOrText::seconds),
            }
        })
        .collect();

    Ok(tracks)
}

/// URLs and absolute paths are kept as they are.
fn resolve(base: &Path, reference: &str) -> String {
    if reference.contains("://") || Path::new(reference).is_absolute() {
        return reference.to_string();
    }

    base.join(reference).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_records_and_fills_optional_fields() {
        let json = r#"{
            "songs": [
                {
                    "id": "one",
                    "title": "Teardrop",
                    "artist": "Massive Attack",
                    "album": "Mezzanine",
                    "cover": "covers/mezzanine.jpg",
                    "file": "audio/teardrop.mp3",
                    "year": 1998,
                    "duration": "5:29"
                },
                {
                    "title": "Windowlicker",
                    "artist": "Aphex Twin",
                    "sourceRef": "https://example.org/windowlicker.mp3",
                    "year": "1999",
                    "duration": 367.5
                }
            ]
        }"#;

        let tracks = parse(json, Path::new("/srv/music")).unwrap();

        assert_eq!(tracks.len(), 2);

        assert_eq!(tracks[0].id, "one");
        assert_eq!(tracks[0].album.as_deref(), Some("Mezzanine"));
        assert_eq!(tracks[0].cover.as_deref(), Some("/srv/music/covers/mezzanine.jpg"));
        assert_eq!(tracks[0].source, "/srv/music/audio/teardrop.mp3");
        assert_eq!(tracks[0].year, Some(1998));
        assert_eq!(tracks[0].duration_seconds, Some(329.0));

        assert_eq!(tracks[1].id, "track-1");
        assert_eq!(tracks[1].source, "https://example.org/windowlicker.mp3");
        assert_eq!(tracks[1].year, Some(1999));
        assert_eq!(tracks[1].duration_seconds, Some(367.5));
        assert_eq!(tracks[1].cover, None);
    }

    #[test]
    fn duplicate_and_blank_ids_are_synthesised() {
        let json = r#"{"songs": [
            {"id": "x", "title": "A", "artist": "A", "file": "/a.mp3"},
            {"id": "x", "title": "B", "artist": "B", "file": "/b.mp3"},
            {"id": "  ", "title": "C", "artist": "C", "file": "/c.mp3"}
        ]}"#;

        let ids: Vec<_> = parse(json, Path::new("/"))
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(ids, vec!["x", "track-1", "track-2"]);
    }

    #[test]
    fn synthesised_ids_never_collide_with_explicit_ones() {
        let json = r#"{"songs": [
            {"id": "track-1", "title": "A", "artist": "A", "file": "/a.mp3"},
            {"title": "B", "artist": "B", "file": "/b.mp3"},
            {"id": "track-1", "title": "C", "artist": "C", "file": "/c.mp3"}
        ]}"#;

        let ids: Vec<_> = parse(json, Path::new("/"))
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(ids, vec!["track-1", "track-1-1", "track-2"]);
    }

    #[test]
    fn missing_song_list_is_an_empty_catalog() {
        assert!(parse("{}", Path::new("/")).unwrap().is_empty());
    }

    #[test]
    fn record_without_a_source_is_rejected() {
        let json = r#"{"songs": [{"title": "A", "artist": "B"}]}"#;

        assert!(parse(json, Path::new("/")).is_err());
    }

    #[test]
    fn loading_a_file_resolves_against_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"songs": [{{"title": "A", "artist": "B", "file": "a.mp3"}}]}}"#
        )
        .unwrap();

        let tracks = load(&CatalogSource::File(path)).unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(
            tracks[0].source,
            dir.path().join("a.mp3").to_string_lossy()
        );
    }

    #[test]
    fn unreadable_and_malformed_catalogs_are_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = load(&CatalogSource::File(dir.path().join("nope.json")));
        assert!(matches!(missing, Err(CatalogError::Read { .. })));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            load(&CatalogSource::File(broken)),
            Err(CatalogError::Parse { .. })
        ));
    }
}
