use anyhow::{Context, Result};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::path::{Path, PathBuf};
use std::time::Duration;

const UNKNOWN_ARTIST: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: Option<u32>,
    pub genre: String,
    pub duration: Duration,
}

impl Track {
    /// File name without extension
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            self.file_stem()
        } else {
            self.title.clone()
        }
    }

    pub fn display_artist(&self) -> &str {
        if self.artist.trim().is_empty() {
            UNKNOWN_ARTIST
        } else {
            &self.artist
        }
    }

    /// Duration as `m:ss`
    pub fn display_duration(&self) -> String {
        let secs = self.duration.as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

/// Extract metadata from an audio file using lofty.
/// A readable file without tags yields empty fields.
pub fn extract(path: &Path) -> Result<Track> {
    let tagged_file = Probe::open(path)
        .context("Failed to open audio file")?
        .read()
        .context("Failed to read audio file")?;

    let duration = tagged_file.properties().duration();
    let mut track = Track {
        path: path.to_path_buf(),
        duration,
        ..Track::default()
    };

    let Some(tag) = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
    else {
        tracing::debug!("No tags in {}", path.display());
        return Ok(track);
    };

    track.title = tag.title().map(|s| s.to_string()).unwrap_or_default();
    track.artist = tag.artist().map(|s| s.to_string()).unwrap_or_default();
    track.album = tag.album().map(|s| s.to_string()).unwrap_or_default();
    track.genre = tag.genre().map(|s| s.to_string()).unwrap_or_default();
    track.year = tag.year();

    Ok(track)
}
