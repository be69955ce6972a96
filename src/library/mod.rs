pub mod metadata;
pub mod tags;

use metadata::Track;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const AUDIO_EXTENSIONS: &[&str] = &[
    "flac", "mp3", "m4a", "mp4", "aac", "opus", "ogg", "oga", "ape", "wav",
];

/// True when the path has a known audio extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Audio files in `path`, sorted by file name.
/// Only the top level is listed unless `recursive` is set.
pub fn walk_directory(path: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(path).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => {
                (e.file_type().is_file() && is_audio_file(e.path())).then(|| e.into_path())
            }
            Err(e) => {
                tracing::warn!("Error walking directory: {}", e);
                None
            }
        })
        .collect();

    tracing::info!(
        "Found {} audio files in {}",
        files.len(),
        path.display()
    );
    files
}

/// Read every audio file in `path`; unreadable files are logged and skipped
pub fn load(path: &Path, recursive: bool) -> Vec<Track> {
    walk_directory(path, recursive)
        .into_iter()
        .filter_map(|file| match metadata::extract(&file) {
            Ok(track) => Some(track),
            Err(e) => {
                tracing::warn!("Skipping {}: {:#}", file.display(), e);
                None
            }
        })
        .collect()
}
