use crate::library::metadata::Track;
use std::path::PathBuf;

/// Messages sent from Worker to TUI
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    LibraryScanning,
    LibraryLoaded {
        tracks: Vec<Track>,
    },
    LookupStarted {
        path: PathBuf,
    },
    CoverFound {
        path: PathBuf,
        url: String,
        from_cache: bool,
    },
    CoverMissing {
        path: PathBuf,
        from_cache: bool,
    },
    Error {
        error: String,
    },
}

/// Messages sent from TUI to Worker
#[derive(Debug, Clone)]
pub enum UiMessage {
    ResolveCover { path: PathBuf, query: String },
    Quit,
    Pause,
    Resume,
}
