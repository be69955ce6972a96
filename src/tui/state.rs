use crate::library::metadata::Track;
use crate::messages::WorkerMessage;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

const MAX_LOG_LINES: usize = 100;

/// Cover lookup state of one track
#[derive(Debug, Clone, PartialEq)]
pub enum CoverState {
    Queued,
    Searching,
    Found(String),
    Missing,
}

/// Last finished lookup of one track, as counted in the summary
#[derive(Debug, Clone, Copy, PartialEq)]
struct Outcome {
    found: bool,
    from_cache: bool,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub music_dir: PathBuf,
    pub tracks: Vec<Track>,
    pub selected: usize,
    pub covers: HashMap<PathBuf, CoverState>,
    pub placeholder: Option<String>,
    pub found: usize,
    pub cached: usize,
    pub missing: usize,
    outcomes: HashMap<PathBuf, Outcome>,
    pub logs: VecDeque<String>,
    pub status: Status,
    pub should_quit: bool,
    pub paused: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Scanning,
    Browsing,
    Error(String),
}

impl AppState {
    pub fn new(music_dir: PathBuf, placeholder: Option<String>) -> Self {
        Self {
            music_dir,
            tracks: Vec::new(),
            selected: 0,
            covers: HashMap::new(),
            placeholder,
            found: 0,
            cached: 0,
            missing: 0,
            outcomes: HashMap::new(),
            logs: VecDeque::new(),
            status: Status::Idle,
            should_quit: false,
            paused: false,
        }
    }

    /// Update state based on worker messages (Elm Architecture - Update)
    pub fn update(&mut self, msg: WorkerMessage) {
        match msg {
            WorkerMessage::LibraryScanning => {
                self.status = Status::Scanning;
                self.add_log(format!("Scanning {}...", self.music_dir.display()));
            }
            WorkerMessage::LibraryLoaded { tracks } => {
                self.add_log(format!("Library loaded: {} tracks", tracks.len()));
                self.tracks = tracks;
                self.selected = 0;
                self.status = Status::Browsing;
            }
            WorkerMessage::LookupStarted { path } => {
                self.covers.insert(path, CoverState::Searching);
            }
            WorkerMessage::CoverFound {
                path,
                url,
                from_cache,
            } => {
                self.record_outcome(
                    &path,
                    Outcome {
                        found: true,
                        from_cache,
                    },
                );
                self.add_log(format!("[{}] {}", if from_cache { "~" } else { "✓" }, file_name(&path)));
                self.covers.insert(path, CoverState::Found(url));
            }
            WorkerMessage::CoverMissing { path, from_cache } => {
                self.record_outcome(
                    &path,
                    Outcome {
                        found: false,
                        from_cache,
                    },
                );
                self.add_log(format!("[✗] {}", file_name(&path)));
                self.covers.insert(path, CoverState::Missing);
            }
            WorkerMessage::Error { error } => {
                self.add_log(format!("[!] {}", error));
                self.status = Status::Error(error);
            }
        }
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.tracks.is_empty() {
            self.selected = (self.selected + 1) % self.tracks.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.tracks.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.tracks.len() - 1);
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.tracks.len().saturating_sub(1);
    }

    /// Whether a lookup should be requested for `path`
    pub fn needs_lookup(&self, path: &Path) -> bool {
        !matches!(
            self.covers.get(path),
            Some(CoverState::Queued | CoverState::Searching | CoverState::Found(_))
        )
    }

    pub fn mark_queued(&mut self, path: &Path) {
        self.covers.insert(path.to_path_buf(), CoverState::Queued);
    }

    /// Text for the cover line of the details panel
    pub fn cover_label(&self, path: &Path) -> String {
        match self.covers.get(path) {
            None => "press Enter to search".to_string(),
            Some(CoverState::Queued) => "queued".to_string(),
            Some(CoverState::Searching) => "searching...".to_string(),
            Some(CoverState::Found(url)) => url.clone(),
            Some(CoverState::Missing) => match &self.placeholder {
                Some(placeholder) => format!("{} (placeholder)", placeholder),
                None => "not found".to_string(),
            },
        }
    }

    /// Count each track once, by its latest lookup
    fn record_outcome(&mut self, path: &Path, outcome: Outcome) {
        if let Some(previous) = self.outcomes.insert(path.to_path_buf(), outcome) {
            self.adjust_counts(previous, false);
        }
        self.adjust_counts(outcome, true);
    }

    fn adjust_counts(&mut self, outcome: Outcome, add: bool) {
        let counter = if outcome.found {
            &mut self.found
        } else {
            &mut self.missing
        };
        *counter = if add { *counter + 1 } else { counter.saturating_sub(1) };
        if outcome.from_cache {
            self.cached = if add {
                self.cached + 1
            } else {
                self.cached.saturating_sub(1)
            };
        }
    }

    fn add_log(&mut self, msg: String) {
        if self.logs.len() >= MAX_LOG_LINES {
            self.logs.pop_front();
        }
        self.logs.push_back(msg);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
