pub mod state;
pub mod ui;
pub mod widgets;

use crate::library::metadata::Track;
use crate::messages::{UiMessage, WorkerMessage};
use crate::search::query::CoverQuery;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use state::AppState;
use std::io;
use std::path::PathBuf;
use tokio::sync::mpsc;

pub struct App {
    state: AppState,
    worker_rx: mpsc::UnboundedReceiver<WorkerMessage>,
    ui_tx: mpsc::UnboundedSender<UiMessage>,
}

impl App {
    pub fn new(
        music_dir: PathBuf,
        placeholder: Option<String>,
        worker_rx: mpsc::UnboundedReceiver<WorkerMessage>,
        ui_tx: mpsc::UnboundedSender<UiMessage>,
    ) -> Self {
        Self {
            state: AppState::new(music_dir, placeholder),
            worker_rx,
            ui_tx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_loop(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            // Render UI
            terminal.draw(|f| ui::render(f, &self.state))?;

            // Handle events (non-blocking)
            if event::poll(std::time::Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }

            if self.state.should_quit {
                break;
            }

            // Process worker messages (non-blocking)
            while let Ok(msg) = self.worker_rx.try_recv() {
                self.state.update(msg);
            }

            // 60fps target
            tokio::time::sleep(std::time::Duration::from_millis(16)).await;
        }

        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state.should_quit = true;
                let _ = self.ui_tx.send(UiMessage::Quit);
            }
            KeyCode::Down | KeyCode::Char('j') => self.state.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.state.select_previous(),
            KeyCode::Home | KeyCode::Char('g') => self.state.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.state.select_last(),
            KeyCode::Enter | KeyCode::Char('c') => {
                if let Some(track) = self.state.selected_track().cloned() {
                    self.request_cover(&track);
                }
            }
            KeyCode::Char('a') => {
                let tracks = self.state.tracks.clone();
                for track in &tracks {
                    self.request_cover(track);
                }
            }
            KeyCode::Char('p') => {
                if !self.state.paused {
                    self.state.paused = true;
                    let _ = self.ui_tx.send(UiMessage::Pause);
                }
            }
            KeyCode::Char('r') => {
                if self.state.paused {
                    self.state.paused = false;
                    let _ = self.ui_tx.send(UiMessage::Resume);
                }
            }
            _ => {}
        }
    }

    fn request_cover(&mut self, track: &Track) {
        if !self.state.needs_lookup(&track.path) {
            return;
        }
        self.state.mark_queued(&track.path);
        let _ = self.ui_tx.send(UiMessage::ResolveCover {
            path: track.path.clone(),
            query: CoverQuery::from_track(track).to_query_string(),
        });
    }
}
