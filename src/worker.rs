use crate::{
    library,
    messages::{UiMessage, WorkerMessage},
    resolver::CoverResolver,
};
use anyhow::{Context, Result};
use governor::{Quota, RateLimiter};
use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::path::PathBuf;
use tokio::sync::mpsc;

const LOOKUPS_PER_SEC: u32 = 2; // search engines block bursts quickly

/// Load the library, then serve cover lookups one at a time until the UI quits
pub async fn run(
    music_dir: PathBuf,
    recursive: bool,
    mut resolver: CoverResolver,
    tx: mpsc::UnboundedSender<WorkerMessage>,
    mut ui_rx: mpsc::UnboundedReceiver<UiMessage>,
) -> Result<()> {
    tracing::info!("Worker started for directory: {}", music_dir.display());

    tx.send(WorkerMessage::LibraryScanning)?;
    let scan_dir = music_dir.clone();
    let tracks = tokio::task::spawn_blocking(move || library::load(&scan_dir, recursive)).await?;
    tracing::info!("Loaded {} tracks", tracks.len());
    tx.send(WorkerMessage::LibraryLoaded { tracks })?;

    let rate_limiter = RateLimiter::direct(Quota::per_second(
        NonZeroU32::new(LOOKUPS_PER_SEC).context("lookup rate must be non-zero")?,
    ));

    let mut queue: VecDeque<(PathBuf, String)> = VecDeque::new();
    let mut paused = false;

    loop {
        // Block only when there is nothing to work on
        let msg = if paused || queue.is_empty() {
            match ui_rx.recv().await {
                Some(msg) => Some(msg),
                None => break,
            }
        } else {
            ui_rx.try_recv().ok()
        };

        // Apply every pending control message before the next lookup
        if let Some(msg) = msg {
            match msg {
                UiMessage::ResolveCover { path, query } => {
                    if !queue.iter().any(|(queued, _)| *queued == path) {
                        queue.push_back((path, query));
                    }
                }
                UiMessage::Pause => {
                    paused = true;
                    tracing::info!("Cover lookups paused ({} queued)", queue.len());
                }
                UiMessage::Resume => {
                    paused = false;
                    tracing::info!("Cover lookups resumed");
                }
                UiMessage::Quit => {
                    tracing::info!("Worker received quit signal");
                    break;
                }
            }
            continue;
        }

        let Some((path, query)) = queue.pop_front() else {
            continue;
        };

        tx.send(WorkerMessage::LookupStarted { path: path.clone() })?;

        if !resolver.is_cached(&query) {
            rate_limiter.until_ready().await;
        }
        let resolution = resolver.resolve(&query).await;

        let msg = match resolution.url {
            Some(url) => WorkerMessage::CoverFound {
                path,
                url,
                from_cache: resolution.from_cache,
            },
            None => WorkerMessage::CoverMissing {
                path,
                from_cache: resolution.from_cache,
            },
        };
        tx.send(msg)?;
    }

    tracing::info!("Worker stopped");
    Ok(())
}
