use anyhow::{Context, Result};
use clap::Parser;
use musicdom::cli::{Cli, Command, LibraryArgs};
use musicdom::config::SearchSettings;
use musicdom::library::{self, metadata, tags::TagEdit};
use musicdom::messages::WorkerMessage;
use musicdom::resolver::CoverResolver;
use musicdom::search::{query::CoverQuery, ImageSearch};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Browse { library, search } => {
            // The terminal belongs to the TUI, so logs go to a file
            let _guard = init_file_logging()?;
            run_browser(library, search.into()).await
        }
        Command::List { library } => {
            init_stderr_logging();
            list_tracks(&library)
        }
        Command::Tag {
            file,
            title,
            artist,
            album,
            year,
            genre,
            no_rename,
        } => {
            init_stderr_logging();
            let edit = TagEdit {
                title,
                artist,
                album,
                year,
                genre,
            };
            edit_tags(file, edit, !no_rename)
        }
        Command::Cover {
            query,
            file,
            search,
        } => {
            init_stderr_logging();
            find_cover(query, file, search.into()).await
        }
    }
}

fn init_file_logging() -> Result<WorkerGuard> {
    let log_dir = musicdom::paths::get_log_dir()?;
    let file_appender = tracing_appender::rolling::never(&log_dir, "musicdom.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "musicdom=debug,reqwest=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "musicdom=warn,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn music_dir(library: &LibraryArgs) -> Result<PathBuf> {
    let dir = library.music_dir();
    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }
    Ok(dir)
}

async fn run_browser(library: LibraryArgs, settings: SearchSettings) -> Result<()> {
    let music_dir = music_dir(&library)?;
    tracing::info!("Starting musicdom for directory: {}", music_dir.display());

    let search = ImageSearch::new(&settings).context("Failed to set up image search")?;
    let placeholder = settings.placeholder.clone();
    let resolver = CoverResolver::new(search, settings);

    // Create mpsc channels
    let (worker_tx, worker_rx) = tokio::sync::mpsc::unbounded_channel();
    let (ui_tx, ui_rx) = tokio::sync::mpsc::unbounded_channel();

    // Spawn worker task
    let error_tx = worker_tx.clone();
    let worker_dir = music_dir.clone();
    let worker_handle = tokio::spawn(async move {
        if let Err(e) =
            musicdom::worker::run(worker_dir, library.recursive, resolver, worker_tx, ui_rx).await
        {
            tracing::error!("Worker error: {}", e);
            let _ = error_tx.send(WorkerMessage::Error {
                error: e.to_string(),
            });
        }
    });

    // Run TUI
    let mut app = musicdom::tui::App::new(music_dir, placeholder, worker_rx, ui_tx);
    let result = app.run().await;

    // A lookup in flight may still be waiting on request timeouts
    worker_handle.abort();
    let _ = worker_handle.await;

    result
}

fn list_tracks(library: &LibraryArgs) -> Result<()> {
    let dir = music_dir(library)?;
    let tracks = library::load(&dir, library.recursive);

    if tracks.is_empty() {
        println!("No audio files in {}", dir.display());
        return Ok(());
    }

    let name_width = tracks
        .iter()
        .map(|t| t.file_stem().chars().count())
        .max()
        .unwrap_or(0);
    let artist_width = tracks
        .iter()
        .map(|t| t.display_artist().chars().count())
        .max()
        .unwrap_or(0);

    for track in &tracks {
        println!(
            "{:<name_width$}  {:<artist_width$}  {}",
            track.file_stem(),
            track.display_artist(),
            track.album,
        );
    }

    Ok(())
}

fn edit_tags(file: PathBuf, edit: TagEdit, rename: bool) -> Result<()> {
    if edit.is_empty() {
        anyhow::bail!("Nothing to change: pass --title, --artist, --album, --year or --genre");
    }

    let path = library::tags::edit_track(&file, &edit, rename)
        .with_context(|| format!("Failed to update {}", file.display()))?;

    println!("{}", path.display());
    Ok(())
}

async fn find_cover(
    words: Vec<String>,
    file: Option<PathBuf>,
    settings: SearchSettings,
) -> Result<()> {
    let query = match file {
        Some(path) => {
            let track = metadata::extract(&path)
                .with_context(|| format!("Failed to read tags from {}", path.display()))?;
            CoverQuery::from_track(&track).to_query_string()
        }
        None => words.join(" ").trim().to_string(),
    };

    if query.is_empty() {
        anyhow::bail!("Give some search words or --file");
    }

    let search = ImageSearch::new(&settings).context("Failed to set up image search")?;
    let mut resolver = CoverResolver::new(search, settings);
    let resolution = resolver.resolve(&query).await;

    match resolution.url_or_placeholder(resolver.settings()) {
        Some(url) => {
            if resolution.url.is_none() {
                eprintln!("No cover found for '{}', using placeholder", query);
            }
            println!("{}", url);
            Ok(())
        }
        None => anyhow::bail!("No cover found for '{}'", query),
    }
}
