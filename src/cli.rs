//! Command-line interface definitions.
//!
//! Only argument parsing and conversion into library types live here.

use crate::config::{
    SearchSettings, BROWSER_MIN_SIZE, DEFAULT_CACHE_TTL_SECS, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
use crate::search::DEFAULT_MAX_CANDIDATES;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "musicdom", version, about = "Browse, tag and find covers for a music folder")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive library browser with cover lookup
    Browse {
        #[command(flatten)]
        library: LibraryArgs,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Print the tracks of a music folder
    List {
        #[command(flatten)]
        library: LibraryArgs,
    },

    /// Edit the tags of one file; an empty value removes the field
    Tag {
        /// Audio file to edit
        file: PathBuf,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        artist: Option<String>,

        #[arg(long)]
        album: Option<String>,

        /// Year or release date: YYYY, YYYY-MM or YYYY-MM-DD
        #[arg(long)]
        year: Option<String>,

        #[arg(long)]
        genre: Option<String>,

        /// Keep the file name when a new title is set
        #[arg(long)]
        no_rename: bool,
    },

    /// Find an album cover URL for free text or for a file's tags
    Cover {
        /// Search words, e.g. "Blue Joni Mitchell"
        #[arg(conflicts_with = "file")]
        query: Vec<String>,

        /// Build the query from this file's tags instead
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct LibraryArgs {
    /// Music folder (defaults to $MUSICDOM_DIR, then the system music folder)
    #[arg(env = "MUSICDOM_DIR")]
    pub dir: Option<PathBuf>,

    /// Include subfolders
    #[arg(long, short)]
    pub recursive: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Smallest acceptable cover size in bytes
    #[arg(long, default_value_t = BROWSER_MIN_SIZE)]
    pub min_size: u64,

    /// Most candidate URLs to collect per lookup
    #[arg(long, default_value_t = DEFAULT_MAX_CANDIDATES)]
    pub max_candidates: usize,

    /// Timeout for each search and probe request
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Reuse lookup results for this long
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    /// Image URL shown when no cover is found
    #[arg(long)]
    pub placeholder: Option<String>,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl From<SearchArgs> for SearchSettings {
    fn from(args: SearchArgs) -> Self {
        Self {
            min_size: args.min_size,
            max_candidates: args.max_candidates,
            timeout: Duration::from_secs(args.timeout_secs),
            user_agent: args.user_agent,
            cache_ttl: Duration::from_secs(args.cache_ttl_secs),
            placeholder: args.placeholder,
        }
    }
}

impl LibraryArgs {
    pub fn music_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(crate::paths::default_music_dir)
    }
}
