pub mod cache;
pub mod cli;
pub mod config;
pub mod library;
pub mod messages;
pub mod paths;
pub mod resolver;
pub mod search;
pub mod tui;
pub mod worker;
