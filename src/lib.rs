pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod settings;
pub mod tui;
