//! Application configuration module.
//!
//! Manages the TOML config file holding TMDB credentials and
//! display preferences.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, TmdbConfig};
pub use paths::resolve_config_path;
