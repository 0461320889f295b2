//! Settings for the ytviewer YouTube client.
//!
//! [`ConfigLoader::load`] returns the user's [`Config`], creating
//! `~/.config/ytviewer/config.json` with starter values the first time.

pub mod config;
pub mod error;

pub use config::{Config, ConfigLoader, FixedHome, HomeDir, PlayerOptions, SystemHome};
pub use error::{ConfigError, Result};
