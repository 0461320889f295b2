use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine the current user's home directory")]
    HomeDirectoryUnavailable,

    #[error("error creating config directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading config file {}: {source}", path.display())]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config file {}: {source}", path.display())]
    FileParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("error creating default config: {0}")]
    SerializationFailed(#[source] serde_json::Error),

    #[error("error writing default config {}: {source}", path.display())]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
