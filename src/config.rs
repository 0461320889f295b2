use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};

pub const CONFIG_DIR_NAME: &str = "ytviewer";
pub const CONFIG_FILE: &str = "config.json";
pub const PLACEHOLDER_API_KEY: &str = "YOUR_YOUTUBE_API_KEY";
pub const DEFAULT_MAX_VIDEOS: i64 = 10;
pub const DEFAULT_CACHE_DURATION_MINUTES: i64 = 30;

/// Settings read from `~/.config/ytviewer/config.json`.
///
/// `Default` is the zero value: it is what serde uses for any field the file
/// leaves out, before [`Config::apply_defaults`] runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_key: String,
    /// YouTube channel IDs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscriptions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_videos: i64,
    #[serde(rename = "mpv_options", default, deserialize_with = "null_as_default")]
    pub player_options: PlayerOptions,
    #[serde(rename = "cache_duration", default, deserialize_with = "null_as_default")]
    pub cache_duration_minutes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerOptions {
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_resolution: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hardware_accel: bool,
    /// Human-readable size handed to the player, e.g. `"150M"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cache_size: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mark_as_watched: bool,
}

impl PlayerOptions {
    pub fn starter() -> Self {
        Self {
            max_resolution: "1080".to_string(),
            hardware_accel: true,
            cache_size: "150M".to_string(),
            mark_as_watched: true,
        }
    }
}

impl Config {
    /// The configuration written on first run.
    pub fn starter() -> Self {
        Self {
            api_key: PLACEHOLDER_API_KEY.to_string(),
            subscriptions: Vec::new(),
            max_videos: DEFAULT_MAX_VIDEOS,
            player_options: PlayerOptions::starter(),
            cache_duration_minutes: DEFAULT_CACHE_DURATION_MINUTES,
        }
    }

    /// Replaces zero-valued numeric settings with their fallbacks.
    ///
    /// An explicit `0` in the file is indistinguishable from a missing key
    /// here, so both end up with the fallback.
    pub fn apply_defaults(&mut self) {
        if self.max_videos == 0 {
            self.max_videos = DEFAULT_MAX_VIDEOS;
        }
        if self.cache_duration_minutes == 0 {
            self.cache_duration_minutes = DEFAULT_CACHE_DURATION_MINUTES;
        }
    }
}

// JSON `null` reads as the zero value, same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Source of the current user's home directory.
pub trait HomeDir {
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Looks the home directory up from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHome;

impl HomeDir for SystemHome {
    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// A home directory fixed up front, e.g. from `--home` or a test's temp dir.
#[derive(Debug, Clone)]
pub struct FixedHome(pub PathBuf);

impl HomeDir for FixedHome {
    fn home_dir(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigLoader<H = SystemHome> {
    home: H,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { home: SystemHome }
    }
}

impl<H: HomeDir> ConfigLoader<H> {
    pub fn with_home(home: H) -> Self {
        Self { home }
    }

    /// Resolves `<home>/.config/ytviewer`, creating it (mode 0755) if needed.
    pub fn config_dir(&self) -> Result<PathBuf> {
        let home = self
            .home
            .home_dir()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::HomeDirectoryUnavailable)?;

        let dir = home.join(".config").join(CONFIG_DIR_NAME);
        create_dir(&dir).map_err(|source| ConfigError::DirectoryCreationFailed {
            path: dir.clone(),
            source,
        })?;
        debug!(path = %dir.display(), "config directory ready");
        Ok(dir)
    }

    pub fn config_path(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(CONFIG_FILE))
    }

    /// Loads the configuration, bootstrapping a default file on first run.
    pub fn load(&self) -> Result<Config> {
        let dir = self.config_dir()?;
        if let Some(config) = ensure_default_exists(&dir)? {
            return Ok(config);
        }
        read_and_normalize(&dir.join(CONFIG_FILE))
    }
}

/// Creates `<dir>/config.json` if it is missing.
///
/// Returns the freshly written config, or `None` when a file was already
/// there. Any metadata error other than "not found" is left for the read
/// step to report.
pub fn ensure_default_exists(dir: &Path) -> Result<Option<Config>> {
    let path = dir.join(CONFIG_FILE);
    match fs::metadata(&path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => create_default(dir).map(Some),
        _ => {
            debug!(path = %path.display(), "config file present");
            Ok(None)
        }
    }
}

/// Writes the starter config to `<dir>/config.json` and tells the user.
pub fn create_default(dir: &Path) -> Result<Config> {
    let config = Config::starter();
    let path = dir.join(CONFIG_FILE);

    let data = serde_json::to_string_pretty(&config).map_err(ConfigError::SerializationFailed)?;
    write_file(&path, data.as_bytes()).map_err(|source| ConfigError::FileWriteFailed {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), "default config created");
    // Best effort: a closed stdout must not fail or abort the bootstrap.
    let _ = writeln!(
        io::stdout().lock(),
        "Created default config at {}. Please edit it to add your YouTube API key.",
        path.display()
    );
    Ok(config)
}

pub fn read_and_normalize(path: &Path) -> Result<Config> {
    let data = fs::read(path).map_err(|source| ConfigError::FileReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_failed = |source: serde_json::Error| ConfigError::FileParseFailed {
        path: path.to_path_buf(),
        source,
    };

    // Going through `Value` lets a repeated key keep its last value and a
    // bare `null` document read as the zero config. Keys still match
    // case-sensitively, and invalid UTF-8 inside a string is rejected
    // rather than replaced with U+FFFD.
    let value: Value = serde_json::from_slice(&data).map_err(parse_failed)?;
    let mut config = match value {
        Value::Null => Config::default(),
        value => Config::deserialize(value).map_err(parse_failed)?,
    };
    config.apply_defaults();

    info!(
        path = %path.display(),
        subscriptions = config.subscriptions.len(),
        max_videos = config.max_videos,
        cache_duration_minutes = config.cache_duration_minutes,
        "config loaded"
    );
    Ok(config)
}

fn create_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)
}

// Plain truncating write; a crash mid-write can leave a partial file.
fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let mut file = options.open(path)?;
    file.write_all(data)
}
