use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tempfile::TempDir;
use ytviewer::{Config, ConfigError, ConfigLoader, FixedHome, PlayerOptions};

fn loader(home: &TempDir) -> ConfigLoader<FixedHome> {
    ConfigLoader::with_home(FixedHome(home.path().to_path_buf()))
}

fn write_config(home: &TempDir, contents: &str) -> PathBuf {
    let dir = home.path().join(".config").join("ytviewer");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn first_load_creates_default_file() {
    let home = TempDir::new().unwrap();
    let config = loader(&home).load().unwrap();

    let expected = Config {
        api_key: "YOUR_YOUTUBE_API_KEY".to_string(),
        subscriptions: vec![],
        max_videos: 10,
        player_options: PlayerOptions {
            max_resolution: "1080".to_string(),
            hardware_accel: true,
            cache_size: "150M".to_string(),
            mark_as_watched: true,
        },
        cache_duration_minutes: 30,
    };
    assert_eq!(config, expected);

    let path = home.path().join(".config/ytviewer/config.json");
    assert!(path.is_file());

    let reloaded = loader(&home).load().unwrap();
    assert_eq!(reloaded, expected);
}

#[test]
fn second_load_reads_the_same_file() {
    let home = TempDir::new().unwrap();
    let first = loader(&home).load().unwrap();
    let path = home.path().join(".config/ytviewer/config.json");
    let written = fs::read_to_string(&path).unwrap();

    let second = loader(&home).load().unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&path).unwrap(), written);
}

#[test]
fn zero_and_missing_numbers_fall_back() {
    let home = TempDir::new().unwrap();
    write_config(
        &home,
        r#"{
            "api_key": "abc",
            "subscriptions": ["UC1", "UC2", "UC3"],
            "max_videos": 0,
            "mpv_options": {"max_resolution": "720", "hardware_accel": false,
                            "cache_size": "50M", "mark_as_watched": false}
        }"#,
    );

    let config = loader(&home).load().unwrap();
    assert_eq!(config.max_videos, 10);
    assert_eq!(config.cache_duration_minutes, 30);
    assert_eq!(config.api_key, "abc");
    assert_eq!(config.subscriptions, vec!["UC1", "UC2", "UC3"]);
    assert_eq!(config.player_options.max_resolution, "720");
    assert!(!config.player_options.hardware_accel);
    assert_eq!(config.player_options.cache_size, "50M");
    assert!(!config.player_options.mark_as_watched);
}

#[test]
fn non_zero_numbers_pass_through() {
    let home = TempDir::new().unwrap();
    write_config(&home, r#"{"max_videos": 25, "cache_duration": 5}"#);

    let config = loader(&home).load().unwrap();
    assert_eq!(config.max_videos, 25);
    assert_eq!(config.cache_duration_minutes, 5);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let home = TempDir::new().unwrap();
    let path = write_config(&home, "{");

    match loader(&home).load() {
        Err(ConfigError::FileParseFailed { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected parse failure, got {other:?}"),
    }
}

#[test]
fn unknown_fields_are_ignored() {
    let home = TempDir::new().unwrap();
    write_config(&home, r#"{"api_key": "abc", "foo": "bar"}"#);

    let config = loader(&home).load().unwrap();
    assert_eq!(config.api_key, "abc");
}

#[test]
fn parse_error_message_names_the_file() {
    let home = TempDir::new().unwrap();
    let path = write_config(&home, "[1, 2");

    let err = loader(&home).load().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("error parsing config file"));
    assert!(message.contains(&path.display().to_string()));
}

fn run_show(home: &TempDir) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ytviewer"))
        .arg("--home")
        .arg(home.path())
        .arg("show")
        .output()
        .unwrap()
}

#[test]
fn first_run_notice_is_printed_once() {
    let home = TempDir::new().unwrap();
    let path = home.path().join(".config/ytviewer/config.json");
    let notice = format!(
        "Created default config at {}. Please edit it to add your YouTube API key.\n",
        path.display()
    );

    let first = run_show(&home);
    assert!(first.status.success());
    let first_stdout = String::from_utf8(first.stdout).unwrap();
    assert!(first_stdout.starts_with(&notice));
    assert!(first_stdout.contains("\"api_key\": \"YOUR_YOUTUBE_API_KEY\""));

    let second = run_show(&home);
    assert!(second.status.success());
    let second_stdout = String::from_utf8(second.stdout).unwrap();
    assert!(!second_stdout.contains("Created default config"));
    assert!(second_stdout.starts_with('{'));
}

#[test]
fn closed_stdout_does_not_panic() {
    let home = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_ytviewer"))
        .arg("--home")
        .arg(home.path())
        .arg("show")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stdout.take());

    let output = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked"), "stderr: {stderr}");
    assert!(home.path().join(".config/ytviewer/config.json").is_file());
}
