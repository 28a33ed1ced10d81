//! File round-trips for player settings.

use tapline_config::{ConfigError, PlayerSettings, SharedSettings};
use tempfile::TempDir;

#[test]
fn save_creates_parent_and_load_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("settings.toml");

    let mut settings = PlayerSettings::default();
    settings.reverb.amount = 11;
    settings.output.buffer_frames = 512;
    settings.save(&path).unwrap();

    assert!(path.exists());
    assert_eq!(PlayerSettings::load(&path).unwrap(), settings);
}

#[test]
fn load_or_default_without_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.toml");
    assert_eq!(
        PlayerSettings::load_or_default(&path).unwrap(),
        PlayerSettings::default()
    );
}

#[test]
fn load_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.toml");
    match PlayerSettings::load(&path) {
        Err(ConfigError::ReadFile { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected ReadFile, got {:?}", other),
    }
}

#[test]
fn invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[output]\nsample_rate = 0\n").unwrap();
    assert!(matches!(
        PlayerSettings::load(&path),
        Err(ConfigError::Invalid {
            field: "output.sample_rate",
            ..
        })
    ));
}

#[test]
fn live_changes_persist() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");

    let mut settings = PlayerSettings::load_or_default(&path).unwrap();
    let live = SharedSettings::from_settings(&settings);
    live.set_reverb(6);
    live.set_volume(180);
    live.store_into(&mut settings);
    settings.save(&path).unwrap();

    let reloaded = PlayerSettings::load(&path).unwrap();
    assert_eq!(reloaded.reverb.amount, 6);
    assert_eq!(reloaded.volume, 180);
}
