use sketchkit_settings::{DesignerSettings, GridKind, SettingsError};
use tempfile::TempDir;

#[test]
fn test_toml_save_and_load() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("designer.toml");

    let mut settings = DesignerSettings::default();
    settings.grid.kind = GridKind::Dots;
    settings.grid.snap_to_grid = true;
    settings.editing.lock_aspect = true;
    settings.save(&path).expect("save");

    let loaded = DesignerSettings::load(&path).expect("load");
    assert_eq!(loaded, settings);
}

#[test]
fn test_json_save_and_load() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("designer.json");

    let mut settings = DesignerSettings::default();
    settings.grid.spacing = 12.5;
    settings.save(&path).expect("save");

    let loaded = DesignerSettings::load(&path).expect("load");
    assert_eq!(loaded.grid.spacing, 12.5);
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("designer.json");
    std::fs::write(&path, r#"{"editing": {"handle_size": -1.0}}"#).expect("write");

    let err = DesignerSettings::load(&path).expect_err("negative handle size");
    assert!(matches!(err, SettingsError::Config(_)));
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = TempDir::new().expect("temp dir");
    let settings =
        DesignerSettings::load_or_default(&dir.path().join("absent.toml")).expect("defaults");
    assert_eq!(settings, DesignerSettings::default());
}
