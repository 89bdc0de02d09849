use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use mirrormatch::config::Config;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Build the figment without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config.chunk_size, 65536);
    assert!(config.extensions.is_empty());
    assert!(!config.open_report);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
chunk_size = 8192
extensions = [".docx", ".png"]
report_dir = "/srv/reports"
follow_symlinks = true
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.chunk_size, 8192);
    assert_eq!(config.extensions, vec![".docx", ".png"]);
    assert_eq!(config.report_dir, Some(PathBuf::from("/srv/reports")));
    assert!(config.follow_symlinks);
    assert!(!config.open_report);
}

#[test]
fn test_env_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "chunk_size = 8192\n").unwrap();

    std::env::set_var("MMTEST_CHUNK_SIZE", "1024");
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("MMTEST_"))
        .extract()
        .unwrap();
    std::env::remove_var("MMTEST_CHUNK_SIZE");

    assert_eq!(config.chunk_size, 1024);
}

#[test]
fn test_load_from_missing_file() {
    let temp_dir = tempdir().unwrap();
    let config = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
    assert!(config.chunk_size > 0);
}

#[test]
fn test_load_from_invalid_file_fails() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "extensions = 12").unwrap();

    assert!(Config::load_from(&config_path).is_err());
}

#[test]
fn test_save_writes_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("sub").join("config.toml");
    let config = Config {
        chunk_size: 2048,
        extensions: vec![".txt".to_string()],
        ..Config::default()
    };

    config.save_to(&config_path).unwrap();

    let saved = fs::read_to_string(&config_path).unwrap();
    assert!(saved.contains("chunk_size = 2048"));
    assert!(saved.contains("extensions = [\".txt\"]"));
    assert!(!saved.contains("report_dir"));
    assert_eq!(Config::load_from(&config_path).unwrap().extensions, vec![".txt"]);
}
