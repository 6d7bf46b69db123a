use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config YAML pointing both services at `uri`
#[allow(dead_code)]
pub fn config_for(uri: &str) -> String {
    format!(
        "api:\n  backend_url: \"{uri}\"\n  chat_url: \"{uri}\"\n  request_timeout_seconds: 5\nchat:\n  exchange_timeout_seconds: 5\n  typing_interval_ms: 50\n"
    )
}
