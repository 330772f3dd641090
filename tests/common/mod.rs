use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use ragchat::api::FakeFileSearchApi;
use ragchat::commands::input::ScriptedInput;
use ragchat::commands::interactive::InteractiveSession;
use ragchat::config::Config;
use ragchat::store_manager::StoreManager;

#[allow(dead_code)]
pub const STORE: &str = "fileSearchStores/docs-1";

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config with every directory inside `dir`
#[allow(dead_code)]
pub fn config_in(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.api.api_key = Some("test-key".to_string());
    config.file_search.files_dir = dir.path().join("files");
    config.export.exports_dir = dir.path().join("exports");
    config
}

/// Fake API seeded with [`STORE`]
#[allow(dead_code)]
pub fn seeded_fake() -> Arc<FakeFileSearchApi> {
    Arc::new(FakeFileSearchApi::new().with_store(STORE, "docs-1"))
}

/// Interactive session over a fake API with scripted input
#[allow(dead_code)]
pub fn scripted_session(
    dir: &TempDir,
    fake: &Arc<FakeFileSearchApi>,
    lines: &[&str],
) -> InteractiveSession<ScriptedInput> {
    let config = config_in(dir);
    let stores = StoreManager::new(fake.clone(), &config.file_search)
        .with_poll_interval(Duration::from_millis(1));
    InteractiveSession::new(config, fake.clone(), ScriptedInput::new(lines.to_vec()))
        .with_store_manager(stores)
}
