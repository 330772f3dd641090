//! Test utilities for ragchat
//!
//! This module provides common test utilities including temporary directory
//! management, test file creation, configuration and a seeded fake API.

use crate::api::FakeFileSearchApi;
use crate::config::Config;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Resource name of the store seeded by [`fake_api_with_store`]
pub const TEST_STORE: &str = "fileSearchStores/docs-1";

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Create a valid test configuration rooted in `dir`
///
/// The files and exports directories live under `dir`, the API key is set
/// and upload polling is one second.
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.api.api_key = Some("test-key".to_string());
    config.file_search.files_dir = dir.path().join("files");
    config.file_search.poll_interval_seconds = 1;
    config.export.exports_dir = dir.path().join("exports");
    config
}

/// A fake API holding one store named [`TEST_STORE`]
pub fn fake_api_with_store() -> Arc<FakeFileSearchApi> {
    Arc::new(FakeFileSearchApi::new().with_store(TEST_STORE, "docs-1"))
}

/// Poll interval short enough for tests that wait on pending uploads
pub fn fast_poll() -> Duration {
    Duration::from_millis(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_test_config_is_valid() {
        let dir = temp_dir();
        let config = test_config(&dir);
        assert!(config.validate().is_ok());
        assert!(config.export.exports_dir.starts_with(dir.path()));
    }

    #[tokio::test]
    async fn test_fake_api_with_store() {
        use crate::api::FileSearchApi;
        let fake = fake_api_with_store();
        assert!(fake.get_store(TEST_STORE).await.is_ok());
    }
}
