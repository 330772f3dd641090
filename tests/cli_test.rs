//! Binary-level tests for argument parsing and startup checks

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

fn ragchat() -> Command {
    let mut cmd = Command::cargo_bin("ragchat").expect("binary built");
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("RAGCHAT_API_BASE")
        .env_remove("RAGCHAT_MODEL");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    ragchat()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("stores"))
        .stdout(predicate::str::contains("upload"));
}

#[test]
fn test_missing_api_key_fails_fast() {
    let (dir, config_path) = common::temp_config_file("chat:\n  model: gemini-2.5-flash\n");
    ragchat()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config_path)
        .arg("stores")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_invalid_config_file_fails() {
    let (dir, config_path) = common::temp_config_file("chat: [unclosed");
    ragchat()
        .current_dir(dir.path())
        .env("GEMINI_API_KEY", "test-key")
        .arg("--config")
        .arg(&config_path)
        .arg("stores")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn test_delete_without_yes_is_refused() {
    let (dir, config_path) = common::temp_config_file(
        "api:\n  api_base: http://127.0.0.1:9\n  request_timeout_seconds: 1\n",
    );
    ragchat()
        .current_dir(dir.path())
        .env("GEMINI_API_KEY", "test-key")
        .arg("--config")
        .arg(&config_path)
        .args(["stores", "delete", "fileSearchStores/docs-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}
