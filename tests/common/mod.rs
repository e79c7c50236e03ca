#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use once_cell::sync::Lazy;
use tempfile::TempDir;
use tradebook_core::{config::ConfigManager, core::BookManager, storage::JsonBookStorage};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Returns a fresh directory that lives until the test binary exits.
pub fn temp_root() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates isolated managers backed by unique directories for each test.
pub fn setup_test_env() -> (BookManager, ConfigManager) {
    let base = temp_root();
    let storage = JsonBookStorage::with_retention(base.join("books"), base.join("backups"), 3)
        .expect("create json storage backend");
    let book_manager = BookManager::new(Box::new(storage));
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");

    (book_manager, config_manager)
}
