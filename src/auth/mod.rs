//! Session state and its persistence.

pub mod storage;
pub mod store;

use std::path::{Path, PathBuf};

pub use storage::{FileStorage, MemoryStorage, Storage, TOKEN_KEY, USER_KEY};
pub use store::{AuthAction, AuthState, AuthStore};

/// File name of the persisted session inside the config directory.
pub const SESSION_FILE: &str = "session.json";

pub fn session_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SESSION_FILE)
}

/// Load the session persisted under `config_dir`.
pub fn open_session(config_dir: &Path) -> AuthStore<FileStorage> {
    AuthStore::load(FileStorage::new(session_path(config_dir)))
}
