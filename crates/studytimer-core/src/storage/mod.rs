mod config;
pub mod daily;
pub mod database;
mod kv;
pub mod session;

pub use config::{AudioConfig, Config, HostConfig, NotificationsConfig, TimerConfig};
pub use daily::DailyTotal;
pub use database::Database;
pub use kv::{KvStore, MemoryStore};
pub use session::SessionStore;

use std::path::PathBuf;

use crate::error::StoreError;

/// Returns the directory holding the config file and database.
///
/// `STUDYTIMER_DATA_DIR` wins when set. Otherwise `~/.config/studytimer[-dev]/`
/// depending on `STUDYTIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let dir = match std::env::var_os("STUDYTIMER_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STUDYTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studytimer-dev")
            } else {
                base_dir.join("studytimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StoreError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
