mod config;

pub use config::{ActivitiesConfig, BackgroundConfig, Config, NotificationsConfig, TimerConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `ZUMBAZOMBIE_HOME` wins when set. Otherwise `~/.config/zumbazombie[-dev]/`
/// based on `ZUMBAZOMBIE_ENV` (set it to `dev` for the development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("ZUMBAZOMBIE_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ZUMBAZOMBIE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("zumbazombie-dev")
            } else {
                base_dir.join("zumbazombie")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
