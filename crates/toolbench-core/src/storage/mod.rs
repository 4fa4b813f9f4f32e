mod config;
pub mod store;
pub mod transfer;

pub use config::{Config, GeneralConfig, HousingDefaults, LoggingConfig};
pub use store::{JsonStore, ToolKey};
pub use transfer::{
    merge_by_id, ExportEnvelope, Identified, ImportMode, ImportSummary, MergeSummary,
    Transferable, EXPORT_VERSION,
};

use std::path::PathBuf;

use crate::error::{Result, StorageError};

/// Returns the data directory, creating it if needed.
///
/// `TOOLBENCH_DATA_DIR` wins when set. Otherwise `~/.config/toolbench[-dev]/`
/// based on `TOOLBENCH_ENV` (set `TOOLBENCH_ENV=dev` for a development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("TOOLBENCH_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TOOLBENCH_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("toolbench-dev")
            } else {
                base_dir.join("toolbench")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
