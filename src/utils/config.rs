//! Optional TOML config files in the data directory.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// Parse `{data_path}/{file_name}` if it exists.
///
/// A file that cannot be read or parsed is logged and treated as absent, so
/// callers fall through to their env var and default.
pub fn read_toml_file<T: DeserializeOwned>(data_path: &Path, file_name: &str) -> Option<T> {
    let path = data_path.join(file_name);
    if !path.exists() {
        return None;
    }

    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|contents| toml::from_str::<T>(&contents).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => {
            info!("Loaded {}", path.display());
            Some(config)
        }
        Err(e) => {
            warn!("Ignoring {}: {}", path.display(), e);
            None
        }
    }
}
