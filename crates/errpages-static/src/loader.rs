//! Config file loading.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

/// A parsed page config: arbitrary JSON keys bound into the template as-is.
pub type Config = Map<String, Value>;

/// Errors that can occur while loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid JSON in {path}: {message}")]
    Parse { path: String, message: String },
}

/// Load a JSON config from disk.
///
/// A path that does not exist yields an empty config. A file that exists but
/// is not a JSON object is an error; callers skip such files.
pub fn load_config(path: &Path) -> Result<Config, LoadError> {
    if !path.exists() {
        return Ok(Config::new());
    }

    let content = fs::read_to_string(path).map_err(|e| LoadError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(LoadError::Parse {
            path: path.display().to_string(),
            message: "top-level value is not an object".to_string(),
        }),
        Err(e) => Err(LoadError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}
