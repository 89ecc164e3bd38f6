//! JSON file error log
//!
//! Keeps a deduplicated list of fatal failure signatures across restarts.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::warn;

use cuenode_core::{CueError, CueResult, ErrorLog};

/// Error log persisted as a JSON array of strings
#[derive(Debug)]
pub struct JsonErrorLog {
    path: PathBuf,
    errors: Mutex<Vec<String>>,
}

impl JsonErrorLog {
    /// Open the log at `path`.
    ///
    /// A missing or unreadable file starts an empty log.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let errors = Self::load(&path);
        JsonErrorLog {
            path,
            errors: Mutex::new(errors),
        }
    }

    fn load(path: &Path) -> Vec<String> {
        let Ok(text) = std::fs::read_to_string(path) else {
            return Vec::new();
        };
        match serde_json::from_str(&text) {
            Ok(errors) => errors,
            Err(err) => {
                warn!(path = %path.display(), %err, "discarding unreadable error log");
                Vec::new()
            }
        }
    }

    fn dump(&self, errors: &[String]) -> CueResult<()> {
        let text = serde_json::to_string_pretty(errors)
            .map_err(|e| CueError::ErrorLog(e.to_string()))?;
        std::fs::write(&self.path, text)
            .map_err(|e| CueError::ErrorLog(format!("{}: {e}", self.path.display())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }
}

impl ErrorLog for JsonErrorLog {
    fn update(&self, signature: &str) -> CueResult<()> {
        let mut errors = self.errors.lock();
        if !errors.iter().any(|e| e == signature) {
            errors.push(signature.to_string());
        }
        self.dump(&errors)
    }

    fn get(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    fn clear(&self) -> CueResult<()> {
        let mut errors = self.errors.lock();
        errors.clear();
        self.dump(&errors)
    }
}
