use crate::errors::{ChangesetError, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub mod spinner;

/// Atomic file writes so an interrupted run never leaves a truncated
/// settings file or report behind
pub mod atomic_file {
    use super::*;

    /// Serialize `data` as pretty JSON and write it atomically
    pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| ChangesetError::config(format!("Failed to serialize data: {e}")))?;
        write_string(path, &content)
    }

    /// Write to a sibling temporary file, then rename over `path`
    pub fn write_string(path: &Path, content: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");

        fs::write(&temp_path, content)
            .map_err(|e| ChangesetError::config(format!("Failed to write temporary file: {e}")))?;

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(ChangesetError::config(format!(
                "Failed to finalize write of {}: {e}",
                path.display()
            )));
        }
        Ok(())
    }
}
