use std::path::{Path, PathBuf};

use crate::error::ExportError;

/// Directory name used under the system temp dir when the requested one is
/// unusable.
pub const FALLBACK_DIR_NAME: &str = "beads_output";

/// Picks and creates the directory that receives STL files and the log.
///
/// The requested directory wins if it can be created. Otherwise, or if none
/// was requested, `<tmp>/beads_output` is used.
///
/// # Errors
///
/// Returns [`ExportError::NoOutputDir`] if neither directory can be created.
pub fn resolve_output_dir(requested: Option<&Path>) -> Result<PathBuf, ExportError> {
    if let Some(dir) = requested {
        match std::fs::create_dir_all(dir) {
            Ok(()) => return Ok(dir.to_path_buf()),
            Err(err) => tracing::warn!(
                dir = %dir.display(),
                error = %err,
                "cannot create output directory; falling back to temp"
            ),
        }
    }

    let fallback = std::env::temp_dir().join(FALLBACK_DIR_NAME);
    std::fs::create_dir_all(&fallback).map_err(|err| {
        ExportError::NoOutputDir(format!("{}: {err}", fallback.display()))
    })?;
    tracing::warn!(dir = %fallback.display(), "using temporary output directory");
    Ok(fallback)
}
