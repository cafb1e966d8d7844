//! Filesystem helpers for generated configuration files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Whether `path` exists and is a regular file.
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Write `contents` to `path`, creating parent directories first and applying
/// `mode` on unix.
pub fn create_dir_and_write_to_file(contents: &[u8], path: &Path, mode: u32) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
    }

    fs::write(path, contents).map_err(|e| CoreError::io(path, e))?;
    set_mode(path, mode)?;

    debug!("Wrote {} bytes to {:?} (mode {:o})", contents.len(), path, mode);
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> CoreResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| CoreError::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> CoreResult<()> {
    Ok(())
}
