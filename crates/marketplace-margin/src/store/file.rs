use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::StoreError;

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Reads a whole file; `Ok(None)` when it does not exist.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(error) => Err(io_error(path, error)),
    }
}

/// Writes through a sibling temp file and renames, so readers never see half a document.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| io_error(parent, error))?;
    }

    let staging = path.with_extension("json.tmp");
    fs::write(&staging, contents).map_err(|error| io_error(&staging, error))?;
    fs::rename(&staging, path).map_err(|error| io_error(path, error))
}

pub(crate) fn remove_if_exists(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        Err(error) => Err(io_error(path, error)),
    }
}

/// Renames `path` to `<path>.<suffix>`, replacing an earlier file of that name.
pub(crate) fn set_aside(path: &Path, suffix: &str) -> Result<PathBuf, StoreError> {
    let mut target = path.as_os_str().to_owned();
    target.push(".");
    target.push(suffix);
    let target = PathBuf::from(target);

    fs::rename(path, &target).map_err(|error| io_error(path, error))?;
    Ok(target)
}
