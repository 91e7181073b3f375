//! Reading and writing controls files on disk

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use openracing_bindings::Controls;
use openracing_errors::BinderError;
use tracing::{debug, info};

use crate::{deserialize_controls, serialize_controls};

#[derive(Debug, thiserror::Error)]
pub enum ControlsFileError {
    #[error("Failed to read controls file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write controls file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ControlsFileError {
    pub fn path(&self) -> &Path {
        match self {
            ControlsFileError::Read { path, .. } | ControlsFileError::Write { path, .. } => path,
        }
    }
}

impl From<ControlsFileError> for BinderError {
    fn from(e: ControlsFileError) -> Self {
        match e {
            ControlsFileError::Read { source, .. } | ControlsFileError::Write { source, .. } => {
                BinderError::Io(source)
            }
        }
    }
}

pub fn read_controls(path: &Path) -> Result<Controls, ControlsFileError> {
    let text = fs::read_to_string(path).map_err(|source| ControlsFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = ?path, "Read controls file");
    Ok(deserialize_controls(&text))
}

/// Write `controls` to `path`, replacing any previous file in one rename.
/// Missing parent directories are created.
pub fn write_controls(path: &Path, controls: &Controls) -> Result<(), ControlsFileError> {
    let write_error = |source| ControlsFileError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(write_error)?;

    // Each write gets its own temporary file next to the target.
    debug!(path = ?path, "Writing controls file atomically");
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(serialize_controls(controls).as_bytes())
        .map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;

    info!(path = ?path, devices = controls.devices.len(), "Saved controls file");
    Ok(())
}
