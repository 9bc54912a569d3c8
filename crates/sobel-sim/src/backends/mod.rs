// SPDX-License-Identifier: AGPL-3.0-only

//! Simulation backend implementations
//!
//! Two backends available:
//! - **Icarus**: compiles and runs the RTL testbench (`iverilog` + `vvp`)
//! - **Software**: CPU golden model of the output stream, no simulator needed

pub mod icarus;
pub mod software;

pub use icarus::IcarusBackend;
pub use software::SoftwareBackend;

use crate::error::{Result, SimError};
use std::path::{Path, PathBuf};

/// Searches PATH for an executable, returning the first match.
pub(crate) fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// True when `a` and `b` name the same file, whether or not it exists yet.
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    normalize(a) == normalize(b)
}

/// Delete `path` if it exists, so a stale artifact can never pass for a
/// fresh one.
pub(crate) fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SimError::io(path, e)),
    }
}

fn normalize(path: &Path) -> PathBuf {
    if let Ok(full) = path.canonicalize() {
        return full;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map_or_else(|_| path.to_path_buf(), |dir| dir.join(name))
        }
        _ => path.to_path_buf(),
    }
}
