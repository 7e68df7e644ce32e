//! Scratch directories for repository checkouts, kept out of the current
//! working directory even when TMPDIR is relative (e.g. TMPDIR=tmp).

use std::env;
use std::io;
use std::path::PathBuf;

use tempfile::TempDir;

const WORKSPACE_PREFIX: &str = "sitekit-";

/// Returns an absolute directory to create temporary directories in.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        PathBuf::from("/tmp")
    }
}

/// Create a fresh scratch workspace, removed when the handle is dropped.
pub fn workspace() -> io::Result<TempDir> {
    tempfile::Builder::new()
        .prefix(WORKSPACE_PREFIX)
        .tempdir_in(temp_dir_base())
}
