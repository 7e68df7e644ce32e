//! Common test utilities for sitekit integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch host filesystem root plus an isolated config home
pub struct TestHost {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Filesystem root passed as `--root`
    pub root: PathBuf,
    /// `XDG_CONFIG_HOME` for the binary under test
    pub config_home: PathBuf,
}

impl TestHost {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("root");
        let config_home = temp.path().join("config");
        std::fs::create_dir_all(&root).expect("Failed to create root");
        std::fs::create_dir_all(&config_home).expect("Failed to create config home");
        Self {
            temp,
            root,
            config_home,
        }
    }

    /// Write a file beneath the host root
    #[allow(dead_code)]
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        write(&self.root.join(path), content)
    }

    /// Write a file next to the host root, outside of it
    #[allow(dead_code)]
    pub fn write_outside(&self, path: &str, content: &str) -> PathBuf {
        write(&self.temp.path().join(path), content)
    }

    /// The sitekit binary with a clean environment pointed at this host
    pub fn sitekit(&self) -> Command {
        let mut cmd = sitekit_cmd();
        cmd.env("XDG_CONFIG_HOME", &self.config_home)
            .arg("--root")
            .arg(&self.root);
        cmd
    }
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, content).expect("Failed to write file");
    path.to_path_buf()
}

/// The sitekit binary without any inherited sitekit environment
// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn sitekit_cmd() -> Command {
    let mut cmd = Command::cargo_bin("sitekit").expect("sitekit binary not built");
    cmd.env_remove("SITEKIT_CONFIG")
        .env_remove("SITEKIT_ROOT")
        .env_remove("SITEKIT_LOG");
    cmd
}
