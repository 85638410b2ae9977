#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A fake home directory plus a separate scratch area for list and config
/// files, so they never show up in the audit itself.
///
/// The home always holds an unhidden `Documents` directory, which is exempt,
/// so the root itself never folds.
pub struct TestHome {
    pub home: TempDir,
    pub scratch: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let home = TempDir::new().expect("Failed to create home dir");
        fs::create_dir(home.path().join("Documents")).unwrap();
        Self {
            home,
            scratch: TempDir::new().expect("Failed to create scratch dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.home.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.home.path().join(rel)
    }

    pub fn file(&self, rel: &str) -> &Self {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel).unwrap();
        self
    }

    pub fn dir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.path(rel)).unwrap();
        self
    }

    pub fn symlink(&self, rel: &str, target: &str) -> &Self {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        symlink(target, &path).unwrap();
        self
    }

    /// Writes a list or config file outside the home tree.
    pub fn scratch_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.scratch.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// The binary, isolated from the caller's environment.
    pub fn purity(&self) -> Command {
        let mut cmd = Command::cargo_bin("purity").expect("Failed to find purity binary");
        cmd.env("HOME", self.root())
            .env("PURITY_CONFIG_PATH", self.scratch.path().join("config.toml"))
            .env_remove("PURITY_ALLOW_LIST")
            .env_remove("PURITY_DENY_LIST")
            .env_remove("PURITY_LOG");
        cmd
    }

    /// Expected stdout for the given home-relative paths.
    pub fn lines(&self, rels: &[&str]) -> String {
        rels.iter()
            .map(|rel| format!("{}\n", self.path(rel).display()))
            .collect()
    }
}
