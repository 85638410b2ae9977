#[cfg(test)]
pub mod fixtures {
    use std::fs;
    use std::os::unix::fs::symlink;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Throwaway home directory for walk tests.
    pub struct TestHome {
        pub temp_dir: TempDir,
    }

    impl TestHome {
        pub fn new() -> Self {
            Self {
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }

        pub fn root(&self) -> &Path {
            self.temp_dir.path()
        }

        pub fn path(&self, rel: &str) -> PathBuf {
            self.temp_dir.path().join(rel)
        }

        pub fn file(&self, rel: &str) -> &Self {
            let path = self.path(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, rel).unwrap();
            self
        }

        pub fn dir(&self, rel: &str) -> &Self {
            fs::create_dir_all(self.path(rel)).unwrap();
            self
        }

        pub fn symlink(&self, rel: &str, target: &str) -> &Self {
            let path = self.path(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            symlink(target, &path).unwrap();
            self
        }
    }
}
