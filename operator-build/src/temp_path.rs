use std::path::{Path, PathBuf};

/// A uniquely named directory under the system temporary directory that is removed on drop.
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new() -> Self {
        use rand::distributions::{Alphanumeric, DistString};

        const PREFIX: &str = "operator-build-";
        const LEN: usize = 16;

        let mut name = String::with_capacity(PREFIX.len() + LEN);
        name.push_str(PREFIX);
        Alphanumeric.append_string(&mut rand::thread_rng(), &mut name, LEN);

        let path = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Writes `contents` to `relative`, creating parent directories as needed.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.0.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}
