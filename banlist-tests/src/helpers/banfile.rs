//! Banfile fixtures in temporary directories

use banlist::{Banlist, BanlistConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// A banfile path inside its own temporary directory.
///
/// The directory (and everything in it) is removed on drop.
pub struct TestBanfile {
    dir: TempDir,
    path: PathBuf,
}

impl TestBanfile {
    /// Directory exists, banfile does not
    pub fn missing() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("banned-ips");
        Self { dir, path }
    }

    /// Banfile created with the given contents
    pub fn with_contents(contents: &str) -> Self {
        let banfile = Self::missing();
        banfile.write(contents);
        banfile
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> BanlistConfig {
        BanlistConfig::new(&self.path)
    }

    /// Truncate and write, like `echo ... > banfile`
    pub fn write(&self, contents: &str) {
        std::fs::write(&self.path, contents).expect("write banfile");
    }

    /// Append a line, like fail2ban's `echo ... >> banfile`
    pub fn append_line(&self, line: &str) {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .expect("open banfile for append");
        writeln!(file, "{}", line).expect("append to banfile");
    }

    /// Write a sibling temp file and rename it over the banfile
    pub fn replace_atomically(&self, contents: &str) {
        let tmp = self.dir.path().join(".banned-ips.tmp");
        std::fs::write(&tmp, contents).expect("write temp banfile");
        std::fs::rename(&tmp, &self.path).expect("rename over banfile");
    }

    /// Unlink the banfile and create a new one in its place
    pub fn recreate(&self, contents: &str) {
        std::fs::remove_file(&self.path).expect("remove banfile");
        self.write(contents);
    }

    /// Write a file next to the banfile that the ban list must ignore
    pub fn write_sibling(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write sibling file");
        path
    }

    /// Replace the banfile with a directory so every read fails
    pub fn break_banfile(&self) {
        if self.path.exists() {
            std::fs::remove_file(&self.path).expect("remove banfile");
        }
        std::fs::create_dir(&self.path).expect("create directory in place of banfile");
    }

    /// Create and start a ban list for this banfile
    pub async fn start(&self, config: BanlistConfig) -> Banlist {
        let mut banlist = Banlist::new(config, &CancellationToken::new());
        banlist.start().await.expect("start ban list");
        banlist
    }

    /// Start a ban list with the default configuration
    pub async fn start_default(&self) -> Banlist {
        self.start(self.config()).await
    }
}
