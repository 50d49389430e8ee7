//! Directory polling: keeps a [`ProxyWorld`] in step with the model files on disk.

use std::{
    collections::BTreeSet,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::world::{ProxyWorld, SyncReport};

#[derive(Clone, Debug)]
pub struct DirectoryWatcher {
    dir: PathBuf,
    extension: String,
}

impl DirectoryWatcher {
    /// `extension` is matched case-insensitively, without the leading dot.
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Regular files in the directory with the watched extension.
    /// A missing directory lists as empty.
    pub fn scan(&self) -> Result<BTreeSet<PathBuf>> {
        if !self.dir.is_dir() {
            log::debug!("{} does not exist (yet)", self.dir.display());
            return Ok(BTreeSet::new());
        }
        self.list()
    }

    fn list(&self) -> Result<BTreeSet<PathBuf>> {
        let mut files = BTreeSet::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // removed after the is_dir check in scan()
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("{} disappeared while listing", self.dir.display());
                return Ok(files);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to list directory: {}", self.dir.display()));
            }
        };
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to read entry in {}", self.dir.display()))?;
            let path = entry.path();
            if path.is_file() && self.matches_extension(&path) {
                files.insert(path);
            }
        }
        Ok(files)
    }

    /// One poll: scan, then add/remove proxies to match.
    pub fn poll(&self, world: &mut ProxyWorld) -> Result<SyncReport> {
        let listing = self.scan()?;
        let report = world.sync_with_listing(listing);
        if !report.is_empty() {
            log::info!(
                "{}: {} added, {} removed",
                self.dir.display(),
                report.added.len(),
                report.removed.len()
            );
        }
        Ok(report)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}
