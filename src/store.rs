//! Directory-per-track persistence surface.
//!
//! Every stored track is one directory under the store root, holding the
//! track document, the summary sidecar and any attached media files. The
//! track name is the directory name, which is what makes names unique.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{RenameError, Result, TraceError};

/// Filename of the main track document inside a track directory.
pub const TRACK_FILE: &str = "track.xml";

/// Filename of the track summary sidecar.
pub const INFO_FILE: &str = "info.xml";

/// Handle to the on-disk track store.
#[derive(Debug, Clone)]
pub struct TrackStore {
    root: PathBuf,
}

impl TrackStore {
    /// Open the store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| TraceError::StorageInit {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the named track's document and media.
    pub fn track_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Path of the named track's main document.
    pub fn document_path(&self, name: &str) -> PathBuf {
        self.track_dir(name).join(TRACK_FILE)
    }

    /// Path of the named track's summary sidecar.
    pub fn info_path(&self, name: &str) -> PathBuf {
        self.track_dir(name).join(INFO_FILE)
    }

    /// Ensure the named track's directory exists and return it.
    pub fn create(&self, name: &str) -> Result<PathBuf> {
        let dir = self.track_dir(name);
        fs::create_dir_all(&dir).map_err(|source| TraceError::StorageInit {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    /// Whether a saved track of that name exists.
    pub fn exists(&self, name: &str) -> bool {
        self.document_path(name).is_file()
    }

    /// Names of all saved tracks.
    ///
    /// Directories without a track document are leftovers of failed or
    /// abandoned saves and are swept while scanning; a failed sweep is
    /// logged and ignored.
    pub fn list(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot read store root {}: {e}", self.root.display());
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if self.exists(&name) {
                names.push(name);
            } else {
                remove_dir_logged(&path);
            }
        }
        names.sort();
        names
    }

    /// Delete the named track: document, media files and directory.
    ///
    /// Individual file deletions that fail are logged and skipped; only a
    /// missing store root is an error.
    pub fn delete(&self, name: &str) -> Result<()> {
        let dir = self.track_dir(name);
        if !dir.is_dir() {
            return Ok(());
        }
        remove_dir_logged(&dir);
        Ok(())
    }

    /// Rename a stored track, with each failure mode distinguishable.
    pub fn rename(&self, old: &str, new: &str) -> std::result::Result<(), RenameError> {
        let old_dir = self.track_dir(old);
        if !old_dir.is_dir() {
            return Err(RenameError::SourceMissing(old.to_string()));
        }

        let new_dir = self.track_dir(new);
        if new_dir.exists() {
            return Err(RenameError::DestinationExists(new.to_string()));
        }

        fs::rename(&old_dir, &new_dir).map_err(|e| RenameError::Failed(e.to_string()))
    }
}

/// Remove every file in `dir`, then the directory itself, logging and
/// continuing on individual failures.
fn remove_dir_logged(dir: &Path) {
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                if let Err(e) = fs::remove_file(&path) {
                    warn!("could not delete file {}: {e}", path.display());
                }
            }
        }
    }
    if let Err(e) = fs::remove_dir(dir) {
        warn!("could not delete directory {}: {e}", dir.display());
    }
}
