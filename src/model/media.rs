//! Media references attached to tracks, ways and nodes.
//!
//! The library never records audio or video itself; it only stores the
//! path/name/kind triple a recorder hands back, and derives the kind from
//! the filename extension.

use std::path::{Path, PathBuf};

use log::warn;

use super::filename_timestamp;

/// Kind of an attached medium, derived from its filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Text,
    Picture,
    Audio,
    Video,
}

impl MediaKind {
    /// The filename extension used for this kind, dot included.
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Text => ".txt",
            MediaKind::Picture => ".jpg",
            MediaKind::Audio => ".m4a",
            MediaKind::Video => ".mp4",
        }
    }

    /// Derive the kind from a filename; `None` for unknown extensions.
    pub fn from_filename(name: &str) -> Option<Self> {
        [
            MediaKind::Text,
            MediaKind::Picture,
            MediaKind::Audio,
            MediaKind::Video,
        ]
        .into_iter()
        .find(|kind| name.ends_with(kind.extension()))
    }
}

/// Reference to one medium stored next to a track's document.
///
/// `name` is the plain filename; `path` is the directory holding it. The
/// persisted document stores only `name`, so media stay attached when a
/// track directory is renamed or moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    path: PathBuf,
    name: String,
    kind: MediaKind,
}

impl Media {
    /// Create a reference to `name` inside `dir`; `None` if the filename
    /// extension maps to no known kind.
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let kind = MediaKind::from_filename(&name)?;
        Some(Self {
            path: dir.into(),
            name,
            kind,
        })
    }

    /// Resolve a medium that must already exist on disk.
    ///
    /// Returns `None` (with a log entry) when the file is absent or its
    /// extension is unknown.
    pub fn from_existing(dir: &Path, name: &str) -> Option<Self> {
        if !dir.join(name).is_file() {
            warn!("medium '{}' not found in {}", name, dir.display());
            return None;
        }
        Self::new(dir, name)
    }

    /// A fresh timestamp-derived filename for a medium of `kind`.
    pub fn new_filename(kind: MediaKind) -> String {
        format!("{}{}", filename_timestamp(), kind.extension())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Full path of the referenced file.
    pub fn full_path(&self) -> PathBuf {
        self.path.join(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_filename() {
        assert_eq!(
            MediaKind::from_filename("2024-05-01_10-00-00.jpg"),
            Some(MediaKind::Picture)
        );
        assert_eq!(MediaKind::from_filename("note.txt"), Some(MediaKind::Text));
        assert_eq!(MediaKind::from_filename("clip.m4a"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::from_filename("clip.mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_filename("archive.zip"), None);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(Media::new("/tmp", "file.zip").is_none());
    }

    #[test]
    fn new_filename_carries_extension() {
        let name = Media::new_filename(MediaKind::Audio);
        assert!(name.ends_with(".m4a"));
        assert_eq!(MediaKind::from_filename(&name), Some(MediaKind::Audio));
    }
}
