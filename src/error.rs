//! Unified error handling.
//!
//! Lookup misses throughout the entity graph are `Option`s, never errors.
//! Only I/O at the store and serializer boundary produces error values,
//! and rename failures carry distinguishable outcomes so callers can react
//! to a name conflict differently than to a missing source.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TraceError>;

/// Errors surfaced by storage and serialization operations.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The backing directory for the store or a track could not be set up.
    #[error("storage initialization failed at {}: {source}", path.display())]
    StorageInit { path: PathBuf, source: io::Error },

    /// Writing a track document failed. The in-memory track is unaffected;
    /// only the persisted copy must be considered stale.
    #[error("failed to write document for track '{name}': {source}")]
    Serialize { name: String, source: io::Error },

    /// A file operation outside the serializer failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    /// An operation that needs a loaded track was called without one.
    #[error("no track is loaded")]
    NoActiveTrack,
}

/// Distinguishable outcomes of a track rename.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("track '{0}' does not exist")]
    SourceMissing(String),

    #[error("a track named '{0}' already exists")]
    DestinationExists(String),

    #[error("renaming track failed: {0}")]
    Failed(String),
}
