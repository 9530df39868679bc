//! # fieldtrace
//!
//! GPS track data model and track-refinement pipeline for field surveying.
//!
//! Surveyors record points of interest, ways and areas while walking a
//! route. Raw GPS fixes are noisy, so this library provides:
//! - An in-memory entity graph of tracks, ways, nodes, tags and media
//!   references with strict identity and ownership rules
//! - A two-pass geometric trace filter (smoothing, then redundancy
//!   removal) that turns a jittery point stream into a clean polyline
//! - A self-describing on-disk document format with round-trip-correct
//!   persistence, one directory per track
//! - A change queue so a presentation layer can redraw incrementally
//!
//! The positioning source and any rendering are external: the library
//! consumes one coordinate fix at a time through [`Session::record_fix`]
//! and publishes invalidation events through [`ChangeQueue`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use fieldtrace::{GeoPoint, Session};
//!
//! let mut session = Session::open("./survey-data").unwrap();
//! session.new_track().unwrap();
//!
//! session.begin_way(false, false).unwrap();
//! session.record_fix(GeoPoint::new(52.455, 13.297));
//! session.record_fix(GeoPoint::new(52.456, 13.298));
//! session.record_fix(GeoPoint::new(52.457, 13.299));
//! let way_id = session.end_way();
//! assert!(way_id.is_some());
//!
//! session.save().unwrap();
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{RenameError, Result, TraceError};

// Geographic utilities (deviation area, distance, polygon tests)
pub mod geo_utils;

// Trace filter (smoothen + decimate)
pub mod filter;

// Invalidation queue for presentation-layer redraws
pub mod notify;
pub use notify::{Change, ChangeQueue};

// Entity graph: tracks, ways, nodes, media
pub mod model;
pub use model::{IdAllocator, MapObject, Media, MediaKind, Node, Track, TrackInfo, Way};

// Directory-per-track persistence surface
pub mod store;
pub use store::TrackStore;

// Track document serializer/deserializer
pub mod document;

// Explicit current-track state and the recording flow
pub mod session;
pub use session::Session;

// Deterministic noisy-fix generator for tests and the CLI demo
pub mod synthetic;

/// A GPS coordinate with latitude and longitude in decimal degrees.
///
/// Values outside the nominal [-90, 90] / [-180, 180] ranges are accepted
/// unchecked, matching the permissive behavior of GPS hardware.
///
/// # Example
/// ```
/// use fieldtrace::GeoPoint;
/// let point = GeoPoint::new(52.4556, 13.2972); // Berlin-Dahlem
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point from decimal-degree coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}
