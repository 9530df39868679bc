//! Nodes: points of interest and way vertices.

use std::collections::HashMap;

use crate::GeoPoint;

use super::{iso_timestamp, Media};

/// A single surveyed point.
///
/// A node may be created before a GPS fix is available; until then it has
/// no coordinates and is "pending". Nodes that are members of a way carry
/// a non-owning back-reference to that way's id.
#[derive(Debug, Clone)]
pub struct Node {
    id: i64,
    coordinates: Option<GeoPoint>,
    datetime: String,
    tags: HashMap<String, String>,
    media: Vec<Media>,
    parent_way: Option<i64>,
}

impl Node {
    pub(crate) fn new(id: i64, coordinates: Option<GeoPoint>) -> Self {
        Self {
            id,
            coordinates,
            datetime: iso_timestamp(),
            tags: HashMap::new(),
            media: Vec::new(),
            parent_way: None,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn coordinates(&self) -> Option<GeoPoint> {
        self.coordinates
    }

    /// Overwrite the position, e.g. when a pending node receives its fix
    /// or the trace filter re-centers the point.
    pub fn set_coordinates(&mut self, coordinates: Option<GeoPoint>) {
        self.coordinates = coordinates;
    }

    /// Whether the node carries a resolved coordinate.
    pub fn is_valid(&self) -> bool {
        self.coordinates.is_some()
    }

    pub fn datetime(&self) -> &str {
        &self.datetime
    }

    pub fn set_datetime(&mut self, datetime: impl Into<String>) {
        self.datetime = datetime.into();
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.tags
    }

    pub fn media(&self) -> &[Media] {
        &self.media
    }

    pub fn add_media(&mut self, medium: Media) {
        self.media.push(medium);
    }

    /// Id of the way this node is a member of, if any.
    pub fn parent_way(&self) -> Option<i64> {
        self.parent_way
    }

    pub(crate) fn set_parent_way(&mut self, way: Option<i64>) {
        self.parent_way = way;
    }

    /// True when the node carries tags or media and must therefore never
    /// be decimated away.
    pub fn has_additional_info(&self) -> bool {
        !self.tags.is_empty() || !self.media.is_empty()
    }
}
