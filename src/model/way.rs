//! Ways and areas: ordered lists of member nodes.

use std::collections::HashMap;

use crate::geo_utils::point_in_polygon;
use crate::GeoPoint;

use super::{iso_timestamp, IdAllocator, Media, Node};

/// An ordered polyline (way) or polygon (area) of member nodes.
///
/// The way owns its nodes; node order is record order. Nothing in the
/// library reorders members — the trace filter only removes. An area is
/// not closed structurally: whether first and last coordinates coincide
/// is up to the caller.
#[derive(Debug, Clone)]
pub struct Way {
    id: i64,
    datetime: String,
    is_area: bool,
    tags: HashMap<String, String>,
    media: Vec<Media>,
    nodes: Vec<Node>,
}

impl Way {
    pub(crate) fn new(id: i64, is_area: bool) -> Self {
        Self {
            id,
            datetime: iso_timestamp(),
            is_area,
            tags: HashMap::new(),
            media: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn datetime(&self) -> &str {
        &self.datetime
    }

    pub fn set_datetime(&mut self, datetime: impl Into<String>) {
        self.datetime = datetime.into();
    }

    pub fn is_area(&self) -> bool {
        self.is_area
    }

    pub fn set_area(&mut self, is_area: bool) {
        self.is_area = is_area;
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

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a new member node with a resolved coordinate.
    pub fn new_node(&mut self, ids: &IdAllocator, coordinates: GeoPoint) -> &mut Node {
        self.push_member(Node::new(ids.allocate(), Some(coordinates)))
    }

    /// Append a new member node that is still waiting for its fix.
    pub fn new_pending_node(&mut self, ids: &IdAllocator) -> &mut Node {
        self.push_member(Node::new(ids.allocate(), None))
    }

    /// Take ownership of `node` as the next member.
    pub(crate) fn push_member(&mut self, mut node: Node) -> &mut Node {
        node.set_parent_way(Some(self.id));
        let idx = self.nodes.len();
        self.nodes.push(node);
        &mut self.nodes[idx]
    }

    /// Remove the member with the given id, clearing its back-reference.
    pub fn delete_node(&mut self, node_id: i64) -> Option<Node> {
        let pos = self.nodes.iter().position(|n| n.id() == node_id)?;
        let mut node = self.nodes.remove(pos);
        node.set_parent_way(None);
        Some(node)
    }

    pub fn node_by_id(&self, node_id: i64) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == node_id)
    }

    pub fn node_by_id_mut(&mut self, node_id: i64) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id() == node_id)
    }

    /// The member coordinates in record order, skipping pending nodes.
    pub fn coordinates(&self) -> Vec<GeoPoint> {
        self.nodes.iter().filter_map(Node::coordinates).collect()
    }

    /// Hit-test a point against this way's polygon. Always false for
    /// non-areas and degenerate polygons.
    pub fn contains_point(&self, point: GeoPoint) -> bool {
        if !self.is_area {
            return false;
        }
        point_in_polygon(point, &self.coordinates())
    }
}
