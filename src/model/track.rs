//! The track: root aggregate of one recording session.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::geo_utils::path_length;
use crate::notify::{Change, ChangeQueue};
use crate::GeoPoint;

use super::{iso_timestamp, IdAllocator, Media, Node, Way};

/// Either entity an id lookup can resolve to.
#[derive(Debug)]
pub enum MapObject<'a> {
    Node(&'a Node),
    Way(&'a Way),
}

/// One recording session: free POI nodes, ways/areas, attached media and
/// at most one way currently being recorded.
///
/// The track's `name` doubles as its on-disk directory name and must be
/// unique among stored tracks; uniqueness is enforced at the store
/// boundary, not here.
#[derive(Debug)]
pub struct Track {
    name: String,
    datetime: String,
    comment: String,
    nodes: Vec<Node>,
    ways: Vec<Way>,
    media: Vec<Media>,
    current_way: Option<i64>,
}

impl Track {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            datetime: iso_timestamp(),
            comment: String::new(),
            nodes: Vec::new(),
            ways: Vec::new(),
            media: Vec::new(),
            current_way: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn datetime(&self) -> &str {
        &self.datetime
    }

    pub fn set_datetime(&mut self, datetime: impl Into<String>) {
        self.datetime = datetime.into();
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Free-standing POI nodes, in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    pub fn media(&self) -> &[Media] {
        &self.media
    }

    pub fn add_media(&mut self, medium: Media) {
        self.media.push(medium);
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Create a free POI node with a resolved coordinate.
    pub fn new_node(&mut self, ids: &IdAllocator, coordinates: GeoPoint) -> &mut Node {
        let idx = self.nodes.len();
        self.nodes.push(Node::new(ids.allocate(), Some(coordinates)));
        &mut self.nodes[idx]
    }

    /// Create a free POI node that is still waiting for its fix.
    pub fn new_pending_node(&mut self, ids: &IdAllocator) -> &mut Node {
        let idx = self.nodes.len();
        self.nodes.push(Node::new(ids.allocate(), None));
        &mut self.nodes[idx]
    }

    /// Create an empty way and append it to this track.
    pub fn new_way(&mut self, ids: &IdAllocator) -> &mut Way {
        let idx = self.ways.len();
        self.ways.push(Way::new(ids.allocate(), false));
        &mut self.ways[idx]
    }

    pub(crate) fn push_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub(crate) fn push_way(&mut self, way: Way) {
        self.ways.push(way);
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Delete the node with the given id, searching free nodes first and
    /// then every way's members.
    ///
    /// The removed node is unlinked from its container, its stale view
    /// reference is queued for invalidation and the node is returned.
    /// A miss is an idempotent no-op, not an error.
    pub fn delete_node(&mut self, node_id: i64, changes: &ChangeQueue) -> Option<Node> {
        if let Some(pos) = self.nodes.iter().position(|n| n.id() == node_id) {
            let node = self.nodes.remove(pos);
            changes.push(Change::NodeInvalidated(node_id));
            return Some(node);
        }

        for way in &mut self.ways {
            if let Some(node) = way.delete_node(node_id) {
                changes.push(Change::NodeInvalidated(node_id));
                return Some(node);
            }
        }
        None
    }

    /// Delete the way with the given id together with its member nodes.
    ///
    /// A detached way member has no independent meaning, so members are
    /// dropped with the way; each one is queued for invalidation. Clears
    /// the current-way marker if it pointed at the deleted way.
    pub fn delete_way(&mut self, way_id: i64, changes: &ChangeQueue) -> Option<Way> {
        let pos = self.ways.iter().position(|w| w.id() == way_id)?;
        let way = self.ways.remove(pos);
        for node in way.nodes() {
            changes.push(Change::NodeInvalidated(node.id()));
        }
        if self.current_way == Some(way_id) {
            self.current_way = None;
        }
        Some(way)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Linear search across free nodes, then way members, then ways.
    pub fn get_by_id(&self, id: i64) -> Option<MapObject<'_>> {
        if let Some(node) = self.node_by_id(id) {
            return Some(MapObject::Node(node));
        }
        self.way_by_id(id).map(MapObject::Way)
    }

    pub fn node_by_id(&self, node_id: i64) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.id() == node_id)
            .or_else(|| self.ways.iter().find_map(|w| w.node_by_id(node_id)))
    }

    pub fn node_by_id_mut(&mut self, node_id: i64) -> Option<&mut Node> {
        if let Some(pos) = self.nodes.iter().position(|n| n.id() == node_id) {
            return self.nodes.get_mut(pos);
        }
        self.ways
            .iter_mut()
            .find_map(|w| w.node_by_id_mut(node_id))
    }

    pub fn way_by_id(&self, way_id: i64) -> Option<&Way> {
        self.ways.iter().find(|w| w.id() == way_id)
    }

    pub fn way_by_id_mut(&mut self, way_id: i64) -> Option<&mut Way> {
        self.ways.iter_mut().find(|w| w.id() == way_id)
    }

    // ========================================================================
    // Current way
    // ========================================================================

    /// Mark the way being recorded, or end recording with `None`.
    ///
    /// The marker must name a way of this track; an unknown id clears it.
    pub fn set_current_way(&mut self, way_id: Option<i64>) -> Option<&Way> {
        match way_id {
            Some(id) if self.way_by_id(id).is_none() => {
                warn!("way {id} is not part of track '{}'", self.name);
                self.current_way = None;
            }
            other => self.current_way = other,
        }
        self.current_way()
    }

    pub fn current_way_id(&self) -> Option<i64> {
        self.current_way
    }

    pub fn current_way(&self) -> Option<&Way> {
        self.current_way.and_then(|id| self.way_by_id(id))
    }

    pub fn current_way_mut(&mut self) -> Option<&mut Way> {
        self.current_way.and_then(|id| self.way_by_id_mut(id))
    }

    // ========================================================================
    // Summary
    // ========================================================================

    /// Total number of attached media across the track and its entities.
    pub fn media_count(&self) -> usize {
        self.media.len()
            + self.nodes.iter().map(|n| n.media().len()).sum::<usize>()
            + self
                .ways
                .iter()
                .map(|w| {
                    w.media().len()
                        + w.nodes().iter().map(|n| n.media().len()).sum::<usize>()
                })
                .sum::<usize>()
    }

    /// Combined length of all ways in meters.
    pub fn length_meters(&self) -> f64 {
        self.ways.iter().map(|w| path_length(&w.coordinates())).sum()
    }

    /// The smallest id used by any entity of this track.
    pub(crate) fn min_id(&self) -> Option<i64> {
        let node_ids = self
            .nodes
            .iter()
            .chain(self.ways.iter().flat_map(|w| w.nodes().iter()))
            .map(Node::id);
        let way_ids = self.ways.iter().map(Way::id);
        node_ids.chain(way_ids).min()
    }

    pub fn info(&self) -> TrackInfo {
        TrackInfo {
            name: self.name.clone(),
            timestamp: self.datetime.clone(),
            comment: self.comment.clone(),
            pois: self.nodes.len(),
            ways: self.ways.len(),
            media: self.media_count(),
        }
    }
}

/// Lightweight per-track summary, persisted in a sidecar document so
/// listings never have to parse full track documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub name: String,
    pub timestamp: String,
    pub comment: String,
    pub pois: usize,
    pub ways: usize,
    pub media: usize,
}
