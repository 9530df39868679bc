//! One survey session: the explicit current-track state and the
//! recording flow that turns incoming fixes into entity-graph mutations.
//!
//! All mutation of the active track happens through one `Session` value,
//! which serializes add, delete, filter and save against each other. The
//! only structure shared with other threads is the change queue handed
//! out by [`Session::changes`].

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};

use crate::document;
use crate::error::{RenameError, Result, TraceError};
use crate::filter;
use crate::model::{filename_timestamp, IdAllocator, Media, MediaKind, Track, TrackInfo};
use crate::notify::{Change, ChangeQueue};
use crate::store::TrackStore;
use crate::GeoPoint;

/// Weight of the center point during the smoothing pass.
const SMOOTHEN_WEIGHT: f64 = 3.0;

/// Window size of the smoothing pass.
const SMOOTHEN_WINDOW: usize = 3;

/// Threshold multiplier of the decimation pass.
const DECIMATE_WEIGHT: f64 = 2.0;

/// A survey session: at most one active track, an id allocator, the
/// change queue and the recording state.
#[derive(Debug)]
pub struct Session {
    store: TrackStore,
    ids: IdAllocator,
    changes: Arc<ChangeQueue>,
    track: Option<Track>,
    /// Nodes created before their GPS fix arrived, oldest first.
    pending: VecDeque<i64>,
    /// In one-shot mode a way gets one point per explicit request
    /// instead of one per incoming fix.
    one_shot: bool,
}

impl Session {
    /// Open a session over the store at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            store: TrackStore::open(root)?,
            ids: IdAllocator::new(),
            changes: Arc::new(ChangeQueue::new()),
            track: None,
            pending: VecDeque::new(),
            one_shot: false,
        })
    }

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Shared handle to the invalidation queue for the presentation layer.
    pub fn changes(&self) -> Arc<ChangeQueue> {
        Arc::clone(&self.changes)
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn track_mut(&mut self) -> Option<&mut Track> {
        self.track.as_mut()
    }

    // ========================================================================
    // Track lifecycle
    // ========================================================================

    /// Create a fresh track with a timestamp-derived unique name and make
    /// it the active track. Fails only when its directory cannot be set up.
    pub fn new_track(&mut self) -> Result<&Track> {
        let base = filename_timestamp();
        let mut name = base.clone();
        let mut suffix = 2;
        while self.store.track_dir(&name).exists() {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }

        self.store.create(&name)?;
        self.reset_recording();
        Ok(self.track.insert(Track::new(name)))
    }

    /// Load a stored track and make it the active track.
    ///
    /// Returns `None` (leaving the previous track active) when the named
    /// track does not exist or its document cannot be parsed.
    pub fn load_track(&mut self, name: &str) -> Option<&Track> {
        let track = document::read_track(&self.store, &self.ids, name)?;
        self.reset_recording();
        self.track = Some(track);
        self.track.as_ref()
    }

    /// Drop the active track without saving.
    pub fn unload(&mut self) {
        self.reset_recording();
        self.track = None;
    }

    /// Persist the active track.
    ///
    /// On failure the track stays loaded and editable; only the stored
    /// copy is stale.
    pub fn save(&self) -> Result<()> {
        let track = self.track.as_ref().ok_or(TraceError::NoActiveTrack)?;
        document::write_track(&self.store, track)
    }

    /// Names of all stored tracks.
    pub fn tracks(&self) -> Vec<String> {
        self.store.list()
    }

    /// Summary of a stored track without loading it.
    pub fn track_info(&self, name: &str) -> Option<TrackInfo> {
        document::read_info(&self.store, name)
    }

    /// Delete a stored track; unloads it first if it is the active one.
    pub fn delete_track(&mut self, name: &str) -> Result<()> {
        if self.track.as_ref().is_some_and(|t| t.name() == name) {
            self.unload();
        }
        self.store.delete(name)
    }

    /// Rename a stored track, keeping the active track's name in sync.
    pub fn rename_track(&mut self, old: &str, new: &str) -> std::result::Result<(), RenameError> {
        self.store.rename(old, new)?;
        if let Some(track) = self.track.as_mut() {
            if track.name() == old {
                track.set_name(new);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Start recording a way or area, or keep recording the current one.
    ///
    /// In one-shot mode each call appends one pending node, resolved by
    /// the next fix; in continuous mode every incoming fix appends a node
    /// by itself. Returns the id of the way being recorded.
    pub fn begin_way(&mut self, area: bool, one_shot: bool) -> Result<i64> {
        let track = self.track.as_mut().ok_or(TraceError::NoActiveTrack)?;
        self.one_shot = one_shot;

        let way_id = match track.current_way_id() {
            Some(id) => id,
            None => {
                let id = track.new_way(&self.ids).id();
                track.set_current_way(Some(id));
                id
            }
        };

        if area {
            if let Some(way) = track.way_by_id_mut(way_id) {
                way.set_area(true);
            }
        }

        if one_shot {
            if let Some(way) = track.way_by_id_mut(way_id) {
                let node_id = way.new_pending_node(&self.ids).id();
                self.pending.push_back(node_id);
            }
        }

        Ok(way_id)
    }

    /// Finish recording the current way.
    ///
    /// Ways that never got two nodes are discarded. In continuous mode
    /// the trace filter refines the way before it is reported closed:
    /// first the smoothing pass, then decimation. Returns the id of the
    /// closed way, or `None` if there was nothing worth keeping.
    pub fn end_way(&mut self) -> Option<i64> {
        // in one-shot mode the closing point is still waiting for its fix
        if self.one_shot && self.track.as_ref()?.current_way_id().is_some() {
            if let Err(e) = self.begin_way(false, true) {
                warn!("could not append closing point: {e}");
            }
        }

        let track = self.track.as_mut()?;
        let way_id = track.current_way_id()?;
        track.set_current_way(None);

        if track.way_by_id(way_id).is_none_or(|w| w.len() < 2) {
            track.delete_way(way_id, &self.changes);
            return None;
        }

        if !self.one_shot {
            if let Some(way) = track.way_by_id_mut(way_id) {
                filter::smoothen(way.nodes_mut(), SMOOTHEN_WEIGHT, SMOOTHEN_WINDOW);
                filter::decimate(way.nodes_mut(), DECIMATE_WEIGHT, &self.changes);
            }
        }

        self.changes.push(Change::WayClosed(way_id));
        Some(way_id)
    }

    /// Create a point of interest awaiting its fix: on the way currently
    /// being recorded, or free-standing on the track.
    pub fn create_poi(&mut self, on_way: bool) -> Result<i64> {
        let track = self.track.as_mut().ok_or(TraceError::NoActiveTrack)?;

        if on_way {
            if let Some(way) = track.current_way_mut() {
                let node_id = way.new_pending_node(&self.ids).id();
                self.pending.push_back(node_id);
                return Ok(node_id);
            }
        }

        let node_id = track.new_pending_node(&self.ids).id();
        self.pending.push_back(node_id);
        Ok(node_id)
    }

    /// Feed one coordinate fix from the positioning source.
    ///
    /// Pending nodes are resolved first; otherwise, in continuous
    /// recording mode, the fix extends the current way by one node.
    /// Without an active track the fix is dropped.
    pub fn record_fix(&mut self, fix: GeoPoint) {
        let Some(track) = self.track.as_mut() else {
            debug!("dropping fix: no active track");
            return;
        };

        if !self.pending.is_empty() {
            while let Some(node_id) = self.pending.pop_front() {
                let Some(node) = track.node_by_id_mut(node_id) else {
                    continue;
                };
                node.set_coordinates(Some(fix));
                self.changes.push(Change::NodeMoved {
                    way: node.parent_way(),
                    node: node_id,
                });
            }
            return;
        }

        if self.one_shot {
            return;
        }
        if let Some(way_id) = track.current_way_id() {
            if let Some(way) = track.way_by_id_mut(way_id) {
                let node_id = way.new_node(&self.ids, fix).id();
                self.changes.push(Change::WayUpdated {
                    way: way_id,
                    node: node_id,
                });
            }
        }
    }

    /// Drop all pending nodes that never received a fix.
    pub fn discard_invalid_nodes(&mut self) {
        let Some(track) = self.track.as_mut() else {
            self.pending.clear();
            return;
        };

        let mut dropped = false;
        while let Some(node_id) = self.pending.pop_front() {
            let still_pending = track
                .node_by_id(node_id)
                .is_some_and(|n| !n.is_valid());
            if still_pending {
                track.delete_node(node_id, &self.changes);
                dropped = true;
            }
        }
        if dropped {
            self.changes.push(Change::InvalidsDiscarded);
        }
    }

    // ========================================================================
    // Media
    // ========================================================================

    /// Write `text` as a timestamped note file in the active track's
    /// directory and return the media reference for attachment.
    pub fn save_text(&self, text: &str) -> Result<Media> {
        let track = self.track.as_ref().ok_or(TraceError::NoActiveTrack)?;
        let dir = self.store.create(track.name())?;

        let filename = Media::new_filename(MediaKind::Text);
        let path = dir.join(&filename);
        fs::write(&path, text).map_err(|source| TraceError::Io {
            path: path.clone(),
            source,
        })?;

        Media::new(&dir, &filename).ok_or_else(|| TraceError::Io {
            path,
            source: std::io::Error::other("note filename lost its extension"),
        })
    }

    fn reset_recording(&mut self) {
        self.pending.clear();
        self.one_shot = false;
    }
}
