//! Trace filter: turns a jittery recorded point sequence into a clean
//! polyline in two independent passes.
//!
//! [`smoothen`] re-centers each interior point on a weighted sliding-window
//! mean to suppress GPS outliers; [`decimate`] then removes points whose
//! deviation from the line through their neighbors falls below an
//! automatically calibrated threshold. Both passes mutate the node
//! sequence in place, never reorder it and degrade to no-ops on
//! insufficient input.

use log::debug;

use crate::geo_utils::parallelogram_area;
use crate::model::Node;
use crate::notify::{Change, ChangeQueue};
use crate::GeoPoint;

/// Smoothen the node sequence with a weighted sliding-window mean.
///
/// A window of `window` consecutive valid nodes slides over the sequence;
/// pending nodes are skipped and do not count toward the window. For each
/// full window the middle node's coordinate is overwritten with the
/// window mean in which the middle element itself is weighted `weight`
/// and every other element 1:
///
/// `new = (sum of others + weight * middle) / (window - 1 + weight)`
///
/// All window means are computed from the coordinates as they were before
/// the pass, so the result does not depend on sliding direction. The
/// first and last `window / 2` valid nodes are never re-centered, which
/// keeps the trace endpoints exactly where they were recorded.
/// `window <= 1` makes the pass a no-op.
pub fn smoothen(nodes: &mut [Node], weight: f64, window: usize) {
    if window <= 1 || nodes.is_empty() {
        return;
    }

    let valid: Vec<usize> = (0..nodes.len()).filter(|&i| nodes[i].is_valid()).collect();
    if valid.len() < window {
        return;
    }

    let snapshot: Vec<GeoPoint> = valid
        .iter()
        .filter_map(|&i| nodes[i].coordinates())
        .collect();

    let denom = (window - 1) as f64 + weight;
    for start in 0..=(snapshot.len() - window) {
        let mut lat_sum = 0.0;
        let mut lon_sum = 0.0;
        for (pos, c) in snapshot[start..start + window].iter().enumerate() {
            if pos == window / 2 {
                lat_sum += c.latitude * weight;
                lon_sum += c.longitude * weight;
            } else {
                lat_sum += c.latitude;
                lon_sum += c.longitude;
            }
        }

        let center = valid[start + window / 2];
        nodes[center].set_coordinates(Some(GeoPoint::new(lat_sum / denom, lon_sum / denom)));
    }
}

/// Remove redundant points from the (typically already smoothed) node
/// sequence.
///
/// Two iterations over the same sequence:
/// 1. Calibration: the deviation of every interior valid node from the
///    line through its neighbors is accumulated (doubled triangle area)
///    and averaged over the node count, yielding the threshold.
/// 2. Removal: an interior node is dropped when its deviation is below
///    `threshold * weight`, it carries no tags or media, and it is not
///    the final node of the sequence.
///
/// Pending nodes without a coordinate are dropped unconditionally.
/// The threshold is computed once and not recalculated after removals.
/// Sequences shorter than 3 nodes are left untouched. Every removed
/// valid node is pushed to `changes` for view invalidation.
pub fn decimate(nodes: &mut Vec<Node>, weight: f64, changes: &ChangeQueue) {
    if nodes.len() < 3 {
        return;
    }

    // First iteration: drop pending nodes, accumulate the deviation of
    // each consecutive valid triple.
    nodes.retain(|n| n.is_valid());

    let mut threshold = 0.0;
    for triple in nodes.windows(3) {
        let (a, b, c) = (&triple[0], &triple[1], &triple[2]);
        if let (Some(pa), Some(pb), Some(pc)) =
            (a.coordinates(), b.coordinates(), c.coordinates())
        {
            threshold += parallelogram_area(pa, pb, pc);
        }
    }
    if nodes.is_empty() {
        return;
    }
    threshold /= nodes.len() as f64;
    debug!("decimation threshold: {threshold}");

    // Second iteration: remove interior nodes below the fixed threshold.
    let limit = threshold * weight;
    let mut a = 0;
    let mut b = 1;
    let mut c = 2;
    while c < nodes.len() {
        let deviation = match (
            nodes[a].coordinates(),
            nodes[b].coordinates(),
            nodes[c].coordinates(),
        ) {
            (Some(pa), Some(pb), Some(pc)) => parallelogram_area(pa, pb, pc),
            _ => {
                a = b;
                b = c;
                c += 1;
                continue;
            }
        };

        let is_last = b == nodes.len() - 1;
        if deviation < limit && !nodes[b].has_additional_info() && !is_last {
            let removed = nodes.remove(b);
            changes.push(Change::NodeInvalidated(removed.id()));
            // the former third point moves into the middle slot
            c = b + 1;
        } else {
            a = b;
            b = c;
            c += 1;
        }
    }
}
