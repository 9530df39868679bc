//! Integration tests for the entity graph.

use fieldtrace::{GeoPoint, MapObject, Session};
use tempfile::TempDir;

fn session() -> (TempDir, Session) {
    let dir = TempDir::new().unwrap();
    let session = Session::open(dir.path()).unwrap();
    (dir, session)
}

#[test]
fn allocated_ids_are_unique() {
    let (_dir, session) = session();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..500 {
        assert!(seen.insert(session.ids().allocate()));
    }
}

#[test]
fn way_members_carry_their_way_id_exactly_once() {
    let (_dir, mut session) = session();
    session.new_track().unwrap();
    session.begin_way(false, false).unwrap();
    session.record_fix(GeoPoint::new(52.0, 13.0));
    session.record_fix(GeoPoint::new(52.001, 13.001));

    let track = session.track().unwrap();
    let way = track.current_way().unwrap();
    let way_id = way.id();

    for node in way.nodes() {
        assert_eq!(node.parent_way(), Some(way_id));
        let occurrences = way.nodes().iter().filter(|n| n.id() == node.id()).count();
        assert_eq!(occurrences, 1);
    }
}

#[test]
fn delete_node_unlinks_and_reports_the_node() {
    let (_dir, mut session) = session();
    let changes = session.changes();
    session.new_track().unwrap();
    session.begin_way(false, false).unwrap();
    session.record_fix(GeoPoint::new(52.0, 13.0));
    session.record_fix(GeoPoint::new(52.001, 13.001));

    let node_id = session.track().unwrap().current_way().unwrap().nodes()[0].id();
    changes.drain();

    let removed = session
        .track_mut()
        .unwrap()
        .delete_node(node_id, &changes)
        .unwrap();

    assert_eq!(removed.id(), node_id);
    assert_eq!(removed.parent_way(), None);

    let track = session.track().unwrap();
    for way in track.ways() {
        assert!(way.node_by_id(node_id).is_none());
    }
    assert_eq!(
        changes.drain(),
        vec![fieldtrace::Change::NodeInvalidated(node_id)]
    );
}

#[test]
fn delete_node_misses_are_idempotent() {
    let (_dir, mut session) = session();
    let changes = session.changes();
    session.new_track().unwrap();

    assert!(session
        .track_mut()
        .unwrap()
        .delete_node(12345, &changes)
        .is_none());
    assert!(changes.is_empty());
}

#[test]
fn delete_node_searches_free_pois_first() {
    let (_dir, mut session) = session();
    let changes = session.changes();
    session.new_track().unwrap();

    let poi_id = session.create_poi(false).unwrap();
    session.record_fix(GeoPoint::new(52.5, 13.5));

    let removed = session
        .track_mut()
        .unwrap()
        .delete_node(poi_id, &changes)
        .unwrap();
    assert_eq!(removed.id(), poi_id);
    assert!(session.track().unwrap().nodes().is_empty());
}

#[test]
fn delete_way_cascades_members_and_clears_current() {
    let (_dir, mut session) = session();
    let changes = session.changes();
    session.new_track().unwrap();
    let way_id = session.begin_way(false, false).unwrap();
    session.record_fix(GeoPoint::new(52.0, 13.0));
    session.record_fix(GeoPoint::new(52.001, 13.001));

    let member_ids: Vec<i64> = session
        .track()
        .unwrap()
        .current_way()
        .unwrap()
        .nodes()
        .iter()
        .map(|n| n.id())
        .collect();
    changes.drain();

    session.track_mut().unwrap().delete_way(way_id, &changes);

    let track = session.track().unwrap();
    assert!(track.way_by_id(way_id).is_none());
    assert!(track.current_way().is_none());
    for id in &member_ids {
        assert!(track.node_by_id(*id).is_none());
    }

    let events = changes.drain();
    for id in member_ids {
        assert!(events.contains(&fieldtrace::Change::NodeInvalidated(id)));
    }
}

#[test]
fn get_by_id_resolves_nodes_and_ways() {
    let (_dir, mut session) = session();
    session.new_track().unwrap();
    let way_id = session.begin_way(false, false).unwrap();
    session.record_fix(GeoPoint::new(52.0, 13.0));

    let poi_id = session.create_poi(false).unwrap();
    session.record_fix(GeoPoint::new(52.5, 13.5));

    let track = session.track().unwrap();
    assert!(matches!(
        track.get_by_id(poi_id),
        Some(MapObject::Node(n)) if n.id() == poi_id
    ));
    assert!(matches!(
        track.get_by_id(way_id),
        Some(MapObject::Way(w)) if w.id() == way_id
    ));
    assert!(track.get_by_id(99999).is_none());
}

#[test]
fn set_current_way_rejects_foreign_ids() {
    let (_dir, mut session) = session();
    session.new_track().unwrap();
    let way_id = session.begin_way(false, false).unwrap();

    let track = session.track_mut().unwrap();
    assert!(track.set_current_way(Some(424242)).is_none());
    assert!(track.current_way().is_none());

    assert!(track.set_current_way(Some(way_id)).is_some());
    assert_eq!(track.current_way_id(), Some(way_id));
}

#[test]
fn area_hit_test_through_the_graph() {
    let (_dir, mut session) = session();
    session.new_track().unwrap();
    let way_id = session.begin_way(true, false).unwrap();
    for (lat, lon) in [(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)] {
        session.record_fix(GeoPoint::new(lat, lon));
    }

    let track = session.track().unwrap();
    let area = track.way_by_id(way_id).unwrap();
    assert!(area.is_area());
    assert!(area.contains_point(GeoPoint::new(1.0, 1.0)));
    assert!(!area.contains_point(GeoPoint::new(3.0, 1.0)));
}
