//! Reading and writing the per-track document.
//!
//! Each saved track is one self-describing XML document: all point
//! elements first, then the ways that reference them by id, then the
//! track-level media links. A summary sidecar carries the track's
//! timestamp, comment and entity counts so listings stay cheap.
//!
//! Readers are lenient per element: a malformed point or way is skipped
//! with a warning and parsing continues with its siblings. Only a
//! missing or structurally unparsable document makes a load fail.

use std::fs;
use std::io;

use log::{debug, warn};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, TraceError};
use crate::model::{IdAllocator, Media, Node, Track, TrackInfo, Way};
use crate::store::TrackStore;
use crate::GeoPoint;

/// Format version stamped on every written document.
const FORMAT_VERSION: &str = "0.6";

/// Generator identifier stamped on every written document.
const GENERATOR: &str = "fieldtrace";

// ============================================================================
// Writing
// ============================================================================

/// Persist `track` through `store`.
///
/// The track's directory is created if absent. The document is rendered
/// completely before anything is written, so an I/O failure leaves either
/// the old document or an abandoned partial file, never a half-updated
/// one that readers would mistake for current; the in-memory track is
/// untouched either way.
pub fn write_track(store: &TrackStore, track: &Track) -> Result<()> {
    store.create(track.name())?;

    let serialize_err = |source: io::Error| TraceError::Serialize {
        name: track.name().to_string(),
        source,
    };

    let xml = render_track(track).map_err(serialize_err)?;
    fs::write(store.document_path(track.name()), xml).map_err(serialize_err)?;

    write_info(store, &track.info())
}

fn render_track(track: &Track) -> io::Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("osm");
    root.push_attribute(("version", FORMAT_VERSION));
    root.push_attribute(("generator", GENERATOR));
    writer.write_event(Event::Start(root))?;

    // all point elements first: free POIs, then every way's members
    for node in track.nodes() {
        write_node(&mut writer, node)?;
    }
    for way in track.ways() {
        for node in way.nodes() {
            write_node(&mut writer, node)?;
        }
    }

    for way in track.ways() {
        write_way(&mut writer, way)?;
    }

    for medium in track.media() {
        write_link(&mut writer, medium)?;
    }

    writer.write_event(Event::End(BytesEnd::new("osm")))?;
    Ok(writer.into_inner())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> io::Result<()> {
    let coords = node.coordinates().unwrap_or(GeoPoint::new(0.0, 0.0));

    let mut elem = BytesStart::new("node");
    elem.push_attribute(("id", node.id().to_string().as_str()));
    elem.push_attribute(("lat", format!("{:.7}", coords.latitude).as_str()));
    elem.push_attribute(("lon", format!("{:.7}", coords.longitude).as_str()));
    elem.push_attribute(("timestamp", node.datetime()));
    elem.push_attribute(("version", "1"));

    if node.tags().is_empty() && node.media().is_empty() {
        return writer.write_event(Event::Empty(elem));
    }

    writer.write_event(Event::Start(elem))?;
    write_tags(writer, node.tags())?;
    for medium in node.media() {
        write_link(writer, medium)?;
    }
    writer.write_event(Event::End(BytesEnd::new("node")))
}

fn write_way(writer: &mut Writer<Vec<u8>>, way: &Way) -> io::Result<()> {
    if way.is_empty() {
        return Ok(());
    }

    let mut elem = BytesStart::new("way");
    elem.push_attribute(("id", way.id().to_string().as_str()));
    elem.push_attribute(("timestamp", way.datetime()));
    elem.push_attribute(("version", "1"));
    writer.write_event(Event::Start(elem))?;

    for node in way.nodes() {
        let mut nd = BytesStart::new("nd");
        nd.push_attribute(("ref", node.id().to_string().as_str()));
        writer.write_event(Event::Empty(nd))?;
    }

    if way.is_area() {
        let mut tag = BytesStart::new("tag");
        tag.push_attribute(("k", "area"));
        tag.push_attribute(("v", "yes"));
        writer.write_event(Event::Empty(tag))?;
    }

    write_tags(writer, way.tags())?;
    for medium in way.media() {
        write_link(writer, medium)?;
    }
    writer.write_event(Event::End(BytesEnd::new("way")))
}

fn write_tags(
    writer: &mut Writer<Vec<u8>>,
    tags: &std::collections::HashMap<String, String>,
) -> io::Result<()> {
    // sorted for deterministic output
    let mut keys: Vec<&String> = tags.keys().collect();
    keys.sort();
    for key in keys {
        let mut tag = BytesStart::new("tag");
        tag.push_attribute(("k", key.as_str()));
        tag.push_attribute(("v", tags[key].as_str()));
        writer.write_event(Event::Empty(tag))?;
    }
    Ok(())
}

fn write_link(writer: &mut Writer<Vec<u8>>, medium: &Media) -> io::Result<()> {
    let mut link = BytesStart::new("link");
    link.push_attribute(("href", medium.name()));
    writer.write_event(Event::Empty(link))
}

// ============================================================================
// Reading
// ============================================================================

/// What the most recent relevant start element was, so tags and media
/// links attach to the right owner.
enum Context {
    Track,
    Node(i64),
    Way,
}

/// Load the named track from `store`.
///
/// Entities keep the ids stored in the document; `ids` is adjusted so
/// later allocations cannot collide with them. Returns `None` when the
/// document is missing or unparsable as a whole; malformed child
/// elements are skipped with a warning.
pub fn read_track(store: &TrackStore, ids: &IdAllocator, name: &str) -> Option<Track> {
    let path = store.document_path(name);
    let xml = match fs::read_to_string(&path) {
        Ok(xml) => xml,
        Err(e) => {
            warn!("track document {} not readable: {e}", path.display());
            return None;
        }
    };

    let mut track = Track::new(name);
    if let Some(info) = read_info(store, name) {
        track.set_datetime(info.timestamp);
        track.set_comment(info.comment);
    }

    let track_dir = store.track_dir(name);
    let mut reader = Reader::from_str(&xml);

    // Points land in a pool; ways consume them by reference. Whatever is
    // left over when the document ends is a free POI.
    let mut pool: Vec<(i64, Node)> = Vec::new();
    let mut ways: Vec<Way> = Vec::new();
    let mut context = Context::Track;

    loop {
        // self-closing elements get no end event, so they must not
        // change the attachment context
        let (e, is_container) = match reader.read_event() {
            Ok(Event::Start(e)) => (e, true),
            Ok(Event::Empty(e)) => (e, false),
            Ok(Event::End(e)) => {
                if matches!(e.local_name().as_ref(), b"node" | b"way") {
                    context = Context::Track;
                }
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("failed to parse track document for '{name}': {e}");
                return None;
            }
            _ => continue,
        };

        match e.local_name().as_ref() {
            b"node" => match parse_node(&e) {
                Some((doc_id, node)) => {
                    pool.push((doc_id, node));
                    if is_container {
                        context = Context::Node(doc_id);
                    }
                }
                None => warn!("skipping malformed point element in '{name}'"),
            },
            b"way" => {
                match attr_parsed::<i64>(&e, b"id") {
                    Some(id) => {
                        let mut way = Way::new(id, false);
                        if let Some(ts) = attr(&e, b"timestamp") {
                            way.set_datetime(ts);
                        }
                        ways.push(way);
                        if is_container {
                            context = Context::Way;
                        }
                    }
                    None => warn!("skipping way element without id in '{name}'"),
                }
            }
            b"nd" => {
                let Some(way) = ways.last_mut() else {
                    continue;
                };
                let Some(node_ref) = attr_parsed::<i64>(&e, b"ref") else {
                    warn!("skipping member reference without ref in '{name}'");
                    continue;
                };
                // a reference to an unpooled id is either a forward
                // reference or a repeated one; both are dropped
                match pool.iter().position(|(id, _)| *id == node_ref) {
                    Some(pos) => {
                        let (_, node) = pool.remove(pos);
                        way.push_member(node);
                    }
                    None => debug!("unresolved member reference {node_ref} in '{name}'"),
                }
            }
            b"tag" => {
                let (Some(k), Some(v)) = (attr(&e, b"k"), attr(&e, b"v")) else {
                    warn!("skipping malformed tag element in '{name}'");
                    continue;
                };
                match context {
                    Context::Node(doc_id) => {
                        if let Some((_, node)) = pool.iter_mut().find(|(id, _)| *id == doc_id) {
                            node.tags_mut().insert(k, v);
                        }
                    }
                    Context::Way => {
                        if let Some(way) = ways.last_mut() {
                            if k == "area" && v == "yes" {
                                way.set_area(true);
                            } else {
                                way.tags_mut().insert(k, v);
                            }
                        }
                    }
                    Context::Track => debug!("ignoring track-level tag '{k}' in '{name}'"),
                }
            }
            b"link" => {
                let Some(href) = attr(&e, b"href") else {
                    warn!("skipping media link without href in '{name}'");
                    continue;
                };
                // media referenced but missing on disk are skipped
                let Some(medium) = Media::from_existing(&track_dir, &href) else {
                    continue;
                };
                match context {
                    Context::Node(doc_id) => {
                        if let Some((_, node)) = pool.iter_mut().find(|(id, _)| *id == doc_id) {
                            node.add_media(medium);
                        }
                    }
                    Context::Way => {
                        if let Some(way) = ways.last_mut() {
                            way.add_media(medium);
                        }
                    }
                    Context::Track => track.add_media(medium),
                }
            }
            _ => {}
        }
    }

    // leftover pooled points are the free POIs, in document order
    for (_, node) in pool {
        track.push_node(node);
    }
    for way in ways {
        track.push_way(way);
    }

    if let Some(min_id) = track.min_id() {
        ids.reserve_below(min_id);
    }

    debug!(
        "loaded track '{name}': {} POIs, {} ways",
        track.nodes().len(),
        track.ways().len()
    );
    Some(track)
}

fn parse_node(e: &BytesStart<'_>) -> Option<(i64, Node)> {
    let id = attr_parsed::<i64>(e, b"id")?;
    let lat = attr_parsed::<f64>(e, b"lat")?;
    let lon = attr_parsed::<f64>(e, b"lon")?;

    let mut node = Node::new(id, Some(GeoPoint::new(lat, lon)));
    if let Some(ts) = attr(e, b"timestamp") {
        node.set_datetime(ts);
    }
    Some((id, node))
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

fn attr_parsed<T: std::str::FromStr>(e: &BytesStart<'_>, name: &[u8]) -> Option<T> {
    attr(e, name)?.parse().ok()
}

// ============================================================================
// Summary sidecar
// ============================================================================

/// Write the track summary sidecar.
pub fn write_info(store: &TrackStore, info: &TrackInfo) -> Result<()> {
    let serialize_err = |source: io::Error| TraceError::Serialize {
        name: info.name.clone(),
        source,
    };

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let render = |writer: &mut Writer<Vec<u8>>| -> io::Result<()> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("info")))?;
        for (key, value) in [
            ("timestamp", info.timestamp.clone()),
            ("comment", info.comment.clone()),
            ("pois", info.pois.to_string()),
            ("ways", info.ways.to_string()),
            ("media", info.media.to_string()),
        ] {
            let mut data = BytesStart::new("data");
            data.push_attribute(("key", key));
            data.push_attribute(("value", value.as_str()));
            writer.write_event(Event::Empty(data))?;
        }
        writer.write_event(Event::End(BytesEnd::new("info")))
    };

    render(&mut writer).map_err(serialize_err)?;
    fs::write(store.info_path(&info.name), writer.into_inner()).map_err(serialize_err)
}

/// Read the track summary sidecar; `None` when missing or unparsable.
pub fn read_info(store: &TrackStore, name: &str) -> Option<TrackInfo> {
    let xml = fs::read_to_string(store.info_path(name)).ok()?;
    let mut reader = Reader::from_str(&xml);

    let mut info = TrackInfo {
        name: name.to_string(),
        ..TrackInfo::default()
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() != b"data" {
                    continue;
                }
                let (Some(key), Some(value)) = (attr(&e, b"key"), attr(&e, b"value")) else {
                    warn!("summary entry without key in '{name}'");
                    continue;
                };
                match key.as_str() {
                    "timestamp" => info.timestamp = value,
                    "comment" => info.comment = value,
                    "pois" => info.pois = value.parse().unwrap_or(0),
                    "ways" => info.ways = value.parse().unwrap_or(0),
                    "media" => info.media = value.parse().unwrap_or(0),
                    other => debug!("unknown summary key '{other}' in '{name}'"),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("failed to parse summary for '{name}': {e}");
                return None;
            }
            _ => {}
        }
    }

    Some(info)
}
