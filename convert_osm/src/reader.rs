use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{Context, Result};

use abstutil::{prettyprint_usize, Tags, Timer};
use geom::{GPSBounds, LonLat};
use road_geometry::osm::{self, NodeID, WayID};
use road_geometry::{RoadAttributes, RoadNetwork};

// Per https://wiki.openstreetmap.org/wiki/OSM_XML#Certainties_and_Uncertainties, we assume
// elements come in order: nodes, ways, then relations. A way referring to a node that comes later
// is treated like a reference to a missing node.

pub fn read_network(path: &str, timer: &mut Timer) -> Result<RoadNetwork> {
    timer.start(format!("read {}", path));
    let raw = fs_err::read_to_string(path)?;
    timer.stop(format!("read {}", path));
    parse_network(&raw, timer).with_context(|| format!("couldn't read {}", path))
}

pub fn parse_network(raw: &str, timer: &mut Timer) -> Result<RoadNetwork> {
    timer.start("parse XML");
    let tree = roxmltree::Document::parse(raw)?;
    check_complete(raw, &tree)?;
    timer.stop("parse XML");

    let mut network = RoadNetwork::new();
    let mut declared_bounds: Option<GPSBounds> = None;
    let mut skipped_ways = 0;

    timer.start("scrape objects");
    for obj in tree.descendants() {
        if !obj.is_element() {
            continue;
        }
        match obj.tag_name().name() {
            "bounds" => {
                let mut b = GPSBounds::new();
                b.update(LonLat::new(
                    parse_attribute(obj, "minlon")?,
                    parse_attribute(obj, "minlat")?,
                ));
                b.update(LonLat::new(
                    parse_attribute(obj, "maxlon")?,
                    parse_attribute(obj, "maxlat")?,
                ));
                declared_bounds = Some(b);
            }
            "node" => {
                let id = NodeID(parse_attribute(obj, "id")?);
                let pt = LonLat::new(parse_attribute(obj, "lon")?, parse_attribute(obj, "lat")?);
                network
                    .insert_node(id, pt)
                    .context("your .osm is corrupt")?;
            }
            "way" => {
                let id = WayID(parse_attribute(obj, "id")?);
                let tags = read_tags(obj)?;
                match tags.get(osm::HIGHWAY) {
                    Some(highway) if osm::is_drivable(highway) => {}
                    _ => continue,
                }

                let mut nodes = Vec::new();
                for child in obj.children() {
                    if child.tag_name().name() == "nd" {
                        nodes.push(NodeID(parse_attribute(child, "ref")?));
                    }
                }
                if let Some(missing) = nodes.iter().find(|n| !network.nodes.contains_key(*n)) {
                    timer.warn(format!("Skipping {}, because {} is missing", id, missing));
                    skipped_ways += 1;
                    continue;
                }
                if nodes.len() < 2 {
                    timer.warn(format!(
                        "Skipping {}, because it only has {} nodes",
                        id,
                        nodes.len()
                    ));
                    skipped_ways += 1;
                    continue;
                }
                network
                    .insert_road(id, nodes, RoadAttributes::from_tags(tags))
                    .context("your .osm is corrupt")?;
            }
            _ => {}
        }
    }
    timer.stop("scrape objects");

    if let Some(b) = declared_bounds {
        network.gps_bounds = b;
    } else if !network.nodes.is_empty() {
        debug!("No <bounds> element, so using the extent of all nodes");
    }

    timer.note(format!(
        "Found {} nodes and {} drivable roads, skipped {} broken ways",
        prettyprint_usize(network.nodes.len()),
        prettyprint_usize(network.roads.len()),
        prettyprint_usize(skipped_ways)
    ));
    Ok(network)
}

// The parser tolerates a document that just stops, so a cut-off download would otherwise look like
// an empty map.
fn check_complete(raw: &str, tree: &roxmltree::Document) -> Result<()> {
    let root = tree.root_element();
    if root.tag_name().name() != "osm" {
        bail!("expected an <osm> document, found <{}>", root.tag_name().name());
    }
    let tail = raw.trim_end();
    if tail.ends_with("</osm>") || (tail.ends_with("/>") && !root.has_children()) {
        Ok(())
    } else {
        bail!("the input is truncated; it doesn't end with </osm>")
    }
}

fn parse_attribute<T: FromStr>(obj: roxmltree::Node, key: &str) -> Result<T>
where
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = obj
        .attribute(key)
        .ok_or_else(|| anyhow!("<{}> is missing {}", obj.tag_name().name(), key))?;
    raw.parse::<T>()
        .with_context(|| format!("<{}> has a bad {}={}", obj.tag_name().name(), key, raw))
}

fn read_tags(obj: roxmltree::Node) -> Result<Tags> {
    let mut tags = Tags::new(BTreeMap::new());
    for child in obj.children() {
        if child.tag_name().name() == "tag" {
            match (child.attribute("k"), child.attribute("v")) {
                (Some(k), Some(v)) => tags.insert(k, v),
                _ => bail!("<tag> inside <{}> is missing k or v", obj.tag_name().name()),
            }
        }
    }
    Ok(tags)
}
