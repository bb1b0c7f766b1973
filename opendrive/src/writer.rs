use std::io::{BufWriter, Write};

use anyhow::Result;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use geom::LonLat;
use road_geometry::{Direction, Lane, LaneSection, LaneType, RoadGeometry, RoadNetwork};

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const GEO_REFERENCE: &str = "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs";

#[derive(Clone, Debug)]
pub struct Options {
    /// Goes in the header
    pub name: String,
    /// Goes in the header, as %Y-%m-%dT%H:%M:%S
    pub date: String,
    /// Indent nested elements
    pub pretty: bool,
}

impl Options {
    /// Stamped with the current local time
    pub fn new<S: Into<String>>(name: S) -> Options {
        Options {
            name: name.into(),
            date: chrono::Local::now().format(DATE_FORMAT).to_string(),
            pretty: false,
        }
    }
}

pub fn write_to_file(
    geometry: &RoadGeometry,
    network: &RoadNetwork,
    opts: &Options,
    path: &str,
) -> Result<()> {
    let mut file = BufWriter::new(fs_err::File::create(path)?);
    write(geometry, network, opts, &mut file)?;
    file.flush()?;
    info!("Wrote {}", path);
    Ok(())
}

pub fn to_string(geometry: &RoadGeometry, network: &RoadNetwork, opts: &Options) -> Result<String> {
    let mut buffer = Vec::new();
    write(geometry, network, opts, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn write<W: Write>(
    geometry: &RoadGeometry,
    network: &RoadNetwork,
    opts: &Options,
    out: W,
) -> Result<()> {
    let mut xml = XmlOutput {
        writer: if opts.pretty {
            Writer::new_with_indent(out, b' ', 2)
        } else {
            Writer::new(out)
        },
    };

    xml.writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.start("OpenDRIVE", &[("xmlns", "http://www.opendrive.org")])?;
    write_header(&mut xml, geometry, opts)?;

    for (id, section) in &geometry.lane_sections {
        let name = network
            .roads
            .get(id)
            .and_then(|r| r.attributes.name.clone())
            .unwrap_or_default();
        write_road(&mut xml, &id.0.to_string(), &name, section)?;
    }

    for junction in geometry.junctions.values() {
        let id = junction.id.to_string();
        xml.start("junction", &[("id", id.as_str())])?;
        xml.start("outline", &[])?;
        for pt in &junction.outline {
            xml.point("cornerGlobal", *pt)?;
        }
        xml.end("outline")?;
        xml.end("junction")?;
    }

    xml.end("OpenDRIVE")?;
    debug!(
        "Wrote {} roads and {} junctions",
        geometry.lane_sections.len(),
        geometry.junctions.len()
    );
    Ok(())
}

fn write_header<W: Write>(
    xml: &mut XmlOutput<W>,
    geometry: &RoadGeometry,
    opts: &Options,
) -> Result<()> {
    let bounds = geometry.reference_bounds();
    let mut attribs = vec![
        ("revMajor", "1".to_string()),
        ("revMinor", "0".to_string()),
        ("vendor", "Baidu".to_string()),
        ("name", opts.name.clone()),
        ("version", "1.0".to_string()),
        ("date", opts.date.clone()),
    ];
    if bounds.is_empty() {
        warn!("No roads, so the header won't have bounds");
    } else {
        attribs.push(("north", format_coord(bounds.max_lat)));
        attribs.push(("south", format_coord(bounds.min_lat)));
        attribs.push(("east", format_coord(bounds.max_lon)));
        attribs.push(("west", format_coord(bounds.min_lon)));
    }
    let attribs: Vec<(&str, &str)> = attribs.iter().map(|(k, v)| (*k, v.as_str())).collect();

    xml.start("header", &attribs)?;
    xml.start("geoReference", &[])?;
    xml.writer
        .write_event(Event::CData(BytesCData::new(GEO_REFERENCE)))?;
    xml.end("geoReference")?;
    xml.end("header")
}

fn write_road<W: Write>(
    xml: &mut XmlOutput<W>,
    id: &str,
    name: &str,
    section: &LaneSection,
) -> Result<()> {
    xml.start("road", &[("name", name), ("id", id), ("junction", "-1")])?;
    xml.start("lanes", &[])?;
    // Both directions are described by one section
    xml.start("laneSection", &[("singleSide", "true")])?;

    xml.start("boundaries", &[])?;
    for (kind, pts) in [
        ("leftBoundary", &section.left_boundary),
        ("rightBoundary", &section.right_boundary),
    ] {
        xml.start("boundary", &[("type", kind)])?;
        xml.start("geometry", &[])?;
        xml.point_set(pts)?;
        xml.end("geometry")?;
        xml.end("boundary")?;
    }
    xml.end("boundaries")?;

    xml.start("center", &[])?;
    write_lane(xml, id, &section.reference)?;
    xml.end("center")?;

    xml.start("right", &[])?;
    for lane in &section.right {
        write_lane(xml, id, lane)?;
    }
    xml.end("right")?;

    if !section.left.is_empty() {
        xml.start("left", &[])?;
        for lane in &section.left {
            write_lane(xml, id, lane)?;
        }
        xml.end("left")?;
    }

    xml.end("laneSection")?;
    xml.end("lanes")?;
    xml.end("road")
}

fn write_lane<W: Write>(xml: &mut XmlOutput<W>, road: &str, lane: &Lane) -> Result<()> {
    let id = lane.id.to_string();
    let uid = lane_uid(road, lane);
    match lane.lane_type {
        LaneType::None => {
            xml.start(
                "lane",
                &[("id", id.as_str()), ("uid", uid.as_str()), ("type", "none")],
            )?;
            // The reference line isn't painted on the road
            xml.start("border", &[("virtual", "TRUE")])?;
            xml.placed_geometry(&lane.centerline)?;
            xml.end("border")?;
        }
        LaneType::Driving => {
            let direction = match lane.direction {
                Direction::Forward => "forward",
                Direction::Backward => "backward",
                Direction::Bidirectional => "bidirection",
            };
            xml.start(
                "lane",
                &[
                    ("id", id.as_str()),
                    ("uid", uid.as_str()),
                    ("type", "driving"),
                    ("direction", direction),
                    ("turnType", "noTurn"),
                ],
            )?;
            xml.start("centerLine", &[])?;
            xml.placed_geometry(&lane.centerline)?;
            xml.end("centerLine")?;
            xml.start("border", &[("virtual", "TRUE")])?;
            xml.placed_geometry(&lane.outer_border)?;
            xml.end("border")?;
        }
    }
    xml.end("lane")
}

/// `<road>_0` for the reference lane, `<road>_1<index>` on the right, `<road>_0<index>` on the
/// left.
fn lane_uid(road: &str, lane: &Lane) -> String {
    match lane.id.0 {
        0 => format!("{}_0", road),
        x if x < 0 => format!("{}_1{}", road, lane.id.index()),
        _ => format!("{}_0{}", road, lane.id.index()),
    }
}

struct XmlOutput<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlOutput<W> {
    fn start(&mut self, name: &str, attribs: &[(&str, &str)]) -> Result<()> {
        let mut elem = BytesStart::new(name);
        for attrib in attribs {
            elem.push_attribute(*attrib);
        }
        self.writer.write_event(Event::Start(elem))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn point(&mut self, name: &str, pt: LonLat) -> Result<()> {
        let mut elem = BytesStart::new(name);
        elem.push_attribute(("x", format_coord(pt.longitude).as_str()));
        elem.push_attribute(("y", format_coord(pt.latitude).as_str()));
        elem.push_attribute(("z", format_coord(0.0).as_str()));
        self.writer.write_event(Event::Empty(elem))?;
        Ok(())
    }

    fn point_set(&mut self, pts: &[LonLat]) -> Result<()> {
        self.start("pointSet", &[])?;
        for pt in pts {
            self.point("point", *pt)?;
        }
        self.end("pointSet")
    }

    /// A geometry that also states where it starts and how long it is along the ground.
    fn placed_geometry(&mut self, pts: &[LonLat]) -> Result<()> {
        let first = pts[0];
        let x = format_coord(first.longitude);
        let y = format_coord(first.latitude);
        let z = format_coord(0.0);
        let length = format_length(LonLat::path_length(pts).inner_meters());
        self.start(
            "geometry",
            &[
                ("sOffset", "0"),
                ("x", x.as_str()),
                ("y", y.as_str()),
                ("z", z.as_str()),
                ("length", length.as_str()),
            ],
        )?;
        self.point_set(pts)?;
        self.end("geometry")
    }
}

/// Scientific notation with 9 digits after the decimal point and at least a 2-digit signed
/// exponent, like `5.950000000e+01`.
pub fn format_coord(x: f64) -> String {
    let raw = format!("{:.9e}", x);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => raw,
    }
}

// Always has a decimal point
fn format_length(meters: f64) -> String {
    if meters.fract() == 0.0 {
        format!("{:.1}", meters)
    } else {
        meters.to_string()
    }
}
