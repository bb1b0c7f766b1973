use abstutil::Timer;
use geom::UtmProjection;
use road_geometry::GeometryOptions;

// Three roads meeting at node 2, near Oslo. Road 102 goes nowhere useful but shares a node.
const INPUT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <bounds minlat="59.90" minlon="10.74" maxlat="59.92" maxlon="10.76"/>
  <node id="1" lat="59.91" lon="10.75"/>
  <node id="2" lat="59.911" lon="10.752"/>
  <node id="3" lat="59.912" lon="10.754"/>
  <node id="4" lat="59.913" lon="10.751"/>
  <node id="5" lat="59.914" lon="10.7505"/>
  <node id="6" lat="59.90" lon="10.74"/>
  <way id="100">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="3"/>
    <tag k="highway" v="primary"/>
    <tag k="name" v="Storgata &amp; co"/>
    <tag k="lanes" v="5"/>
  </way>
  <way id="101">
    <nd ref="2"/>
    <nd ref="4"/>
    <nd ref="5"/>
    <tag k="highway" v="residential"/>
  </way>
  <way id="102">
    <nd ref="6"/>
    <nd ref="1"/>
    <tag k="highway" v="footway"/>
  </way>
</osm>"#;

fn convert(pretty: bool) -> String {
    let mut timer = Timer::new("end to end");
    let network = convert_osm::parse_network(INPUT, &mut timer).unwrap();
    let projector = UtmProjection::new("32V".parse().unwrap());
    let geometry = road_geometry::build(
        &network,
        &GeometryOptions::default(),
        &projector,
        &mut timer,
    )
    .unwrap();
    assert!(geometry.failures.is_empty());

    let opts = opendrive::Options {
        name: "oslo".to_string(),
        date: "2024-01-02T03:04:05".to_string(),
        pretty,
    };
    opendrive::to_string(&geometry, &network, &opts).unwrap()
}

#[test]
fn osm_to_opendrive() {
    let xml = convert(false);

    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(xml.contains(r#"<OpenDRIVE xmlns="http://www.opendrive.org">"#));
    assert!(xml.contains(
        r#"<header revMajor="1" revMinor="0" vendor="Baidu" name="oslo" version="1.0" date="2024-01-02T03:04:05" north="#
    ));
    assert!(xml.contains(
        "<geoReference><![CDATA[+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs]]></geoReference>"
    ));

    // The footway is gone
    assert_eq!(xml.matches("<road ").count(), 2);
    assert!(xml.contains(r#"<road name="Storgata &amp; co" id="100" junction="-1">"#));
    assert!(xml.contains(r#"<road name="" id="101" junction="-1">"#));
    assert!(xml.contains(r#"<laneSection singleSide="true">"#));
    assert!(xml.contains(r#"<boundary type="leftBoundary">"#));

    // 5 lanes become 4 on road 100, and road 101 has a single lane
    assert!(xml.contains(r#"<lane id="0" uid="100_0" type="none">"#));
    assert!(xml.contains(
        r#"<lane id="-2" uid="100_12" type="driving" direction="forward" turnType="noTurn">"#
    ));
    assert!(xml.contains(
        r#"<lane id="2" uid="100_02" type="driving" direction="backward" turnType="noTurn">"#
    ));
    assert!(!xml.contains(r#"uid="100_13""#));
    assert!(xml.contains(
        r#"<lane id="-1" uid="101_11" type="driving" direction="bidirection" turnType="noTurn">"#
    ));
    assert!(!xml.contains(r#"uid="101_01""#));

    // The multi-lane reference line is the road itself
    assert!(xml.contains(
        r#"<geometry sOffset="0" x="1.075000000e+01" y="5.991000000e+01" z="0.000000000e+00" length=""#
    ));
    assert!(xml.contains(r#"<point x="1.075200000e+01" y="5.991100000e+01" z="0.000000000e+00"/>"#));

    // Only node 2 is shared between drivable roads
    assert_eq!(xml.matches("<junction ").count(), 1);
    assert!(xml.contains(r#"<junction id="0"><outline><cornerGlobal x=""#));
    assert!(xml.ends_with("</junction></OpenDRIVE>"));
}

#[test]
fn pretty_printing() {
    let xml = convert(true);
    assert!(xml.contains("\n  <header "));
    assert!(xml.contains("\n  <road "));
    // Indentation doesn't change the content
    let squashed: String = xml.lines().map(|line| line.trim_start()).collect();
    assert_eq!(squashed, convert(false));
}
