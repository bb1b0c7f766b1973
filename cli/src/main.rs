//! Converts the drivable roads in an .osm file into an OpenDRIVE map with explicit lane geometry.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use structopt::StructOpt;

use abstutil::{plain_list_names, Timer};
use geom::{UtmProjection, UtmZone};
use road_geometry::{GeometryOptions, RoadNetwork};

#[derive(StructOpt)]
#[structopt(
    name = "osm2od",
    about = "Converts OpenStreetMap roads into an OpenDRIVE lane map"
)]
struct Args {
    /// The .osm file to read
    #[structopt()]
    input: String,
    /// Where to write the OpenDRIVE file
    #[structopt(long, short, default_value = "base_map.xml")]
    output: String,
    /// The UTM zone to do geometry in, like 32V. If omitted or invalid, the zone containing the
    /// center of the input is used.
    #[structopt(long, short)]
    zone: Option<String>,
    /// Indent the output
    #[structopt(long, short)]
    pretty: bool,
    /// Also write all lanes and junctions as GeoJSON here, for debugging
    #[structopt(long)]
    geojson: Option<String>,
    #[structopt(flatten)]
    opts: GeometryOptions,
}

fn main() -> Result<()> {
    let args = Args::from_args();
    abstutil::logger::setup();

    let mut timer = Timer::new(format!("convert {}", args.input));
    let network = convert_osm::read_network(&args.input, &mut timer)?;
    let projector = UtmProjection::new(pick_zone(args.zone.as_deref(), &network)?);
    let geometry = road_geometry::build(&network, &args.opts, &projector, &mut timer)?;

    if !geometry.failures.is_empty() {
        let ids: BTreeSet<String> = geometry
            .failures
            .iter()
            .map(|f| f.road.0.to_string())
            .collect();
        warn!(
            "Skipped {} roads with broken geometry: {}",
            geometry.failures.len(),
            plain_list_names(ids)
        );
    }

    timer.start(format!("write {}", args.output));
    let mut opts = opendrive::Options::new(map_name(&args.input));
    opts.pretty = args.pretty;
    opendrive::write_to_file(&geometry, &network, &opts, &args.output)?;
    timer.stop(format!("write {}", args.output));

    if let Some(path) = args.geojson {
        let gj = geojson::GeoJson::from(geometry.to_geojson());
        fs_err::write(&path, serde_json::to_string_pretty(&gj)?)?;
        info!("Wrote {}", path);
    }

    Ok(())
}

/// An explicitly requested zone wins, as long as it's valid.
fn pick_zone(requested: Option<&str>, network: &RoadNetwork) -> Result<UtmZone> {
    if let Some(raw) = requested {
        match raw.parse::<UtmZone>() {
            Ok(zone) => return Ok(zone),
            Err(err) => error!("Ignoring --zone: {}", err),
        }
    }
    if network.gps_bounds.is_empty() {
        bail!("The input has no nodes, so there's no way to pick a UTM zone");
    }
    let zone = UtmZone::containing(network.gps_bounds.center())?;
    info!("Using UTM zone {}", zone);
    Ok(zone)
}

/// "data/oslo.osm" becomes "oslo"
fn map_name(path: &str) -> String {
    let filename = Path::new(path)
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    filename.split('.').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use geom::LonLat;
    use road_geometry::osm::NodeID;

    use super::*;

    #[test]
    fn names() {
        assert_eq!(map_name("data/oslo.osm"), "oslo");
        assert_eq!(map_name("bergen.osm.xml"), "bergen");
        assert_eq!(map_name("plain"), "plain");
    }

    #[test]
    fn zones() {
        let mut network = RoadNetwork::new();
        assert!(pick_zone(None, &network).is_err());
        assert_eq!(pick_zone(Some("10T"), &network).unwrap().to_string(), "10T");

        network
            .insert_node(NodeID(1), LonLat::new(10.75, 59.91))
            .unwrap();
        assert_eq!(pick_zone(None, &network).unwrap().to_string(), "32V");
        assert_eq!(pick_zone(Some("99Q"), &network).unwrap().to_string(), "32V");
        assert_eq!(pick_zone(Some("33v"), &network).unwrap().to_string(), "33V");
    }

    #[test]
    fn flags() {
        let args = Args::from_iter(vec![
            "osm2od",
            "oslo.osm",
            "--zone",
            "32V",
            "--pretty",
            "--lane-width",
            "3.5",
        ]);
        assert_eq!(args.input, "oslo.osm");
        assert_eq!(args.output, "base_map.xml");
        assert_eq!(args.zone.as_deref(), Some("32V"));
        assert!(args.pretty);
        assert!(args.geojson.is_none());
        assert!(args.opts.parallel);
    }
}
