use anyhow::Result;
use serde::{Deserialize, Serialize};
use structopt::StructOpt;

use geom::{Distance, DEFAULT_MAX_MITER_SCALE};

/// No real lane is anywhere near this wide.
pub const MAX_LANE_WIDTH: Distance = Distance::const_meters(100.0);

/// Tunes how lane geometry is derived from OSM center-lines.
#[derive(Clone, Debug, PartialEq, StructOpt, Serialize, Deserialize)]
pub struct GeometryOptions {
    /// The width of every lane, in meters.
    #[structopt(long, default_value = "3.0", parse(try_from_str = parse_meters))]
    pub lane_width: Distance,
    /// At a sharp turn, an offset point is pushed out along the bisector of the turn. Never push
    /// further than this multiple of the offset distance.
    #[structopt(long, default_value = "4.0")]
    pub max_miter_scale: f64,
    /// Process roads one at a time, instead of spreading them over all cores.
    #[structopt(long = "sequential", parse(from_flag = std::ops::Not::not))]
    pub parallel: bool,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            lane_width: Distance::const_meters(3.0),
            max_miter_scale: DEFAULT_MAX_MITER_SCALE,
            parallel: true,
        }
    }
}

impl GeometryOptions {
    pub fn validate(&self) -> Result<()> {
        if self.lane_width <= Distance::ZERO || self.lane_width > MAX_LANE_WIDTH {
            bail!(
                "lane_width must be positive and at most {}, not {}",
                MAX_LANE_WIDTH,
                self.lane_width
            );
        }
        if !self.max_miter_scale.is_finite() || self.max_miter_scale < 1.0 {
            bail!(
                "max_miter_scale must be a finite number >= 1.0, not {}",
                self.max_miter_scale
            );
        }
        Ok(())
    }
}

fn parse_meters(raw: &str) -> Result<Distance> {
    let value = raw.parse::<f64>()?;
    if !value.is_finite() {
        bail!("{} isn't a finite distance", raw);
    }
    Ok(Distance::meters(value))
}
