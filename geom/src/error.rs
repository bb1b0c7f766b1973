use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything that can go wrong turning one center-line into offset geometry.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeomError {
    #[error("need at least 2 points, but only have {count}")]
    InsufficientPoints { count: usize },
    #[error("zero-length segment between points {index} and {}", .index + 1)]
    DegenerateGeometry { index: usize },
    #[error("projection failed: {0}")]
    ProjectionFailure(String),
    #[error("lanes={count} is more than any real road has")]
    InvalidLaneCount { count: i64 },
    #[error("invalid UTM zone {0}")]
    InvalidZone(String),
}
