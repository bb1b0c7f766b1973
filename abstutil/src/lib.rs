//! The contents of this crate need to be organized better:
//!
//! - Timer (a mix of logging, profiling, and even parallel execution)
//! - true utility functions (collections, prettyprinting)
//! - OSM tag handling

#[macro_use]
extern crate log;

mod collections;
pub mod logger;
mod tags;
mod time;
mod utils;

pub use crate::collections::MultiMap;
pub use crate::tags::Tags;
pub use crate::time::{elapsed_seconds, prettyprint_time, Timer};
pub use crate::utils::{plain_list_names, prettyprint_usize};

const PROGRESS_FREQUENCY_SECONDS: f64 = 0.2;
