//! Synthetic terrain for elevation streams.

mod elevation;

pub use elevation::{ElevationGenerator, add_elevation_jitter};
