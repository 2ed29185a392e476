//! Generators for activities and the aggregates derived from them.

pub mod activity;
pub mod aggregate;

pub use activity::{ActivityGenerator, GeneratedActivity};
