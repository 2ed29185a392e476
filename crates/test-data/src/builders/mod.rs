//! Fluent builder for generated training histories.

mod dataset;

pub use dataset::{Dataset, DatasetBuilder};
