//! Synthetic training data for the dashboard.
//!
//! Generates reproducible activity histories (GPS traces, elevation streams,
//! weekly and daily aggregates, KPI totals) and serves them through a mock
//! backend that speaks the same HTTP contract as the real one.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let dataset = DatasetBuilder::new()
//!     .with_seed(7)
//!     .with_weeks(12)
//!     .with_region(Region::ANNECY)
//!     .build(today);
//!
//! run_server(MockState { dataset, token: "dev".into() }, 3000).await?;
//! ```

pub mod builders;
pub mod config;
pub mod generators;
pub mod profiles;
pub mod server;
pub mod sources;
pub mod terrain;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::builders::{Dataset, DatasetBuilder};
    pub use crate::config::{BoundingBox, Region, SeedConfig};
    pub use crate::generators::{ActivityGenerator, GeneratedActivity};
    pub use crate::profiles::SportProfile;
    pub use crate::server::{MockState, create_router, run_server};
    pub use crate::sources::ProceduralGenerator;
    pub use crate::terrain::ElevationGenerator;
    pub use dashboard::models::Sport;
}
