//! Sources of trace geometry.

mod procedural;

pub use procedural::{ProceduralGenerator, TraceConfig, decimate};
