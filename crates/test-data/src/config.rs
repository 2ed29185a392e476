//! Configuration types for synthetic training data.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Geographic bounding box defined by southwest and northeast corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Random `(lat, lon)` inside the box.
    pub fn random_point(&self, rng: &mut impl rand::Rng) -> (f64, f64) {
        let lat = rng.gen_range(self.min_lat..self.max_lat);
        let lon = rng.gen_range(self.min_lon..self.max_lon);
        (lat, lon)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Pre-defined training areas.
#[derive(Debug, Clone, Copy)]
pub struct Region;

impl Region {
    /// Lake Annecy and the surrounding Bauges foothills.
    pub const ANNECY: BoundingBox = BoundingBox::new(45.78, 6.05, 45.95, 6.30);

    /// Vercors plateau, steep trail terrain.
    pub const VERCORS: BoundingBox = BoundingBox::new(44.90, 5.40, 45.20, 5.70);

    /// Flat river banks around Lyon.
    pub const LYON: BoundingBox = BoundingBox::new(45.70, 4.78, 45.80, 4.92);
}

/// Parameters of a generated training history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// RNG seed; the same seed gives the same history.
    pub seed: u64,

    /// Number of weeks of history ending with the current week.
    pub weeks: usize,

    /// Activities per week (range).
    pub activities_per_week: RangeInclusive<usize>,

    pub region: BoundingBox,

    /// Share of GPS samples replaced by null or garbage values.
    pub invalid_sample_rate: f64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            weeks: 26,
            activities_per_week: 2..=6,
            region: Region::ANNECY,
            invalid_sample_rate: 0.01,
        }
    }
}
