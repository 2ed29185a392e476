//! Perlin noise terrain and the elevation streams sampled from it.

use dashboard::models::ElevationRow;
use geo::{Distance as _, Haversine, geometry::Point};
use noise::{NoiseFn, Perlin};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Terrain height field built from several octaves of Perlin noise.
#[derive(Debug, Clone)]
pub struct ElevationGenerator {
    perlin: Perlin,
    base_elevation: f64,
    height_scale: f64,
    /// Spatial frequency in cycles per degree.
    frequency: f64,
    octaves: u32,
}

impl ElevationGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 600.0,
            height_scale: 300.0,
            frequency: 40.0,
            octaves: 4,
        }
    }

    /// Pre-Alps: valley floor around 450 m with summits well above 1500 m.
    pub fn alpine(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 1100.0,
            height_scale: 650.0,
            frequency: 30.0,
            octaves: 5,
        }
    }

    /// Rolling river-bank terrain.
    pub fn flat(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 170.0,
            height_scale: 15.0,
            frequency: 60.0,
            octaves: 2,
        }
    }

    pub fn with_base_elevation(mut self, elevation: f64) -> Self {
        self.base_elevation = elevation;
        self
    }

    pub fn with_height_scale(mut self, scale: f64) -> Self {
        self.height_scale = scale;
        self
    }

    pub fn base_elevation(&self) -> f64 {
        self.base_elevation
    }

    pub fn height_scale(&self) -> f64 {
        self.height_scale
    }

    /// Elevation in metres at `(lat, lon)` (fractal Brownian motion).
    pub fn elevation_at(&self, lat: f64, lon: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.frequency;
        let mut max_amplitude = 0.0;

        for _ in 0..self.octaves {
            total += self.perlin.get([lat * frequency, lon * frequency]) * amplitude;
            max_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        self.base_elevation + (total / max_amplitude) * self.height_scale
    }

    /// Distance/altitude stream along `path`, the way activity streams are
    /// delivered: cumulative metres from the start and the barometric
    /// altitude at each sample.
    pub fn streams(&self, path: &[(f64, f64)]) -> Vec<ElevationRow> {
        let mut distance_m = 0.0;
        let mut prev: Option<Point<f64>> = None;

        path.iter()
            .map(|&(lat, lon)| {
                let point = Point::new(lon, lat);
                if let Some(prev) = prev {
                    distance_m += Haversine.distance(prev, point);
                }
                prev = Some(point);
                ElevationRow {
                    distance_m: Some(distance_m),
                    altitude: Some(self.elevation_at(lat, lon)),
                }
            })
            .collect()
    }
}

/// Adds barometer noise to every altitude of `rows`.
pub fn add_elevation_jitter(rows: &mut [ElevationRow], rng: &mut impl Rng, std_dev: f64) {
    let Ok(normal) = Normal::new(0.0, std_dev) else {
        return;
    };
    for row in rows {
        if let Some(altitude) = row.altitude.as_mut() {
            *altitude += normal.sample(rng);
        }
    }
}
