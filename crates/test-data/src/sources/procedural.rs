//! Procedural GPS traces.

use std::f64::consts::{PI, TAU};

use dashboard::models::GeoSample;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::{BoundingBox, Region};

/// Rough metres per degree of latitude.
const METERS_PER_DEGREE: f64 = 111_000.0;

#[derive(Debug, Clone)]
pub struct TraceConfig {
    pub distance_meters: f64,
    /// Starting point `(lat, lon)`; random within `bounds` when unset.
    pub start_point: Option<(f64, f64)>,
    pub bounds: BoundingBox,
    /// Position noise standard deviation in metres.
    pub gps_jitter_m: f64,
    pub point_spacing_m: f64,
    /// Share of samples replaced by null or unparseable values.
    pub invalid_sample_rate: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            distance_meters: 5000.0,
            start_point: None,
            bounds: Region::ANNECY,
            gps_jitter_m: 3.0,
            point_spacing_m: 25.0,
            invalid_sample_rate: 0.0,
        }
    }
}

/// Random-walk trace generator.
#[derive(Debug, Clone, Default)]
pub struct ProceduralGenerator {
    config: TraceConfig,
}

impl ProceduralGenerator {
    pub fn for_region(bounds: BoundingBox) -> Self {
        Self {
            config: TraceConfig {
                bounds,
                ..Default::default()
            },
        }
    }

    pub fn with_distance(mut self, meters: f64) -> Self {
        self.config.distance_meters = meters;
        self
    }

    pub fn with_start(mut self, lat: f64, lon: f64) -> Self {
        self.config.start_point = Some((lat, lon));
        self
    }

    pub fn with_gps_jitter(mut self, meters: f64) -> Self {
        self.config.gps_jitter_m = meters;
        self
    }

    pub fn with_point_spacing(mut self, meters: f64) -> Self {
        self.config.point_spacing_m = meters.max(1.0);
        self
    }

    pub fn with_invalid_samples(mut self, rate: f64) -> Self {
        self.config.invalid_sample_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Clean `(lat, lon)` path covering the configured distance.
    pub fn generate_path(&self, rng: &mut impl Rng) -> Vec<(f64, f64)> {
        let start = self
            .config
            .start_point
            .unwrap_or_else(|| self.config.bounds.random_point(rng));

        let mut path = vec![start];
        let mut current = start;
        let mut total_distance = 0.0;
        // heading with momentum gives natural-looking curves
        let mut heading = rng.gen_range(0.0..TAU);

        while total_distance < self.config.distance_meters {
            heading += rng.gen_range(-0.3..0.3);
            let step = self.config.point_spacing_m * rng.gen_range(0.8..1.2);

            let lat_delta = step * heading.cos() / METERS_PER_DEGREE;
            let lon_delta = step * heading.sin() / (METERS_PER_DEGREE * current.0.to_radians().cos());

            let (lat, lon, bounced) =
                self.apply_bounds(current.0 + lat_delta, current.1 + lon_delta, heading);
            heading = bounced;

            current = (lat, lon);
            path.push(current);
            total_distance += step;
        }

        path
    }

    /// Keeps the walk inside the bounds by reflecting the heading.
    fn apply_bounds(&self, lat: f64, lon: f64, heading: f64) -> (f64, f64, f64) {
        let b = &self.config.bounds;
        let mut heading = heading;

        let lat = if lat < b.min_lat {
            heading = PI - heading;
            b.min_lat + (b.min_lat - lat).min(0.001)
        } else if lat > b.max_lat {
            heading = PI - heading;
            b.max_lat - (lat - b.max_lat).min(0.001)
        } else {
            lat
        };

        let lon = if lon < b.min_lon {
            heading = -heading;
            b.min_lon + (b.min_lon - lon).min(0.001)
        } else if lon > b.max_lon {
            heading = -heading;
            b.max_lon - (lon - b.max_lon).min(0.001)
        } else {
            lon
        };

        (lat, lon, heading)
    }

    /// Turns a path into wire samples with GPS noise, corrupting a share of
    /// them the way real device exports do.
    pub fn to_samples(&self, path: &[(f64, f64)], rng: &mut impl Rng) -> Vec<GeoSample> {
        let jitter = Normal::new(0.0, self.config.gps_jitter_m / METERS_PER_DEGREE).ok();

        path.iter()
            .map(|&(lat, lon)| {
                if rng.r#gen::<f64>() < self.config.invalid_sample_rate {
                    return corrupt_sample(lat, lon, rng);
                }
                let (dlat, dlon) = match jitter {
                    Some(normal) => (normal.sample(rng), normal.sample(rng)),
                    None => (0.0, 0.0),
                };
                GeoSample::new(lat + dlat, lon + dlon)
            })
            .collect()
    }
}

fn corrupt_sample(lat: f64, lon: f64, rng: &mut impl Rng) -> GeoSample {
    match rng.gen_range(0..3) {
        0 => GeoSample {
            lat: None,
            lon: Some(lon),
        },
        1 => GeoSample {
            lat: Some(lat),
            lon: None,
        },
        _ => GeoSample {
            lat: Some(f64::NAN),
            lon: Some(lon),
        },
    }
}

/// Every `step`-th sample plus the last one, a cheap stand-in for the
/// decoded summary polyline.
pub fn decimate<T: Clone>(samples: &[T], step: usize) -> Vec<T> {
    let step = step.max(1);
    let mut out: Vec<T> = samples.iter().step_by(step).cloned().collect();
    if (samples.len().saturating_sub(1)) % step != 0
        && let Some(last) = samples.last()
    {
        out.push(last.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_path_covers_distance() {
        let generator = ProceduralGenerator::default()
            .with_distance(1000.0)
            .with_point_spacing(10.0);
        let path = generator.generate_path(&mut StdRng::seed_from_u64(42));
        assert!(path.len() > 50);
    }

    #[test]
    fn test_path_stays_in_bounds() {
        let bounds = Region::LYON;
        let generator = ProceduralGenerator::for_region(bounds).with_distance(30_000.0);
        let path = generator.generate_path(&mut StdRng::seed_from_u64(1));
        for (lat, lon) in path {
            assert!(lat > bounds.min_lat - 0.01 && lat < bounds.max_lat + 0.01);
            assert!(lon > bounds.min_lon - 0.01 && lon < bounds.max_lon + 0.01);
        }
    }

    #[test]
    fn test_same_seed_same_path() {
        let generator = ProceduralGenerator::default().with_distance(500.0);
        let a = generator.generate_path(&mut StdRng::seed_from_u64(9));
        let b = generator.generate_path(&mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_samples() {
        let mut rng = StdRng::seed_from_u64(5);
        let clean = ProceduralGenerator::default().with_distance(2000.0);
        let path = clean.generate_path(&mut rng);

        let samples = clean.to_samples(&path, &mut rng);
        assert!(samples.iter().all(|s| s.coord().is_some()));

        let broken = clean.clone().with_invalid_samples(1.0);
        let samples = broken.to_samples(&path, &mut rng);
        assert_eq!(samples.len(), path.len());
        assert!(samples.iter().all(|s| s.coord().is_none()));
    }

    #[test]
    fn test_decimate_keeps_ends() {
        let samples: Vec<u32> = (0..10).collect();
        assert_eq!(decimate(&samples, 4), vec![0, 4, 8, 9]);
        assert_eq!(decimate(&samples, 3), vec![0, 3, 6, 9]);
        assert_eq!(decimate(&samples, 0), samples);
        assert!(decimate::<u32>(&[], 5).is_empty());
    }
}
