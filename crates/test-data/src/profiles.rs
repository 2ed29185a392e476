//! Per-sport performance profiles.
//!
//! A profile gives a realistic flat speed, how strongly the slope slows the
//! athlete down and the usual distance of a session.

use std::ops::Range;

use dashboard::models::Sport;
use rand::Rng;
use rand_distr::{Distribution, Normal};

#[derive(Debug, Clone, PartialEq)]
pub struct SportProfile {
    /// Speed on flat terrain in m/s.
    pub base_speed_mps: f64,
    /// Day-to-day variation as a coefficient of variation.
    pub variance: f64,
    /// Speed lost per unit of positive grade.
    pub uphill_penalty: f64,
    /// Speed gained per unit of negative grade.
    pub downhill_gain: f64,
    /// Cap of the downhill speed multiplier.
    pub max_factor: f64,
    pub distance_km: Range<f64>,
    /// Pool swims and the like carry no GPS trace.
    pub has_gps: bool,
}

impl SportProfile {
    pub fn for_sport(sport: Sport) -> Self {
        match sport {
            // ~5:00/km
            Sport::Run => Self {
                base_speed_mps: 3.3,
                variance: 0.08,
                uphill_penalty: 15.0,
                downhill_gain: 8.0,
                max_factor: 1.5,
                distance_km: 5.0..21.0,
                has_gps: true,
            },
            Sport::Trail => Self {
                base_speed_mps: 2.6,
                variance: 0.12,
                uphill_penalty: 20.0,
                downhill_gain: 5.0,
                max_factor: 1.3,
                distance_km: 8.0..35.0,
                has_gps: true,
            },
            Sport::Bike => Self {
                base_speed_mps: 7.5,
                variance: 0.1,
                uphill_penalty: 25.0,
                downhill_gain: 12.0,
                max_factor: 2.0,
                distance_km: 25.0..110.0,
                has_gps: true,
            },
            // ~2:00/100m
            Sport::Swim => Self {
                base_speed_mps: 0.85,
                variance: 0.05,
                uphill_penalty: 0.0,
                downhill_gain: 0.0,
                max_factor: 1.0,
                distance_km: 1.0..4.0,
                has_gps: false,
            },
        }
    }

    /// Speed multiplier for `grade` (0.05 = 5%).
    pub fn grade_factor(&self, grade: f64) -> f64 {
        if grade >= 0.0 {
            (1.0 - grade * self.uphill_penalty).max(0.2)
        } else {
            (1.0 - grade * self.downhill_gain).min(self.max_factor)
        }
    }

    pub fn speed_at_grade(&self, grade: f64, variance_factor: f64) -> f64 {
        (self.base_speed_mps * self.grade_factor(grade) * variance_factor).max(0.3)
    }

    /// Samples the form of the day, a multiplier around 1.0.
    pub fn sample_variance(&self, rng: &mut impl Rng) -> f64 {
        match Normal::new(1.0, self.variance) {
            Ok(normal) if self.variance > 0.0 => normal.sample(rng).clamp(0.7, 1.4),
            _ => 1.0,
        }
    }

    pub fn sample_distance_km(&self, rng: &mut impl Rng) -> f64 {
        rng.gen_range(self.distance_km.clone())
    }
}
