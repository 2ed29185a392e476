//! Elevation profile of an activity, prepared for a line chart.

use serde::Serialize;

use crate::models::ElevationRow;

/// Tolerance when matching a tick value to the midpoint or the end.
const TICK_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfilePoint {
    pub distance_km: f64,
    pub altitude_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationProfile {
    pub points: Vec<ProfilePoint>,
}

impl ElevationProfile {
    /// Builds the profile from stream rows, skipping rows with a missing or
    /// non-finite value. Returns `None` when nothing usable remains.
    pub fn from_streams(rows: &[ElevationRow]) -> Option<Self> {
        let points: Vec<ProfilePoint> = rows
            .iter()
            .filter_map(|row| match (row.distance_m, row.altitude) {
                (Some(d), Some(a)) if d.is_finite() && a.is_finite() => Some(ProfilePoint {
                    distance_km: d / 1000.0,
                    altitude_m: a,
                }),
                _ => None,
            })
            .collect();

        if points.is_empty() {
            None
        } else {
            Some(Self { points })
        }
    }

    pub fn total_km(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.distance_km)
    }

    /// Sum of positive altitude differences.
    pub fn gain_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].altitude_m - w[0].altitude_m).max(0.0))
            .sum()
    }

    pub fn min_altitude(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.altitude_m)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max_altitude(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.altitude_m)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Distance axis label: only the midpoint and the end are labelled.
    pub fn tick_label(&self, distance_km: f64) -> String {
        let total = self.total_km();
        let mid = total / 2.0;

        if distance_km == 0.0 {
            String::new()
        } else if (distance_km - mid).abs() < TICK_EPSILON {
            format!("{}", mid.round())
        } else if (distance_km - total).abs() < TICK_EPSILON {
            format!("{}", total.round())
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(distance_m: f64, altitude: f64) -> ElevationRow {
        ElevationRow {
            distance_m: Some(distance_m),
            altitude: Some(altitude),
        }
    }

    fn profile() -> ElevationProfile {
        ElevationProfile::from_streams(&[
            row(0.0, 500.0),
            row(5_000.0, 650.0),
            row(7_500.0, 600.0),
            row(10_000.0, 700.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_streams() {
        assert!(ElevationProfile::from_streams(&[]).is_none());
        assert!(ElevationProfile::from_streams(&[ElevationRow::default()]).is_none());
    }

    #[test]
    fn test_summary_values() {
        let profile = profile();
        assert_eq!(profile.total_km(), 10.0);
        assert_eq!(profile.gain_m(), 250.0);
        assert_eq!(profile.min_altitude(), 500.0);
        assert_eq!(profile.max_altitude(), 700.0);
    }

    #[test]
    fn test_tick_labels() {
        let profile = profile();
        assert_eq!(profile.tick_label(0.0), "");
        assert_eq!(profile.tick_label(5.0), "5");
        assert_eq!(profile.tick_label(7.5), "");
        assert_eq!(profile.tick_label(10.0), "10");
    }

    #[test]
    fn test_invalid_rows_skipped() {
        let profile = ElevationProfile::from_streams(&[
            row(0.0, 100.0),
            ElevationRow {
                distance_m: Some(100.0),
                altitude: None,
            },
            row(f64::NAN, 120.0),
            row(200.0, 110.0),
        ])
        .unwrap();
        assert_eq!(profile.points.len(), 2);
        assert_eq!(profile.gain_m(), 10.0);
    }
}
