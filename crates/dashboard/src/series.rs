//! Chart-ready series built from the backend's weekly aggregates.

use serde::Serialize;
use time::Date;

use crate::models::{SeriesRow, sanitize};

/// Metric plotted from a [`SeriesRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Metric {
    #[default]
    Hours,
    Distance,
    Elevation,
}

impl Metric {
    pub fn value(&self, row: &SeriesRow) -> f64 {
        match self {
            Metric::Hours => sanitize(row.moving_time) / 60.0,
            Metric::Distance => sanitize(row.distance),
            Metric::Elevation => sanitize(row.total_elevation_gain),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Hours => "h",
            Metric::Distance => "km",
            Metric::Elevation => "m",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period_start: Date,
    pub value: f64,
}

/// Converts rows to points, oldest first. Rows with an unreadable period are
/// dropped.
pub fn series_points(rows: &[SeriesRow], metric: Metric) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = rows
        .iter()
        .filter_map(|row| {
            Some(SeriesPoint {
                period_start: row.period_start()?,
                value: metric.value(row),
            })
        })
        .collect();
    points.sort_by_key(|p| p.period_start);
    points
}
