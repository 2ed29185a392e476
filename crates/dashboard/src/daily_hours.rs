//! Per-day training time of one week, stacked by sport.

use serde::Serialize;

use crate::models::{DailyHours, sanitize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SportHours {
    pub sport: String,
    /// Hours per weekday, aligned with [`WeekHours::days`].
    pub hours: Vec<f64>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekHours {
    pub days: Vec<String>,
    pub sports: Vec<SportHours>,
    /// Hours per weekday across all sports.
    pub day_totals: Vec<f64>,
    pub total: f64,
}

impl WeekHours {
    /// Converts the minute payload into hours. Datasets shorter than the
    /// label list are padded with zeros, longer ones are cut.
    pub fn from_payload(payload: &DailyHours) -> Self {
        let days = payload.labels.clone();
        let width = days.len();

        let sports: Vec<SportHours> = payload
            .datasets
            .iter()
            .map(|dataset| {
                let hours: Vec<f64> = (0..width)
                    .map(|i| sanitize(dataset.data.get(i).copied().flatten()) / 60.0)
                    .collect();
                SportHours {
                    sport: dataset.label.clone(),
                    total: hours.iter().sum(),
                    hours,
                }
            })
            .collect();

        let day_totals: Vec<f64> = (0..width)
            .map(|i| sports.iter().map(|s| s.hours[i]).sum())
            .collect();
        let total: f64 = day_totals.iter().sum();

        Self {
            days,
            sports,
            day_totals,
            total,
        }
    }

    /// Sport with the most hours, if any time was recorded.
    pub fn dominant_sport(&self) -> Option<&SportHours> {
        self.sports
            .iter()
            .filter(|s| s.total > 0.0)
            .max_by(|a, b| a.total.total_cmp(&b.total))
    }
}
