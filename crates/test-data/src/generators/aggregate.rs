//! Aggregates computed from generated activities, shaped like the backend's
//! KPI, weekly and daily endpoints.

use dashboard::{
    kpi::ACTIVITY_COUNTS_KEY,
    models::{DailyDataset, DailyHours, KpiPayload, SeriesRow, Sport},
    week_range::{WeekRange, current_week_range},
};
use serde_json::{Map, Value, json};
use time::Date;

use super::activity::GeneratedActivity;

pub const DAY_LABELS: [&str; 7] = ["Lun", "Mar", "Mer", "Jeu", "Ven", "Sam", "Dim"];

/// `weeks` weekly rows, oldest first, the last one being the week that
/// contains `today`.
pub fn weekly_series(activities: &[GeneratedActivity], today: Date, weeks: usize) -> Vec<SeriesRow> {
    (0..weeks)
        .rev()
        .map(|weeks_ago| {
            let range = current_week_range(today, u32::try_from(weeks_ago).unwrap_or(u32::MAX));
            let in_week: Vec<&GeneratedActivity> = activities
                .iter()
                .filter(|a| range.contains(a.started_at.date()))
                .collect();

            SeriesRow {
                period: range.monday.to_string(),
                moving_time: Some(round1(in_week.iter().map(|a| a.moving_time_s / 60.0).sum())),
                distance: Some(round1(in_week.iter().map(|a| a.distance_km).sum())),
                total_elevation_gain: Some(in_week.iter().map(|a| a.elevation_gain_m).sum::<f64>().round()),
            }
        })
        .collect()
}

/// Minutes per weekday and sport for `range`.
pub fn daily_hours(activities: &[GeneratedActivity], range: WeekRange) -> DailyHours {
    let datasets = Sport::ALL
        .into_iter()
        .map(|sport| {
            let mut minutes = [0.0; 7];
            for activity in activities.iter().filter(|a| a.sport == sport) {
                let day = activity.started_at.date();
                if range.contains(day) {
                    minutes[usize::from(day.weekday().number_days_from_monday())] +=
                        activity.moving_time_s / 60.0;
                }
            }
            DailyDataset {
                label: sport.as_str().to_string(),
                data: minutes.iter().map(|m| Some(m.round())).collect(),
            }
        })
        .collect();

    DailyHours {
        labels: DAY_LABELS.iter().map(|d| d.to_string()).collect(),
        datasets,
    }
}

/// KPI totals over `[start, end]`, or over everything when unbounded.
pub fn kpis(activities: &[GeneratedActivity], period: Option<(Date, Date)>) -> KpiPayload {
    let selected: Vec<&GeneratedActivity> = activities
        .iter()
        .filter(|a| {
            period.is_none_or(|(start, end)| {
                let day = a.started_at.date();
                start <= day && day <= end
            })
        })
        .collect();

    let km = |sports: &[Sport]| {
        round1(
            selected
                .iter()
                .filter(|a| sports.contains(&a.sport))
                .map(|a| a.distance_km)
                .sum(),
        )
    };
    let dplus = |sports: &[Sport]| {
        selected
            .iter()
            .filter(|a| sports.contains(&a.sport))
            .map(|a| a.elevation_gain_m)
            .sum::<f64>()
            .round()
    };

    let mut counts = Map::new();
    for sport in Sport::ALL {
        let n = selected.iter().filter(|a| a.sport == sport).count();
        counts.insert(sport.as_str().to_string(), json!(n));
    }

    let mut kpis = Map::new();
    kpis.insert("total_km_run".into(), json!(km(&[Sport::Run])));
    kpis.insert("total_km_trail".into(), json!(km(&[Sport::Trail])));
    kpis.insert("total_km_run_trail".into(), json!(km(&[Sport::Run, Sport::Trail])));
    kpis.insert("total_km_bike".into(), json!(km(&[Sport::Bike])));
    kpis.insert("total_km_swim".into(), json!(km(&[Sport::Swim])));
    kpis.insert(
        "total_hours".into(),
        json!(round1(selected.iter().map(|a| a.moving_time_s / 3600.0).sum())),
    );
    kpis.insert("total_dplus_run".into(), json!(dplus(&[Sport::Run])));
    kpis.insert("total_dplus_trail".into(), json!(dplus(&[Sport::Trail])));
    kpis.insert(
        "total_dplus_run_trail".into(),
        json!(dplus(&[Sport::Run, Sport::Trail])),
    );
    kpis.insert("total_dplus_bike".into(), json!(dplus(&[Sport::Bike])));
    kpis.insert(ACTIVITY_COUNTS_KEY.into(), Value::Object(counts));

    KpiPayload { kpis }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
