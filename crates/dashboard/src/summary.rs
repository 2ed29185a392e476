//! Stat card for the most recent activity.

use serde::Serialize;
use time::{Date, Month, Weekday};

use crate::models::{ActivityRecord, sanitize};

const FALLBACK_NAME: &str = "Activité";
const MISSING: &str = "--";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityStat {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub title: String,
    /// Long French date, empty when the record carries no date.
    pub date: String,
    pub stats: Vec<ActivityStat>,
}

impl ActivitySummary {
    pub fn from_record(activity: &ActivityRecord) -> Self {
        let title = activity
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_NAME.to_string());

        let date = activity.start_day().map(long_date_fr).unwrap_or_default();

        let text = |value: &Option<String>| value.clone().unwrap_or_else(|| MISSING.to_string());

        let stats = vec![
            ActivityStat {
                label: "Distance",
                value: format!("{:.2} km", activity.distance()),
            },
            ActivityStat {
                label: "Temps",
                value: text(&activity.duree_hms),
            },
            ActivityStat {
                label: "Dénivelé+",
                value: format!("{} m", sanitize(activity.denivele_m).round()),
            },
            ActivityStat {
                label: "Vitesse moy.",
                value: format!("{:.1} km/h", sanitize(activity.vitesse_kmh)),
            },
            ActivityStat {
                label: "Allure",
                value: text(&activity.allure_min_per_km),
            },
        ];

        Self { title, date, stats }
    }
}

/// `mercredi 5 mars 2025`.
pub fn long_date_fr(date: Date) -> String {
    format!(
        "{} {} {} {}",
        weekday_fr(date.weekday()),
        date.day(),
        month_fr(date.month()),
        date.year()
    )
}

fn weekday_fr(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "lundi",
        Weekday::Tuesday => "mardi",
        Weekday::Wednesday => "mercredi",
        Weekday::Thursday => "jeudi",
        Weekday::Friday => "vendredi",
        Weekday::Saturday => "samedi",
        Weekday::Sunday => "dimanche",
    }
}

fn month_fr(month: Month) -> &'static str {
    match month {
        Month::January => "janvier",
        Month::February => "février",
        Month::March => "mars",
        Month::April => "avril",
        Month::May => "mai",
        Month::June => "juin",
        Month::July => "juillet",
        Month::August => "août",
        Month::September => "septembre",
        Month::October => "octobre",
        Month::November => "novembre",
        Month::December => "décembre",
    }
}
