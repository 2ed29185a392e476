//! KPI cards and the per-sport activity count chart.

use serde::Serialize;
use serde_json::Value;

use crate::models::KpiPayload;

/// Key of the nested per-sport activity counts in the KPI payload.
pub const ACTIVITY_COUNTS_KEY: &str = "nombre d'activités par sport";

/// Sports shown in the activity count chart, in display order.
pub const COUNTED_SPORTS: [&str; 6] = ["Run", "Bike", "Trail", "WeightTraining", "Hike", "Swim"];

const KPI_LABELS: [(&str, &str); 10] = [
    ("total_km_run", "Km Run"),
    ("total_km_trail", "Km Trail"),
    ("total_km_run_trail", "Km Run + Trail"),
    ("total_km_bike", "Km Bike"),
    ("total_km_swim", "Km Swim"),
    ("total_hours", "Heures totales"),
    ("total_dplus_run", "D+ Run"),
    ("total_dplus_trail", "D+ Trail"),
    ("total_dplus_run_trail", "D+ Run + Trail"),
    ("total_dplus_bike", "D+ Bike"),
];

// U+202F, the group separator used by French locales
const GROUP_SEPARATOR: char = '\u{202f}';

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub key: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityCount {
    pub sport: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiReport {
    pub cards: Vec<KpiCard>,
    pub activity_counts: Vec<ActivityCount>,
}

impl KpiReport {
    pub fn from_payload(payload: &KpiPayload) -> Self {
        let known = KPI_LABELS
            .iter()
            .filter_map(|(key, label)| Some(card(key, label, payload.kpis.get(*key)?)));

        let others = payload
            .kpis
            .iter()
            .filter(|(key, _)| {
                key.as_str() != ACTIVITY_COUNTS_KEY
                    && !KPI_LABELS.iter().any(|(k, _)| *k == key.as_str())
            })
            .map(|(key, value)| card(key, &key.replace('_', " "), value));

        let activity_counts = payload
            .kpis
            .get(ACTIVITY_COUNTS_KEY)
            .map(|counts| {
                COUNTED_SPORTS
                    .iter()
                    .filter_map(|sport| {
                        let count = counts.get(*sport)?.as_f64()?;
                        Some(ActivityCount {
                            sport: (*sport).to_string(),
                            count: count.max(0.0).round() as u64,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            cards: known.chain(others).collect(),
            activity_counts,
        }
    }
}

fn card(key: &str, label: &str, value: &Value) -> KpiCard {
    let value = match value {
        Value::Number(n) => n.as_f64().map(format_number_fr).unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    KpiCard {
        key: key.to_string(),
        label: label.to_string(),
        value,
    }
}

/// Formats a number the way French dashboards display it: grouped thousands,
/// integers as-is, other values with one decimal and a decimal comma.
pub fn format_number_fr(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    if abs.fract() == 0.0 {
        format!("{sign}{}", group_thousands(abs as u64))
    } else {
        let tenths = (abs * 10.0).round() as u64;
        format!("{sign}{},{}", group_thousands(tenths / 10), tenths % 10)
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_integers() {
        assert_eq!(format_number_fr(0.0), "0");
        assert_eq!(format_number_fr(999.0), "999");
        assert_eq!(format_number_fr(1234.0), "1\u{202f}234");
        assert_eq!(format_number_fr(1_234_567.0), "1\u{202f}234\u{202f}567");
        assert_eq!(format_number_fr(-1500.0), "-1\u{202f}500");
    }

    #[test]
    fn test_format_decimals() {
        assert_eq!(format_number_fr(12.34), "12,3");
        assert_eq!(format_number_fr(12.96), "13,0");
        assert_eq!(format_number_fr(2048.56), "2\u{202f}048,6");
        assert_eq!(format_number_fr(f64::NAN), "-");
    }

    #[test]
    fn test_report_from_payload() {
        let payload: KpiPayload = serde_json::from_value(json!({
            "kpis": {
                "total_hours": 120.5,
                "total_km_run": 1234,
                "longest_streak": 12,
                "nombre d'activités par sport": {"Swim": 4, "Run": 80, "Yoga": 3}
            }
        }))
        .unwrap();

        let report = KpiReport::from_payload(&payload);

        let labels: Vec<&str> = report.cards.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Km Run", "Heures totales", "longest streak"]);
        assert_eq!(report.cards[0].value, "1\u{202f}234");
        assert_eq!(report.cards[1].value, "120,5");

        assert_eq!(
            report.activity_counts,
            vec![
                ActivityCount {
                    sport: "Run".into(),
                    count: 80
                },
                ActivityCount {
                    sport: "Swim".into(),
                    count: 4
                },
            ]
        );
    }

    #[test]
    fn test_empty_payload() {
        let report = KpiReport::from_payload(&KpiPayload::default());
        assert!(report.cards.is_empty());
        assert!(report.activity_counts.is_empty());
    }
}
