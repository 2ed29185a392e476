use enum_map::Enum;
use geo::Coord;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use time::{Date, macros::format_description};

/// Sport filter understood by the backend's activity queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Sport {
    Run,
    Trail,
    Bike,
    Swim,
}

impl Sport {
    pub const ALL: [Sport; 4] = [Sport::Run, Sport::Trail, Sport::Bike, Sport::Swim];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Run => "Run",
            Sport::Trail => "Trail",
            Sport::Bike => "Bike",
            Sport::Swim => "Swim",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|sport| sport.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// One `[lat, lon]` pair as delivered by the backend.
///
/// Either side may be missing or garbage on the wire; such samples are kept
/// here and dropped later by the projector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Vec<Value>>", into = "[Option<f64>; 2]")]
pub struct GeoSample {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl GeoSample {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
        }
    }

    /// Returns the sample as a planar coordinate (x = lon, y = lat) when both
    /// components are finite numbers.
    pub fn coord(&self) -> Option<Coord<f64>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Coord { x: lon, y: lat })
            }
            _ => None,
        }
    }
}

impl From<Option<Vec<Value>>> for GeoSample {
    fn from(values: Option<Vec<Value>>) -> Self {
        let values = values.unwrap_or_default();
        Self {
            lat: coordinate(values.first()),
            lon: coordinate(values.get(1)),
        }
    }
}

impl From<GeoSample> for [Option<f64>; 2] {
    fn from(sample: GeoSample) -> Self {
        [sample.lat, sample.lon]
    }
}

fn coordinate(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Activity record returned by the last-activity and filter endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityRecord {
    pub name: Option<String>,
    pub sport_type: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub distance_km: Option<f64>,
    pub duree_hms: Option<String>,
    pub denivele_m: Option<f64>,
    pub vitesse_kmh: Option<f64>,
    pub allure_min_per_km: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub coords: Vec<GeoSample>,
    #[serde(deserialize_with = "null_as_empty")]
    pub polyline_coords: Vec<GeoSample>,
}

impl ActivityRecord {
    /// GPS trace of the activity, preferring the decoded polyline.
    pub fn trace(&self) -> &[GeoSample] {
        if self.polyline_coords.is_empty() {
            &self.coords
        } else {
            &self.polyline_coords
        }
    }

    /// Calendar day the activity started on.
    pub fn start_day(&self) -> Option<Date> {
        self.start_date
            .as_deref()
            .and_then(parse_day)
            .or_else(|| self.date.as_deref().and_then(parse_day))
    }

    /// Distance in km; missing or nonsensical values count as zero.
    pub fn distance(&self) -> f64 {
        sanitize(self.distance_km)
    }
}

/// One row of the weekly aggregate series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesRow {
    pub period: String,
    /// Minutes.
    pub moving_time: Option<f64>,
    /// Kilometres.
    pub distance: Option<f64>,
    /// Metres.
    pub total_elevation_gain: Option<f64>,
}

impl SeriesRow {
    pub fn period_start(&self) -> Option<Date> {
        parse_day(&self.period)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationRow {
    pub distance_m: Option<f64>,
    pub altitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamsPayload {
    #[serde(deserialize_with = "null_as_empty")]
    pub streams: Vec<ElevationRow>,
}

/// Minutes per weekday, one dataset per sport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyHours {
    pub labels: Vec<String>,
    pub datasets: Vec<DailyDataset>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyDataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
}

/// Raw KPI object; values are numbers except the per-sport activity counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiPayload {
    pub kpis: Map<String, Value>,
}

/// Parses the `YYYY-MM-DD` prefix of an ISO date or timestamp.
pub fn parse_day(s: &str) -> Option<Date> {
    let day = s.trim().get(..10)?;
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Finite, non-negative value or zero.
pub(crate) fn sanitize(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}
