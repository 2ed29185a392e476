//! Mock training backend serving a generated [`Dataset`].

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Query, State},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use dashboard::models::{
    ActivityRecord, DailyHours, KpiPayload, SeriesRow, Sport, StreamsPayload, parse_day,
};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};

use crate::builders::Dataset;

/// Weeks returned by the weekly endpoint when the client does not ask.
const DEFAULT_WEEKS: usize = 10;

#[derive(Error, Debug)]
pub enum MockError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = match &self {
            MockError::Unauthorized => StatusCode::UNAUTHORIZED,
            MockError::NotFound => StatusCode::NOT_FOUND,
            MockError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub struct MockState {
    pub dataset: Dataset,
    /// Bearer token every request must carry.
    pub token: String,
}

/// Rejects requests whose bearer token does not match the server's.
pub struct Authorized;

impl FromRequestParts<Arc<MockState>> for Authorized {
    type Rejection = MockError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<MockState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(MockError::Unauthorized)?;

        if token == state.token {
            Ok(Authorized)
        } else {
            Err(MockError::Unauthorized)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SportQuery {
    pub sport_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeeksQuery {
    pub weeks: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct WeekOffsetQuery {
    pub week_offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub sport_type: String,
    pub start_date: String,
    pub end_date: String,
}

fn parse_sport(value: &str) -> Result<Sport, MockError> {
    Sport::parse(value).ok_or_else(|| MockError::InvalidInput(format!("unknown sport {value:?}")))
}

fn parse_date(value: &str) -> Result<time::Date, MockError> {
    parse_day(value).ok_or_else(|| MockError::InvalidInput(format!("invalid date {value:?}")))
}

pub async fn get_kpis(
    _: Authorized,
    State(state): State<Arc<MockState>>,
    Query(q): Query<PeriodQuery>,
) -> Result<Json<KpiPayload>, MockError> {
    let period = match (q.start_date.as_deref(), q.end_date.as_deref()) {
        (Some(start), Some(end)) => Some((parse_date(start)?, parse_date(end)?)),
        (None, None) => None,
        _ => {
            return Err(MockError::InvalidInput(
                "start_date and end_date go together".to_string(),
            ));
        }
    };
    Ok(Json(state.dataset.kpis(period)))
}

pub async fn get_last_activity(
    _: Authorized,
    State(state): State<Arc<MockState>>,
    Query(q): Query<SportQuery>,
) -> Result<Json<ActivityRecord>, MockError> {
    let sport = q.sport_type.as_deref().map(parse_sport).transpose()?;
    state
        .dataset
        .last_activity(sport)
        .map(|a| Json(a.record.clone()))
        .ok_or(MockError::NotFound)
}

pub async fn get_last_activity_streams(
    _: Authorized,
    State(state): State<Arc<MockState>>,
) -> Json<StreamsPayload> {
    Json(StreamsPayload {
        streams: state.dataset.last_activity_streams(),
    })
}

pub async fn get_weekly_stats(
    _: Authorized,
    State(state): State<Arc<MockState>>,
    Query(q): Query<WeeksQuery>,
) -> Json<Vec<SeriesRow>> {
    Json(state.dataset.weekly_series(q.weeks.unwrap_or(DEFAULT_WEEKS)))
}

pub async fn get_daily_hours(
    _: Authorized,
    State(state): State<Arc<MockState>>,
    Query(q): Query<WeekOffsetQuery>,
) -> Json<DailyHours> {
    Json(state.dataset.daily_hours(q.week_offset.unwrap_or(0)))
}

pub async fn filter_activities(
    _: Authorized,
    State(state): State<Arc<MockState>>,
    Query(q): Query<FilterQuery>,
) -> Result<Json<Vec<ActivityRecord>>, MockError> {
    let sport = parse_sport(&q.sport_type)?;
    let (start, end) = (parse_date(&q.start_date)?, parse_date(&q.end_date)?);
    let records = state.dataset.filter(sport, start, end);
    debug!("{} {} activities between {start} and {end}", records.len(), sport.as_str());
    Ok(Json(records))
}

/// The generated history is fixed, so a sync only reports what it holds.
pub async fn update_db(_: Authorized, State(state): State<Arc<MockState>>) -> Json<Value> {
    let activities = state.dataset.activities().len();
    info!("Database sync requested ({activities} activities)");
    Json(json!({ "status": "ok", "activities": activities }))
}

pub async fn update_streams(_: Authorized, State(state): State<Arc<MockState>>) -> Json<Value> {
    let rows = state.dataset.last_activity_streams().len();
    info!("Streams sync requested ({rows} rows)");
    Json(json!({ "status": "ok", "streams": rows }))
}

pub fn create_router(state: Arc<MockState>) -> Router {
    let api = Router::new()
        .route("/kpi/", get(get_kpis))
        .route("/activities/last_activity", get(get_last_activity))
        .route(
            "/activities/last_activity_streams",
            get(get_last_activity_streams),
        )
        .route("/activities/weekly_stats", get(get_weekly_stats))
        .route("/activities/daily_hours", get(get_daily_hours))
        .route("/activities/filter_activities", get(filter_activities))
        .route("/activities/update_db", post(update_db))
        .route("/activities/update_streams", post(update_streams))
        .with_state(state);

    Router::new().nest("/api", api)
}

pub async fn run_server(state: MockState, port: u16) -> anyhow::Result<()> {
    let activities = state.dataset.activities().len();
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    info!("Mock backend with {activities} activities on http://0.0.0.0:{port}/api");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::DatasetBuilder;
    use dashboard::{
        client::{BackendUpdate, DashboardClient, StaticToken},
        dashboard::{DashboardSettings, SeriesChart, load_dashboard},
        errors::DashboardError,
        goals::GoalSet,
        week_range::current_week_range,
    };
    use std::time::Duration;
    use time::macros::date;

    const TODAY: time::Date = date!(2025 - 03 - 05);

    async fn spawn(token: &str) -> String {
        let dataset = DatasetBuilder::new()
            .with_seed(11)
            .with_weeks(12)
            .with_activities_per_week(3..=5)
            .with_invalid_sample_rate(0.05)
            .build(TODAY);
        let app = create_router(Arc::new(MockState {
            dataset,
            token: token.to_string(),
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    fn client(base: &str, token: &str) -> DashboardClient {
        DashboardClient::new(
            base,
            Arc::new(StaticToken::new(Some(token.to_string()))),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_against_mock() {
        let base = spawn("secret").await;
        let client = client(&base, "secret");
        let mut chart = SeriesChart::default();
        let goals = GoalSet {
            run_trail: 30.0,
            bike: 100.0,
            swim: 3.0,
        };

        let dashboard = load_dashboard(
            &client,
            &DashboardSettings::default(),
            &mut chart,
            &goals,
            TODAY,
        )
        .await;

        assert!(dashboard.notices.is_empty(), "{:?}", dashboard.notices);
        assert_eq!(dashboard.kpis.map(|k| k.cards.len()), Some(10));
        assert!(dashboard.last_activity.is_some());
        assert_eq!(dashboard.weekly.len(), 10);
        assert_eq!(dashboard.daily.map(|d| d.days.len()), Some(7));
    }

    #[tokio::test]
    async fn test_wrong_token_rejected() {
        let base = spawn("secret").await;
        let err = client(&base, "nope").kpis(None).await.unwrap_err();
        assert!(matches!(err, DashboardError::SessionExpired));
    }

    #[tokio::test]
    async fn test_weekly_and_filter_endpoints() {
        let base = spawn("secret").await;
        let client = client(&base, "secret");

        let rows = client.weekly_series(4).await.unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.last().map(|r| r.period.as_str()), Some("2025-03-03"));

        let range = current_week_range(TODAY, 1);
        let runs = client.activities(Sport::Run, range).await.unwrap();
        for run in runs {
            assert_eq!(run.sport_type.as_deref(), Some("Run"));
            assert!(run.start_day().is_some_and(|d| range.contains(d)));
        }
    }

    #[tokio::test]
    async fn test_update_endpoints() {
        let base = spawn("secret").await;
        let api = client(&base, "secret");

        let reply = api.update_db().await.unwrap();
        assert_eq!(reply["status"], "ok");
        assert!(reply["activities"].as_u64().is_some_and(|n| n > 0));

        let outcome = api.update_streams().await;
        assert!(outcome.is_ok());
        assert_eq!(
            BackendUpdate::Streams.outcome_message(&outcome),
            "Streams mis à jour!"
        );

        let err = client(&base, "nope").update_db().await.unwrap_err();
        assert!(matches!(err, DashboardError::SessionExpired));
    }
}
