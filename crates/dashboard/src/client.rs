//! HTTP client for the training backend.
//!
//! Every call attaches the bearer token supplied by a [`CredentialProvider`];
//! the client itself never stores or refreshes sessions.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
    errors::DashboardError,
    models::{ActivityRecord, DailyHours, ElevationRow, KpiPayload, SeriesRow, Sport, StreamsPayload},
    week_range::WeekRange,
};

/// Source of the current session token.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns a valid bearer token, or `None` when the user has to log in.
    async fn bearer_token(&self) -> Option<String>;
}

/// Fixed token, typically read from the environment.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.trim().is_empty()))
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Server-side refresh jobs the user can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendUpdate {
    /// Re-sync activities from the upstream provider.
    Database,
    /// Re-download detailed streams (altitude, distance).
    Streams,
}

impl BackendUpdate {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "db" | "database" => Some(BackendUpdate::Database),
            "streams" => Some(BackendUpdate::Streams),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            BackendUpdate::Database => "/activities/update_db",
            BackendUpdate::Streams => "/activities/update_streams",
        }
    }

    pub fn pending_message(&self) -> &'static str {
        match self {
            BackendUpdate::Database => "Mise à jour en cours...",
            BackendUpdate::Streams => "Mise à jour des streams...",
        }
    }

    /// Status line shown once the job returned.
    pub fn outcome_message<T>(&self, outcome: &Result<T, DashboardError>) -> &'static str {
        match outcome {
            Ok(_) => match self {
                BackendUpdate::Database => "Base de données mise à jour!",
                BackendUpdate::Streams => "Streams mis à jour!",
            },
            Err(e) if e.requires_login() => "Session expirée, veuillez vous reconnecter",
            Err(DashboardError::Status { .. }) => "Erreur lors de la mise à jour",
            Err(_) => "Erreur de connexion",
        }
    }
}

#[derive(Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl DashboardClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self, DashboardError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// KPI totals, optionally restricted to one calendar year.
    pub async fn kpis(&self, year: Option<i32>) -> Result<KpiPayload, DashboardError> {
        let query: Vec<(&str, String)> = year
            .map(|y| {
                vec![
                    ("start_date", format!("{y:04}-01-01")),
                    ("end_date", format!("{y:04}-12-31")),
                ]
            })
            .unwrap_or_default();
        self.get("/kpi/", &query).await
    }

    pub async fn last_activity(&self, sport: Option<Sport>) -> Result<ActivityRecord, DashboardError> {
        let query: Vec<(&str, String)> = sport
            .map(|s| vec![("sport_type", s.as_str().to_string())])
            .unwrap_or_default();
        self.get("/activities/last_activity", &query).await
    }

    pub async fn last_activity_streams(&self) -> Result<Vec<ElevationRow>, DashboardError> {
        let payload: StreamsPayload = self.get("/activities/last_activity_streams", &[]).await?;
        Ok(payload.streams)
    }

    /// The `weeks` most recent weekly aggregates, oldest first.
    pub async fn weekly_series(&self, weeks: usize) -> Result<Vec<SeriesRow>, DashboardError> {
        self.get("/activities/weekly_stats", &[("weeks", weeks.to_string())])
            .await
    }

    pub async fn daily_hours(&self, weeks_ago: u32) -> Result<DailyHours, DashboardError> {
        self.get("/activities/daily_hours", &[("week_offset", weeks_ago.to_string())])
            .await
    }

    /// Activities of one sport started within `range`.
    pub async fn activities(
        &self,
        sport: Sport,
        range: WeekRange,
    ) -> Result<Vec<ActivityRecord>, DashboardError> {
        let query = [
            ("sport_type", sport.as_str().to_string()),
            ("start_date", range.monday.to_string()),
            ("end_date", range.sunday.to_string()),
        ];
        self.get("/activities/filter_activities", &query).await
    }

    pub async fn update_db(&self) -> Result<Value, DashboardError> {
        self.update(BackendUpdate::Database).await
    }

    pub async fn update_streams(&self) -> Result<Value, DashboardError> {
        self.update(BackendUpdate::Streams).await
    }

    /// Triggers a refresh job and returns the backend's JSON reply.
    pub async fn update(&self, job: BackendUpdate) -> Result<Value, DashboardError> {
        let token = self.token().await?;
        let url = format!("{}{}", self.base_url, job.path());
        debug!("POST {url}");

        let resp = self.client.post(&url).bearer_auth(token).send().await?;
        Self::decode(resp).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DashboardError> {
        let token = self.token().await?;
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url} {query:?}");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn token(&self) -> Result<String, DashboardError> {
        self.credentials
            .bearer_token()
            .await
            .ok_or(DashboardError::MissingCredentials)
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, DashboardError> {
        match resp.status() {
            status if status.is_success() => Ok(resp.json().await?),
            StatusCode::UNAUTHORIZED => Err(DashboardError::SessionExpired),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(DashboardError::Status { status, body })
            }
        }
    }
}
