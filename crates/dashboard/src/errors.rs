use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("No credentials available")]
    MissingCredentials,

    #[error("Session expired")]
    SessionExpired,

    #[error("Backend returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DashboardError {
    /// Whether the failure means the user has to log in again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            DashboardError::MissingCredentials | DashboardError::SessionExpired
        )
    }
}
