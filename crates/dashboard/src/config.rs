//! Runtime configuration read from environment variables.

use std::{path::PathBuf, time::Duration};

use enum_map::EnumMap;

use crate::{client::BackendUpdate, errors::DashboardError, goals::GoalCategory, models::Sport};

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";
pub const DEFAULT_GOALS_PATH: &str = "./goals.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub goals_path: PathBuf,
    pub year: Option<i32>,
    pub sport: Option<Sport>,
    pub weeks_ago: u32,
    /// Where to write the SVG of the last activity's trace.
    pub trace_svg: Option<PathBuf>,
    pub timeout: Duration,
    /// Refresh job to trigger before loading.
    pub update: Option<BackendUpdate>,
    /// Weekly targets to store before loading, in km.
    pub goal_edits: EnumMap<GoalCategory, Option<f64>>,
}

fn goal_key(category: GoalCategory) -> &'static str {
    match category {
        GoalCategory::RunTrail => "DASHBOARD_GOAL_RUNTRAIL",
        GoalCategory::Bike => "DASHBOARD_GOAL_BIKE",
        GoalCategory::Swim => "DASHBOARD_GOAL_SWIM",
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DashboardError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let year = var("DASHBOARD_YEAR")
            .map(|v| parse::<i32>("DASHBOARD_YEAR", &v))
            .transpose()?;

        let sport = var("DASHBOARD_SPORT")
            .map(|v| {
                Sport::parse(&v).ok_or_else(|| {
                    DashboardError::InvalidConfig(format!("DASHBOARD_SPORT: unknown sport {v:?}"))
                })
            })
            .transpose()?;

        let weeks_ago = var("DASHBOARD_WEEK_OFFSET")
            .map(|v| parse::<u32>("DASHBOARD_WEEK_OFFSET", &v))
            .transpose()?
            .unwrap_or(0);

        let timeout_secs = var("DASHBOARD_TIMEOUT_SECS")
            .map(|v| parse::<u64>("DASHBOARD_TIMEOUT_SECS", &v))
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let update = var("DASHBOARD_UPDATE")
            .map(|v| {
                BackendUpdate::parse(&v).ok_or_else(|| {
                    DashboardError::InvalidConfig(format!("DASHBOARD_UPDATE: unknown job {v:?}"))
                })
            })
            .transpose()?;

        let mut goal_edits = EnumMap::default();
        for category in GoalCategory::ALL {
            let key = goal_key(category);
            goal_edits[category] = var(key).map(|v| parse::<f64>(key, &v)).transpose()?;
        }

        Ok(Self {
            api_base: var("DASHBOARD_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            token: var("DASHBOARD_TOKEN"),
            goals_path: var("DASHBOARD_GOALS_PATH")
                .unwrap_or_else(|| DEFAULT_GOALS_PATH.to_string())
                .into(),
            year,
            sport,
            weeks_ago,
            trace_svg: var("DASHBOARD_TRACE_SVG").map(PathBuf::from),
            timeout: Duration::from_secs(timeout_secs),
            update,
            goal_edits,
        })
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, DashboardError> {
    value
        .trim()
        .parse()
        .map_err(|_| DashboardError::InvalidConfig(format!("{key}: invalid value {value:?}")))
}
