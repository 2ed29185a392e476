//! Dashboard load: fans out the backend fetches and feeds each consumer as
//! soon as its own inputs are in.

use enum_map::EnumMap;
use serde::Serialize;
use time::Date;
use tracing::{debug, info, warn};

use crate::{
    client::DashboardClient,
    daily_hours::WeekHours,
    elevation::ElevationProfile,
    errors::DashboardError,
    goals::{GoalCategory, GoalSet, ProgressResult, progress},
    kpi::KpiReport,
    models::{ActivityRecord, SeriesRow, Sport},
    projection::{ProjectedTrace, ProjectionFrame, project},
    series::{Metric, SeriesPoint, series_points},
    summary::ActivitySummary,
    week_range::{WeekRange, current_week_range},
    window::{WindowNavigator, WindowState},
};

/// Identifies one series fetch. Only the most recently issued token may
/// update the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    id: u64,
    state: WindowState,
}

impl RequestToken {
    /// Number of periods the fetch must request.
    pub fn periods(&self) -> usize {
        WindowNavigator::from_state(self.state).periods_to_fetch()
    }
}

/// Weekly series chart with its navigation state.
///
/// Offset changes become visible only once the data fetched for them has
/// been applied, so a page is never cut from a series fetched for another
/// offset.
#[derive(Debug, Clone, Default)]
pub struct SeriesChart {
    navigator: WindowNavigator,
    metric: Metric,
    rows: Vec<SeriesRow>,
    shown: WindowNavigator,
    last_issued: u64,
}

impl SeriesChart {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            ..Default::default()
        }
    }

    pub fn navigator(&self) -> &WindowNavigator {
        &self.navigator
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn set_metric(&mut self, metric: Metric) {
        self.metric = metric;
    }

    /// Moves the requested window and issues the fetch token for it.
    pub fn advance(&mut self, delta: i64) -> RequestToken {
        self.navigator.advance(delta);
        self.begin_request()
    }

    pub fn begin_request(&mut self) -> RequestToken {
        self.last_issued += 1;
        RequestToken {
            id: self.last_issued,
            state: self.navigator.state(),
        }
    }

    /// Installs fetched rows. Returns `false` and keeps the current data when
    /// `token` has been superseded by a later request.
    pub fn apply(&mut self, token: RequestToken, rows: Vec<SeriesRow>) -> bool {
        if token.id != self.last_issued {
            debug!(
                "Discarding stale series response {} (latest {})",
                token.id, self.last_issued
            );
            return false;
        }
        self.rows = rows;
        self.shown = WindowNavigator::from_state(token.state);
        true
    }

    /// Fetches the rows covering the current window and applies them.
    pub async fn refresh(&mut self, client: &DashboardClient) -> Result<(), DashboardError> {
        let token = self.begin_request();
        let rows = client.weekly_series(token.periods()).await?;
        self.apply(token, rows);
        Ok(())
    }

    /// Every loaded point, oldest first.
    pub fn points(&self) -> Vec<SeriesPoint> {
        series_points(&self.rows, self.metric)
    }

    /// Points of the visible page, oldest first.
    pub fn visible(&self) -> Vec<SeriesPoint> {
        let points = self.points();
        self.shown.page(&points).to_vec()
    }
}

/// User-selected filters for one dashboard load.
#[derive(Debug, Clone, Default)]
pub struct DashboardSettings {
    /// Restrict KPIs to a calendar year.
    pub year: Option<i32>,
    /// Restrict the "last activity" card to a sport. The elevation profile
    /// is only shown when unset.
    pub sport: Option<Sport>,
    /// Week shown by the goal and daily-hours panels.
    pub weeks_ago: u32,
    pub frame: ProjectionFrame,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastActivityView {
    pub summary: ActivitySummary,
    /// `None` when the activity has no usable GPS data.
    pub trace: Option<ProjectedTrace>,
    pub elevation: Option<ElevationProfile>,
    pub activity: ActivityRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalsView {
    pub range: WeekRange,
    pub progress: EnumMap<GoalCategory, ProgressResult>,
}

/// Message the user has to see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub resource: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub kpis: Option<KpiReport>,
    pub last_activity: Option<LastActivityView>,
    pub weekly: Vec<SeriesPoint>,
    pub daily: Option<WeekHours>,
    pub goals: GoalsView,
    pub notices: Vec<Notice>,
}

/// Loads every panel of the dashboard.
///
/// Fetches run concurrently. A failing resource leaves its panel empty; only
/// KPI failures and expired sessions are reported as notices.
pub async fn load_dashboard(
    client: &DashboardClient,
    settings: &DashboardSettings,
    chart: &mut SeriesChart,
    goals: &GoalSet,
    today: Date,
) -> Dashboard {
    let range = current_week_range(today, settings.weeks_ago);
    let series_token = chart.begin_request();

    let (kpis, last_activity, series, daily, goal_activities) = tokio::join!(
        client.kpis(settings.year),
        load_last_activity(client, settings),
        client.weekly_series(series_token.periods()),
        client.daily_hours(settings.weeks_ago),
        fetch_goal_activities(client, range),
    );

    let mut notices = Vec::new();

    let kpis = match kpis {
        Ok(payload) => Some(KpiReport::from_payload(&payload)),
        Err(e) => {
            warn!("Failed to load KPIs: {e}");
            notices.push(Notice {
                resource: "kpis",
                message: format!("Impossible de charger les KPIs: {e}"),
            });
            note_session(&mut notices, &e);
            None
        }
    };

    let last_activity = match last_activity {
        Ok(view) => Some(view),
        Err(e) => {
            warn!("Failed to load last activity: {e}");
            note_session(&mut notices, &e);
            None
        }
    };

    match series {
        Ok(rows) => {
            chart.apply(series_token, rows);
        }
        Err(e) => {
            warn!("Failed to load weekly series: {e}");
            note_session(&mut notices, &e);
        }
    }

    let daily = match daily {
        Ok(payload) => Some(WeekHours::from_payload(&payload)),
        Err(e) => {
            warn!("Failed to load daily hours: {e}");
            note_session(&mut notices, &e);
            None
        }
    };

    let goals_view = GoalsView {
        range,
        progress: progress(&goal_activities, range, goals),
    };

    info!(
        "Dashboard loaded for week {} ({} notices)",
        range.label(),
        notices.len()
    );

    Dashboard {
        kpis,
        last_activity,
        weekly: chart.visible(),
        daily,
        goals: goals_view,
        notices,
    }
}

async fn load_last_activity(
    client: &DashboardClient,
    settings: &DashboardSettings,
) -> Result<LastActivityView, DashboardError> {
    // Streams belong to the latest activity of any sport.
    let (activity, streams) = tokio::join!(client.last_activity(settings.sport), async {
        match settings.sport {
            Some(_) => None,
            None => Some(client.last_activity_streams().await),
        }
    });
    let activity = activity?;

    let elevation = match streams {
        Some(Ok(rows)) => ElevationProfile::from_streams(&rows),
        Some(Err(e)) => {
            warn!("Failed to load elevation streams: {e}");
            None
        }
        None => None,
    };

    Ok(LastActivityView {
        summary: ActivitySummary::from_record(&activity),
        trace: project(activity.trace(), &settings.frame),
        elevation,
        activity,
    })
}

/// Fetches the four sport lists for `range`. A failed query leaves that
/// sport empty without affecting the others.
pub async fn fetch_goal_activities(
    client: &DashboardClient,
    range: WeekRange,
) -> EnumMap<Sport, Vec<ActivityRecord>> {
    let (run, trail, bike, swim) = tokio::join!(
        activities_or_empty(client, Sport::Run, range),
        activities_or_empty(client, Sport::Trail, range),
        activities_or_empty(client, Sport::Bike, range),
        activities_or_empty(client, Sport::Swim, range),
    );

    let mut activities: EnumMap<Sport, Vec<ActivityRecord>> = EnumMap::default();
    activities[Sport::Run] = run;
    activities[Sport::Trail] = trail;
    activities[Sport::Bike] = bike;
    activities[Sport::Swim] = swim;
    activities
}

async fn activities_or_empty(
    client: &DashboardClient,
    sport: Sport,
    range: WeekRange,
) -> Vec<ActivityRecord> {
    match client.activities(sport, range).await {
        Ok(activities) => activities,
        Err(e) => {
            warn!("Failed to load {} activities: {e}", sport.as_str());
            Vec::new()
        }
    }
}

fn note_session(notices: &mut Vec<Notice>, error: &DashboardError) {
    if error.requires_login() && !notices.iter().any(|n| n.resource == "session") {
        notices.push(Notice {
            resource: "session",
            message: "Session expirée, veuillez vous reconnecter".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<SeriesRow> {
        (0..n)
            .map(|i| SeriesRow {
                period: format!("2025-{:02}-01", i % 12 + 1),
                moving_time: Some(60.0 * i as f64),
                ..Default::default()
            })
            .collect()
    }

    fn weekly_rows(n: usize) -> Vec<SeriesRow> {
        let start = time::macros::date!(2024 - 01 - 01);
        (0..n)
            .map(|i| SeriesRow {
                period: (start + time::Duration::weeks(i as i64)).to_string(),
                distance: Some(i as f64),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut chart = SeriesChart::new(Metric::Hours);
        let first = chart.begin_request();
        let second = chart.advance(1);

        assert!(!chart.apply(first, rows(3)));
        assert!(chart.points().is_empty());

        assert!(chart.apply(second, rows(2)));
        assert_eq!(chart.points().len(), 2);
    }

    #[test]
    fn test_token_covers_offset() {
        let mut chart = SeriesChart::default();
        assert_eq!(chart.begin_request().periods(), 10);
        assert_eq!(chart.advance(5).periods(), 15);
        assert_eq!(chart.advance(-20).periods(), 10);
    }

    #[test]
    fn test_offset_visible_only_after_apply() {
        let mut chart = SeriesChart::new(Metric::Distance);
        let token = chart.begin_request();
        chart.apply(token, weekly_rows(10));
        assert_eq!(chart.visible().last().map(|p| p.value), Some(9.0));

        let token = chart.advance(3);
        // still the previous page until the wider series arrives
        assert_eq!(chart.visible().last().map(|p| p.value), Some(9.0));

        chart.apply(token, weekly_rows(13));
        let visible = chart.visible();
        assert_eq!(visible.len(), 10);
        assert_eq!(visible.last().map(|p| p.value), Some(9.0));
        assert_eq!(visible.first().map(|p| p.value), Some(0.0));
    }

    #[test]
    fn test_session_notice_deduplicated() {
        let mut notices = Vec::new();
        note_session(&mut notices, &DashboardError::SessionExpired);
        note_session(&mut notices, &DashboardError::MissingCredentials);
        note_session(&mut notices, &DashboardError::InvalidConfig("x".into()));
        assert_eq!(notices.len(), 1);
    }
}
