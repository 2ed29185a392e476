pub mod client;
pub mod config;
pub mod daily_hours;
pub mod dashboard;
pub mod elevation;
pub mod errors;
pub mod goal_store;
pub mod goals;
pub mod kpi;
pub mod models;
pub mod projection;
pub mod render;
pub mod series;
pub mod summary;
pub mod week_range;
pub mod window;

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    client::{DashboardClient, StaticToken},
    config::DashboardConfig,
    dashboard::{Dashboard, DashboardSettings, SeriesChart, load_dashboard},
    goal_store::{FileGoalStore, update_goals},
    goals::GoalCategory,
    kpi::format_number_fr,
    render::{ProgressBar, TraceCanvas},
    series::Metric,
    week_range::today,
};

/// Stores edited goals, runs the requested refresh job, then loads the
/// dashboard once, prints it and writes the trace artifact.
pub async fn run(config: DashboardConfig) -> anyhow::Result<()> {
    let client = DashboardClient::new(
        config.api_base.clone(),
        Arc::new(StaticToken::new(config.token.clone())),
        config.timeout,
    )?;
    info!("Loading dashboard from {}", client.base_url());

    let store = FileGoalStore::new(config.goals_path.clone());
    let goals = update_goals(&store, &config.goal_edits)?;

    if let Some(job) = config.update {
        println!("{}", job.pending_message());
        let outcome = client.update(job).await;
        if let Err(e) = &outcome {
            warn!("Update {job:?} failed: {e}");
        }
        println!("{}", job.outcome_message(&outcome));
    }

    let settings = DashboardSettings {
        year: config.year,
        sport: config.sport,
        weeks_ago: config.weeks_ago,
        ..Default::default()
    };
    let mut chart = SeriesChart::new(Metric::Hours);

    let dashboard = load_dashboard(&client, &settings, &mut chart, &goals, today()).await;
    print_dashboard(&dashboard, chart.metric());

    if let Some(path) = &config.trace_svg {
        let canvas = TraceCanvas::with_frame(settings.frame);
        let svg = match dashboard.last_activity.as_ref().and_then(|a| a.trace.as_ref()) {
            Some(trace) => canvas.render(trace),
            None => canvas.placeholder("Aucune donnée GPS disponible"),
        };
        tokio::fs::write(path, svg).await?;
        info!("Wrote trace to {}", path.display());
    }

    Ok(())
}

fn print_dashboard(dashboard: &Dashboard, metric: Metric) {
    for notice in &dashboard.notices {
        warn!("{}: {}", notice.resource, notice.message);
        println!("! {}", notice.message);
    }

    if let Some(kpis) = &dashboard.kpis {
        println!("== KPIs ==");
        for card in &kpis.cards {
            println!("{:<28} {}", card.label, card.value);
        }
        for count in &kpis.activity_counts {
            println!("  {:<16} {}", count.sport, count.count);
        }
    }

    if let Some(last) = &dashboard.last_activity {
        println!("\n== {} ({}) ==", last.summary.title, last.summary.date);
        for stat in &last.summary.stats {
            println!("{:<20} {}", stat.label, stat.value);
        }
        if let Some(profile) = &last.elevation {
            println!(
                "Profil: {} km, D+ {} m",
                format_number_fr(profile.total_km()),
                format_number_fr(profile.gain_m())
            );
        }
    }

    println!("\n== Objectifs {} ==", dashboard.goals.range.label());
    let bar = ProgressBar::default();
    for category in GoalCategory::ALL {
        println!("{}", bar.render(category, &dashboard.goals.progress[category]));
    }

    println!("\n== Semaines ({}) ==", metric.unit());
    for point in &dashboard.weekly {
        println!("{}  {}", point.period_start, format_number_fr(point.value));
    }

    if let Some(daily) = &dashboard.daily {
        println!("\n== Heures par jour ==");
        for (day, total) in daily.days.iter().zip(&daily.day_totals) {
            println!("{day:<10} {}", format_number_fr(*total));
        }
        if let Some(sport) = daily.dominant_sport() {
            println!("Sport principal: {} ({} h)", sport.sport, format_number_fr(sport.total));
        }
    }
}
