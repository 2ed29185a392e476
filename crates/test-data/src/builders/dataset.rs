//! Fluent builder for a reproducible training history.

use std::{ops::RangeInclusive, time::Instant};

use dashboard::{
    models::{ActivityRecord, DailyHours, ElevationRow, KpiPayload, SeriesRow, Sport},
    week_range::current_week_range,
};
use rand::{
    Rng, SeedableRng,
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
};
use time::{Date, Duration, Time};
use tracing::info;

use crate::{
    config::{BoundingBox, SeedConfig},
    generators::{ActivityGenerator, GeneratedActivity, aggregate},
};

/// Relative frequency of Run, Trail, Bike and Swim sessions.
const SPORT_WEIGHTS: [u32; 4] = [40, 20, 25, 15];

/// Builder for a [`Dataset`].
///
/// ```rust,ignore
/// let dataset = DatasetBuilder::new()
///     .with_seed(7)
///     .with_weeks(12)
///     .with_region(Region::VERCORS)
///     .build(today);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    config: SeedConfig,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: SeedConfig) -> Self {
        Self { config }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_weeks(mut self, weeks: usize) -> Self {
        self.config.weeks = weeks;
        self
    }

    pub fn with_activities_per_week(mut self, range: RangeInclusive<usize>) -> Self {
        self.config.activities_per_week = range;
        self
    }

    pub fn with_region(mut self, region: BoundingBox) -> Self {
        self.config.region = region;
        self
    }

    pub fn with_invalid_sample_rate(mut self, rate: f64) -> Self {
        self.config.invalid_sample_rate = rate;
        self
    }

    /// Generates the history of the `weeks` weeks ending with the week of
    /// `today`. No activity is dated after `today`.
    pub fn build(&self, today: Date) -> Dataset {
        let started = Instant::now();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let generator = ActivityGenerator::new(self.config.region, self.config.seed as u32)
            .with_invalid_samples(self.config.invalid_sample_rate);
        let sports = WeightedIndex::new(SPORT_WEIGHTS).ok();

        let mut activities = Vec::new();
        for weeks_ago in (0..self.config.weeks).rev() {
            let week = current_week_range(today, u32::try_from(weeks_ago).unwrap_or(u32::MAX));
            let count = if self.config.activities_per_week.is_empty() {
                0
            } else {
                rng.gen_range(self.config.activities_per_week.clone())
            };

            for _ in 0..count {
                let day = week.monday + Duration::days(rng.gen_range(0..7));
                if day > today {
                    continue;
                }
                let sport = sports
                    .as_ref()
                    .map_or(Sport::Run, |dist| Sport::ALL[dist.sample(&mut rng)]);
                let hour = rng.gen_range(6..20);
                let minute = rng.gen_range(0..60);
                let started_at = day
                    .with_time(Time::from_hms(hour, minute, 0).unwrap_or(Time::MIDNIGHT))
                    .assume_utc();

                activities.push(generator.generate(sport, started_at, &mut rng));
            }
        }
        activities.sort_by_key(|a| a.started_at);

        info!(
            "Generated {} activities over {} weeks in {} ms",
            activities.len(),
            self.config.weeks,
            started.elapsed().as_millis()
        );

        Dataset { activities, today }
    }
}

/// Generated history and the queries the backend answers from it.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Ordered by start time.
    activities: Vec<GeneratedActivity>,
    today: Date,
}

impl Dataset {
    pub fn new(mut activities: Vec<GeneratedActivity>, today: Date) -> Self {
        activities.sort_by_key(|a| a.started_at);
        Self { activities, today }
    }

    pub fn activities(&self) -> &[GeneratedActivity] {
        &self.activities
    }

    pub fn today(&self) -> Date {
        self.today
    }

    pub fn last_activity(&self, sport: Option<Sport>) -> Option<&GeneratedActivity> {
        self.activities
            .iter()
            .rev()
            .find(|a| sport.is_none_or(|s| a.sport == s))
    }

    /// Streams of the most recent activity of any sport.
    pub fn last_activity_streams(&self) -> Vec<ElevationRow> {
        self.last_activity(None)
            .map(|a| a.streams.clone())
            .unwrap_or_default()
    }

    pub fn weekly_series(&self, weeks: usize) -> Vec<SeriesRow> {
        aggregate::weekly_series(&self.activities, self.today, weeks)
    }

    pub fn daily_hours(&self, weeks_ago: u32) -> DailyHours {
        aggregate::daily_hours(&self.activities, current_week_range(self.today, weeks_ago))
    }

    pub fn kpis(&self, period: Option<(Date, Date)>) -> KpiPayload {
        aggregate::kpis(&self.activities, period)
    }

    /// Records of `sport` started within `[start, end]`.
    pub fn filter(&self, sport: Sport, start: Date, end: Date) -> Vec<ActivityRecord> {
        self.activities
            .iter()
            .filter(|a| a.sport == sport)
            .filter(|a| {
                let day = a.started_at.date();
                start <= day && day <= end
            })
            .map(|a| a.record.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn dataset() -> Dataset {
        DatasetBuilder::new()
            .with_seed(7)
            .with_weeks(6)
            .with_activities_per_week(3..=4)
            .build(date!(2025 - 03 - 05))
    }

    #[test]
    fn test_same_seed_same_history() {
        let a = dataset();
        let b = dataset();
        assert_eq!(a.activities().len(), b.activities().len());
        for (x, y) in a.activities().iter().zip(b.activities()) {
            assert_eq!(x.started_at, y.started_at);
            assert_eq!(x.sport, y.sport);
            assert_eq!(x.record.name, y.record.name);
        }
    }

    #[test]
    fn test_history_bounds() {
        let dataset = dataset();
        let first_monday = date!(2025 - 01 - 27);
        assert!(!dataset.activities().is_empty());
        assert!(dataset.activities().len() <= 24);
        for activity in dataset.activities() {
            let day = activity.started_at.date();
            assert!(day >= first_monday && day <= date!(2025 - 03 - 05), "{day}");
        }
        assert!(
            dataset
                .activities()
                .windows(2)
                .all(|w| w[0].started_at <= w[1].started_at)
        );
    }

    #[test]
    fn test_queries() {
        let dataset = dataset();
        let last = dataset.last_activity(None).unwrap();
        assert_eq!(last.started_at, dataset.activities().last().unwrap().started_at);

        for sport in Sport::ALL {
            if let Some(activity) = dataset.last_activity(Some(sport)) {
                assert_eq!(activity.sport, sport);
            }
        }

        let rows = dataset.weekly_series(6);
        assert_eq!(rows.len(), 6);
        let total: f64 = rows.iter().filter_map(|r| r.distance).sum();
        let expected: f64 = dataset.activities().iter().map(|a| a.distance_km).sum();
        assert!((total - expected).abs() < 0.5);

        let all: usize = Sport::ALL
            .into_iter()
            .map(|s| dataset.filter(s, date!(2025 - 01 - 01), date!(2025 - 12 - 31)).len())
            .sum();
        assert_eq!(all, dataset.activities().len());
    }
}
