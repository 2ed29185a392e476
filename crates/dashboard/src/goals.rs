//! Weekly distance goals and progress against them.

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};

use crate::{
    models::{ActivityRecord, Sport, sanitize},
    week_range::WeekRange,
};

/// Goal bucket. `RunTrail` pools running and trail running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalCategory {
    RunTrail,
    Bike,
    Swim,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 3] = [
        GoalCategory::RunTrail,
        GoalCategory::Bike,
        GoalCategory::Swim,
    ];

    /// Sports whose activities count toward this category.
    pub fn sports(&self) -> &'static [Sport] {
        match self {
            GoalCategory::RunTrail => &[Sport::Run, Sport::Trail],
            GoalCategory::Bike => &[Sport::Bike],
            GoalCategory::Swim => &[Sport::Swim],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GoalCategory::RunTrail => "Run + Trail",
            GoalCategory::Bike => "Bike",
            GoalCategory::Swim => "Swim",
        }
    }
}

/// Weekly targets in km. Zero means no goal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalSet {
    pub run_trail: f64,
    pub bike: f64,
    pub swim: f64,
}

impl GoalSet {
    /// Target for `category`; negative or non-finite targets read as zero.
    pub fn target(&self, category: GoalCategory) -> f64 {
        let raw = match category {
            GoalCategory::RunTrail => self.run_trail,
            GoalCategory::Bike => self.bike,
            GoalCategory::Swim => self.swim,
        };
        sanitize(Some(raw))
    }

    pub fn set_target(&mut self, category: GoalCategory, km: f64) {
        let km = sanitize(Some(km));
        match category {
            GoalCategory::RunTrail => self.run_trail = km,
            GoalCategory::Bike => self.bike = km,
            GoalCategory::Swim => self.swim = km,
        }
    }
}

/// Qualitative classification of a progress percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Deficient,
    Moderate,
    Good,
    Complete,
}

impl Band {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            Band::Complete
        } else if percentage >= 75.0 {
            Band::Good
        } else if percentage >= 50.0 {
            Band::Moderate
        } else {
            Band::Deficient
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressResult {
    pub current_km: f64,
    pub goal_km: f64,
    /// In `[0, 100]`.
    pub percentage: f64,
    pub band: Band,
}

impl ProgressResult {
    pub fn new(current_km: f64, goal_km: f64) -> Self {
        let current_km = sanitize(Some(current_km));
        let goal_km = sanitize(Some(goal_km));
        let percentage = if goal_km > 0.0 {
            (current_km / goal_km * 100.0).min(100.0)
        } else {
            0.0
        };
        Self {
            current_km,
            goal_km,
            percentage,
            band: Band::from_percentage(percentage),
        }
    }

    pub fn has_goal(&self) -> bool {
        self.goal_km > 0.0
    }
}

/// Computes weekly progress per goal category.
///
/// Activity lists are filtered to `range` again here; upstream queries are
/// not trusted to have scoped them exactly. Records without a parseable
/// start day are skipped.
pub fn progress(
    activities: &EnumMap<Sport, Vec<ActivityRecord>>,
    range: WeekRange,
    goals: &GoalSet,
) -> EnumMap<GoalCategory, ProgressResult> {
    EnumMap::from_fn(|category: GoalCategory| {
        let current_km: f64 = category
            .sports()
            .iter()
            .flat_map(|sport| activities[*sport].iter())
            .filter(|a| a.start_day().is_some_and(|day| range.contains(day)))
            .map(ActivityRecord::distance)
            .sum();
        ProgressResult::new(current_km, goals.target(category))
    })
}
