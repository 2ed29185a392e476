//! Persistence of the user's weekly goals.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use enum_map::EnumMap;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    errors::DashboardError,
    goals::{GoalCategory, GoalSet},
};

/// Key under which the goals are stored.
pub const GOALS_KEY: &str = "weekly_goals";

pub trait GoalStore: Send + Sync {
    /// Stored goals, or the empty goal set when nothing usable is stored.
    fn load(&self) -> GoalSet;

    fn save(&self, goals: &GoalSet) -> Result<(), DashboardError>;
}

/// Applies user-edited targets on top of the stored goals. The result is
/// saved only when at least one target was edited.
pub fn update_goals(
    store: &dyn GoalStore,
    edits: &EnumMap<GoalCategory, Option<f64>>,
) -> Result<GoalSet, DashboardError> {
    let mut goals = store.load();
    if edits.values().all(Option::is_none) {
        return Ok(goals);
    }

    for (category, km) in edits {
        if let Some(km) = km {
            goals.set_target(category, *km);
        }
    }
    store.save(&goals)?;
    Ok(goals)
}

/// Key-value JSON file; other keys in the file are preserved on save.
#[derive(Debug, Clone)]
pub struct FileGoalStore {
    path: PathBuf,
}

impl FileGoalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, Value>, DashboardError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

impl GoalStore for FileGoalStore {
    fn load(&self) -> GoalSet {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable goal file {}: {e}", self.path.display());
                return GoalSet::default();
            }
        };

        entries
            .get(GOALS_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    fn save(&self, goals: &GoalSet) -> Result<(), DashboardError> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Overwriting unreadable goal file {}: {e}", self.path.display());
                BTreeMap::new()
            }
        };
        entries.insert(GOALS_KEY.to_string(), serde_json::to_value(goals)?);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;

        info!("Saved weekly goals to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryGoalStore {
    goals: Mutex<Option<GoalSet>>,
}

impl GoalStore for MemoryGoalStore {
    fn load(&self) -> GoalSet {
        self.goals
            .lock()
            .map(|g| g.unwrap_or_default())
            .unwrap_or_default()
    }

    fn save(&self, goals: &GoalSet) -> Result<(), DashboardError> {
        let mut stored = self
            .goals
            .lock()
            .map_err(|e| DashboardError::Storage(e.to_string()))?;
        *stored = Some(*goals);
        Ok(())
    }
}
