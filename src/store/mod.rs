//! Persistence for per-user progress. The engine itself is pure; the
//! service reads and writes through a [`ProgressStore`].

pub mod json;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Deserialize};
use crate::advice::PlanAdvice;
use crate::curriculum::{CurriculumPlan, Goal};
use crate::error::TrackerError;
use crate::skills::SkillMatrix;
use crate::tasks::Task;
use crate::validation::weekly::DailyLogRecord;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

/// A goal with the plan generated for it and the date the plan started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRecord {
    pub goal: Goal,
    pub plan: CurriculumPlan,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<PlanAdvice>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn load_goal(&self, user: &str) -> Result<Option<GoalRecord>, TrackerError>;
    async fn save_goal(&self, user: &str, record: &GoalRecord) -> Result<(), TrackerError>;

    /// An unknown user has an empty matrix.
    async fn load_skills(&self, user: &str) -> Result<SkillMatrix, TrackerError>;
    async fn save_skills(&self, user: &str, matrix: &SkillMatrix) -> Result<(), TrackerError>;

    async fn load_tasks(&self, user: &str) -> Result<Vec<Task>, TrackerError>;
    async fn save_tasks(&self, user: &str, tasks: &[Task]) -> Result<(), TrackerError>;

    /// Logs in insertion order.
    async fn load_logs(&self, user: &str) -> Result<Vec<DailyLogRecord>, TrackerError>;
    async fn append_log(&self, user: &str, record: &DailyLogRecord) -> Result<(), TrackerError>;
}

/// User ids become directory names in the JSON store, so they are limited to
/// ASCII alphanumerics, `-` and `_`.
pub fn check_user_id(user: &str) -> Result<(), TrackerError> {
    let ok = !user.is_empty()
        && user.len() <= 128
        && user.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(TrackerError::new("Invalid user id", "store").with_user(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_are_path_safe() {
        assert!(check_user_id("alice_01").is_ok());
        assert!(check_user_id("").is_err());
        assert!(check_user_id("../etc").is_err());
        assert!(check_user_id("a b").is_err());
    }
}
