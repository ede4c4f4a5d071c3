pub mod advice;
pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod curriculum;
pub mod error;
pub mod gates;
pub mod logging;
pub mod metrics;
pub mod notify;
pub mod portfolio;
pub mod readiness;
pub mod service;
pub mod skills;
pub mod store;
pub mod tasks;
pub mod validation;

use chrono::NaiveDate;
use crate::curriculum::{CurriculumPlan, Goal, Phase};
use crate::error::ShapeError;
use crate::skills::SkillMap;
use crate::tasks::Task;
use crate::validation::{DailyLogSubmission, ValidationPolicy, ValidationVerdict};

pub use crate::error::TrackerError;

/// Deterministic curriculum for a goal.
pub fn generate_curriculum_plan(goal: &Goal) -> CurriculumPlan {
    curriculum::generate(goal)
}

/// Shape-check a submission, then run the daily gate. `None` uses the
/// default policy. Rule violations come back inside the verdict; only a
/// malformed submission is an `Err`.
pub fn validate_daily_submission(
    submission: &DailyLogSubmission,
    policy: Option<&ValidationPolicy>,
) -> Result<ValidationVerdict, ShapeError> {
    let default_policy;
    let policy = match policy {
        Some(p) => p,
        None => {
            default_policy = ValidationPolicy::default();
            &default_policy
        }
    };
    submission.check_shape(policy)?;
    Ok(validation::validate(submission, policy))
}

/// Credit activities to a skill map. Does not deduplicate; see
/// [`skills::SkillMatrix::apply_once`] for the once-per-day variant.
pub fn apply_skill_update(current: &SkillMap, activity_names: &[String], activity_date: NaiveDate) -> SkillMap {
    skills::apply(current, activity_names, activity_date)
}

pub fn derive_tasks_for_phase(phase: &Phase) -> Vec<Task> {
    tasks::derive_tasks(phase)
}

pub fn needs_task_regeneration(tasks: &[Task]) -> bool {
    tasks::should_regenerate(tasks)
}
