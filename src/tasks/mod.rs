//! Task list derived from the active curriculum phase.
//!
//! Auto tasks belong to the generator and are replaced as a batch once every
//! one of them is done. Manual tasks belong to the user and are never
//! removed or reordered here.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::curriculum::{CurriculumPlan, Phase};

const MAX_LAB_TASKS: usize = 3;
const MAX_TOOL_TASKS: usize = 2;
const MAX_THEORY_TASKS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Lab,
    Tool,
    Theory,
    Portfolio,
    Certification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSource {
    Auto,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: Category,
    pub source: TaskSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_number: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// A user-authored task.
    pub fn manual(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        category: Category,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("manual-{}", now.timestamp_millis()),
            title: title.into(),
            description: description.into(),
            completed: false,
            priority,
            category,
            source: TaskSource::Manual,
            phase_number: None,
            created_at: now,
        }
    }

    pub fn is_auto(&self) -> bool {
        self.source == TaskSource::Auto
    }

    fn auto(
        id: String,
        title: String,
        description: String,
        priority: Priority,
        category: Category,
        phase: &Phase,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            completed: false,
            priority,
            category,
            source: TaskSource::Auto,
            phase_number: Some(phase.phase_number),
            created_at: now,
        }
    }
}

/// Derive the auto task batch for a phase.
pub fn derive_tasks(phase: &Phase) -> Vec<Task> {
    derive_tasks_at(phase, Utc::now())
}

/// [`derive_tasks`] with an explicit creation time, which also seeds the ids.
pub fn derive_tasks_at(phase: &Phase, now: DateTime<Utc>) -> Vec<Task> {
    let stamp = now.timestamp_millis();
    let mut tasks = Vec::new();

    for (i, lab) in phase.labs.iter().take(MAX_LAB_TASKS).enumerate() {
        tasks.push(Task::auto(
            format!("auto-lab-{}-{}", i, stamp),
            format!("Complete Lab: {}", lab),
            "Complete this lab and write a detailed writeup with screenshots".to_string(),
            Priority::High,
            Category::Lab,
            phase,
            now,
        ));
    }

    for (i, tool) in phase.tools.iter().take(MAX_TOOL_TASKS).enumerate() {
        tasks.push(Task::auto(
            format!("auto-tool-{}-{}", i, stamp),
            format!("Practice with {}", tool),
            format!("Spend at least 2 hours practicing with {} and document your work", tool),
            Priority::Medium,
            Category::Tool,
            phase,
            now,
        ));
    }

    for (i, skill) in phase.skills.iter().take(MAX_THEORY_TASKS).enumerate() {
        tasks.push(Task::auto(
            format!("auto-skill-{}-{}", i, stamp),
            format!("Learn: {}", skill),
            format!("Study {} and complete related exercises", skill),
            Priority::Medium,
            Category::Theory,
            phase,
            now,
        ));
    }

    if let Some(cert) = phase.certifications.first() {
        tasks.push(Task::auto(
            format!("auto-cert-{}", stamp),
            format!("Prepare for {}", cert),
            "Study for the certification exam and complete practice tests".to_string(),
            Priority::High,
            Category::Certification,
            phase,
            now,
        ));
    }

    tasks
}

/// True iff there is at least one auto task and every auto task is done.
/// Manual tasks never take part in the decision.
pub fn should_regenerate(tasks: &[Task]) -> bool {
    let mut autos = tasks.iter().filter(|t| t.is_auto()).peekable();
    autos.peek().is_some() && autos.all(|t| t.completed)
}

/// Replace the auto batch with a fresh derivation from the phase active at
/// `elapsed_weeks`. Manual tasks are kept as they are, in their order.
pub fn regenerate_tasks(
    tasks: &[Task],
    plan: &CurriculumPlan,
    elapsed_weeks: u32,
    now: DateTime<Utc>,
) -> Vec<Task> {
    let phase = plan.active_phase(elapsed_weeks);
    let mut next: Vec<Task> = tasks.iter().filter(|t| !t.is_auto()).cloned().collect();
    let fresh = derive_tasks_at(phase, now);
    tracing::info!(
        phase_number = phase.phase_number,
        kept_manual = next.len(),
        generated = fresh.len(),
        "Regenerated task batch"
    );
    next.extend(fresh);
    next
}

/// Flip a task's completion flag. Returns the new state, or `None` when no
/// task has that id.
pub fn toggle_task(tasks: &mut [Task], id: &str) -> Option<bool> {
    let task = tasks.iter_mut().find(|t| t.id == id)?;
    task.completed = !task.completed;
    Some(task.completed)
}
