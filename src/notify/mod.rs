use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::skills::SkillDelta;

/// Things worth telling the learner about after a service call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ProgressEvent {
    #[serde(rename_all = "camelCase")]
    SkillsAdvanced { user: String, date: NaiveDate, deltas: Vec<SkillDelta> },
    #[serde(rename_all = "camelCase")]
    TasksRegenerated { user: String, phase_number: u32, task_count: usize },
    #[serde(rename_all = "camelCase")]
    TaskCompleted { user: String, task_id: String, title: String },
    #[serde(rename_all = "camelCase")]
    TutorialHellAlert { user: String, streak_days: u32 },
}

pub trait Notifier: Send + Sync {
    fn notify(&self, event: &ProgressEvent);
}

/// Writes events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::SkillsAdvanced { user, date, deltas } => {
                for delta in deltas {
                    tracing::info!(
                        user = %user,
                        date = %date,
                        skill = %delta.display_name,
                        before = ?delta.before,
                        after = delta.after,
                        "Skill advanced"
                    );
                }
            }
            ProgressEvent::TasksRegenerated { user, phase_number, task_count } => {
                tracing::info!(user = %user, phase_number, task_count, "New task batch ready");
            }
            ProgressEvent::TaskCompleted { user, task_id, title } => {
                tracing::info!(user = %user, task_id = %task_id, title = %title, "Task completed");
            }
            ProgressEvent::TutorialHellAlert { user, streak_days } => {
                tracing::warn!(user = %user, streak_days, "Theory-heavy streak, switch to hands-on work");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tag() {
        let event = ProgressEvent::TaskCompleted {
            user: "alice".into(),
            task_id: "manual-1".into(),
            title: "Write blog post".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "taskCompleted");
        assert_eq!(json["taskId"], "manual-1");
        TracingNotifier.notify(&event);
    }
}
