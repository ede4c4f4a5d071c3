//! Optional generative advice attached to a curriculum plan.
//!
//! Advice is opaque text. It never changes the deterministic plan, and a
//! provider failure never blocks plan generation.

pub mod extract;
pub mod ollama;

use std::collections::BTreeMap;
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use crate::curriculum::{CurriculumPlan, Goal};
use crate::error::TrackerError;

pub use ollama::OllamaAdvisor;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanAdvice {
    pub personalized_advice: String,
    /// Keyed by phase number.
    pub phase_recommendations: BTreeMap<u32, Vec<String>>,
}

#[async_trait]
pub trait AdviceProvider: Send + Sync {
    async fn advise(&self, goal: &Goal, plan: &CurriculumPlan) -> Result<PlanAdvice, TrackerError>;
}

/// Provider used when advice is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdvice;

#[async_trait]
impl AdviceProvider for NoAdvice {
    async fn advise(&self, _goal: &Goal, _plan: &CurriculumPlan) -> Result<PlanAdvice, TrackerError> {
        Err(TrackerError::new("Advice is disabled", "advice"))
    }
}

pub(crate) fn build_prompt(goal: &Goal, plan: &CurriculumPlan) -> String {
    let skills: Vec<&str> = goal.existing_skills.iter().map(String::as_str).collect();
    let mut prompt = format!(
        "You are a cybersecurity career advisor. A learner at {:?} level targets {:?}, \
         studies {} hours per week and already knows: {}.\n\nTheir plan:\n",
        goal.current_level,
        goal.target_tier,
        goal.hours_per_week,
        if skills.is_empty() { "nothing yet".to_string() } else { skills.join(", ") },
    );
    for phase in plan.phases() {
        prompt.push_str(&format!(
            "- Phase {} \"{}\" (weeks {}-{}): tools {}; labs {}\n",
            phase.phase_number,
            phase.phase_name,
            phase.start_week,
            phase.end_week,
            phase.tools.join(", "),
            phase.labs.join(", "),
        ));
    }
    prompt.push_str(
        "\nRespond with JSON only, in this shape:\n\
         {\"personalizedAdvice\": \"...\", \"phaseRecommendations\": {\"0\": [\"...\"]}}\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::{generate, CurrentLevel, TargetTier};

    #[test]
    fn prompt_lists_every_phase() {
        let mut goal = Goal::new(CurrentLevel::Beginner, TargetTier::Tier2, 10);
        goal.existing_skills.insert("Linux".to_string());
        let plan = generate(&goal);
        let prompt = build_prompt(&goal, &plan);
        assert!(prompt.contains("Phase 0"));
        assert!(prompt.contains("Phase 1"));
        assert!(prompt.contains("Phase 2"));
        assert!(!prompt.contains("Phase 3"));
        assert!(prompt.contains("Linux"));
    }

    #[test]
    fn advice_parses_numeric_phase_keys() {
        let advice: PlanAdvice = serde_json::from_str(
            r#"{"personalizedAdvice": "Keep going", "phaseRecommendations": {"1": ["Do Splunk BOTS"]}}"#,
        )
        .unwrap();
        assert_eq!(advice.phase_recommendations[&1], vec!["Do Splunk BOTS".to_string()]);
    }
}
