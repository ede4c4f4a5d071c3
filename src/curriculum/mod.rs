pub mod table;

use std::collections::BTreeSet;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};
use crate::error::ShapeError;
use self::table::PhaseSlot;

/// Where the learner says they are today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentLevel {
    Beginner,
    Intermediate,
    Advanced,
    #[serde(other)]
    Unrecognized,
}

/// The role the learner is aiming for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetTier {
    Tier1,
    Tier2,
    Tier3,
    Specialist,
    #[serde(other)]
    Unrecognized,
}

impl TargetTier {
    /// Position on the SOC ladder. Tiers off the ladder rank zero and only
    /// unlock the foundation phase.
    pub fn rank(self) -> u8 {
        match self {
            TargetTier::Tier1 => 1,
            TargetTier::Tier2 => 2,
            TargetTier::Tier3 => 3,
            TargetTier::Specialist | TargetTier::Unrecognized => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub current_level: CurrentLevel,
    pub target_tier: TargetTier,
    pub hours_per_week: u32,
    #[serde(default)]
    pub existing_skills: BTreeSet<String>,
}

impl Goal {
    pub fn new(current_level: CurrentLevel, target_tier: TargetTier, hours_per_week: u32) -> Self {
        Self {
            current_level,
            target_tier,
            hours_per_week,
            existing_skills: BTreeSet::new(),
        }
    }

    /// Boundary check for goals coming from user input.
    pub fn check(&self) -> Result<(), ShapeError> {
        if !(1..=100).contains(&self.hours_per_week) {
            return Err(ShapeError::goal("hoursPerWeek", "must be between 1 and 100"));
        }
        if self.current_level == CurrentLevel::Unrecognized {
            return Err(ShapeError::goal(
                "currentLevel",
                "must be beginner, intermediate, or advanced",
            ));
        }
        if self.target_tier == TargetTier::Unrecognized {
            return Err(ShapeError::goal(
                "targetTier",
                "must be tier1, tier2, tier3, or specialist",
            ));
        }
        Ok(())
    }

    /// Stable hex digest of the goal, used as a cache key.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}|{:?}|{}", self.current_level, self.target_tier, self.hours_per_week));
        for skill in &self.existing_skills {
            hasher.update(b"|");
            hasher.update(skill.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub phase_number: u32,
    pub phase_name: String,
    pub start_week: u32,
    pub end_week: u32,
    pub skills: Vec<String>,
    pub tools: Vec<String>,
    pub labs: Vec<String>,
    pub certifications: Vec<String>,
    pub weekly_hours: f64,
}

impl Phase {
    pub fn contains_week(&self, week: u32) -> bool {
        week >= self.start_week && week <= self.end_week
    }
}

#[derive(Deserialize)]
struct RawPlan {
    phases: Vec<Phase>,
}

impl TryFrom<RawPlan> for CurriculumPlan {
    type Error = ShapeError;

    fn try_from(raw: RawPlan) -> Result<Self, Self::Error> {
        CurriculumPlan::from_phases(raw.phases)
    }
}

/// Ordered, non-empty list of phases covering contiguous weeks from week 1.
///
/// Deserialization goes through [`CurriculumPlan::from_phases`], so a plan
/// loaded from a store is held to the same shape as a generated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPlan")]
pub struct CurriculumPlan {
    phases: Vec<Phase>,
}

impl CurriculumPlan {
    pub fn from_phases(phases: Vec<Phase>) -> Result<Self, ShapeError> {
        if phases.is_empty() {
            return Err(ShapeError::plan("plan has no phases"));
        }
        let mut expected_start = 1;
        let mut previous_number: Option<u32> = None;
        for phase in &phases {
            if let Some(prev) = previous_number {
                if phase.phase_number <= prev {
                    return Err(ShapeError::plan(format!(
                        "phase number {} does not increase after {}",
                        phase.phase_number, prev
                    )));
                }
            }
            if phase.start_week > phase.end_week {
                return Err(ShapeError::plan(format!(
                    "phase {} ends (week {}) before it starts (week {})",
                    phase.phase_number, phase.end_week, phase.start_week
                )));
            }
            if phase.start_week != expected_start {
                return Err(ShapeError::plan(format!(
                    "phase {} starts at week {}, expected week {}",
                    phase.phase_number, phase.start_week, expected_start
                )));
            }
            expected_start = phase.end_week + 1;
            previous_number = Some(phase.phase_number);
        }
        Ok(Self { phases })
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn last_phase(&self) -> &Phase {
        // non-empty by construction
        &self.phases[self.phases.len() - 1]
    }

    /// The phase whose week range contains `elapsed_weeks`, or the first
    /// phase when none does.
    pub fn active_phase(&self, elapsed_weeks: u32) -> &Phase {
        self.phases
            .iter()
            .find(|p| p.contains_week(elapsed_weeks))
            .unwrap_or(&self.phases[0])
    }

    pub fn total_weeks(&self) -> u32 {
        self.last_phase().end_week
    }

    /// Date the last phase ends when starting from `from`.
    pub fn estimated_completion(&self, from: NaiveDate) -> NaiveDate {
        from + Duration::days(i64::from(self.total_weeks()) * 7)
    }
}

/// Build the curriculum for a goal: the foundation phase always, then every
/// ladder slot the target tier unlocks.
pub fn generate(goal: &Goal) -> CurriculumPlan {
    let weekly_hours = f64::from(goal.hours_per_week);
    let phases: Vec<Phase> = PhaseSlot::LADDER
        .iter()
        .filter(|slot| slot.unlocked_by(goal.target_tier))
        .map(|slot| slot.build(weekly_hours))
        .collect();

    tracing::debug!(
        target_tier = ?goal.target_tier,
        phase_count = phases.len(),
        "Generated curriculum plan"
    );

    CurriculumPlan { phases }
}

/// Estimated completion counted from today.
pub fn estimated_completion(plan: &CurriculumPlan) -> NaiveDate {
    plan.estimated_completion(Utc::now().date_naive())
}

/// Whole weeks between the plan start and `today`, never negative.
pub fn elapsed_weeks(start: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - start).num_days().max(0);
    u32::try_from(days / 7).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(tier: TargetTier) -> Goal {
        Goal::new(CurrentLevel::Beginner, tier, 10)
    }

    #[test]
    fn tier2_goal_yields_three_contiguous_phases() {
        let plan = generate(&goal(TargetTier::Tier2));
        let weeks: Vec<_> = plan.phases().iter().map(|p| (p.start_week, p.end_week)).collect();
        assert_eq!(weeks, vec![(1, 12), (13, 24), (25, 36)]);
        assert!(plan.phases()[0].phase_name.starts_with("Foundation"));
        assert!(plan.phases().iter().all(|p| p.weekly_hours == 10.0));
    }

    #[test]
    fn specialist_gets_foundation_only() {
        let plan = generate(&goal(TargetTier::Specialist));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.phases()[0].phase_number, 0);
    }

    #[test]
    fn tier3_reaches_week_48() {
        let plan = generate(&goal(TargetTier::Tier3));
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.total_weeks(), 48);
    }

    #[test]
    fn active_phase_defaults_to_first_outside_any_range() {
        let plan = generate(&goal(TargetTier::Tier1));
        assert_eq!(plan.active_phase(0).phase_number, 0);
        assert_eq!(plan.active_phase(5).phase_number, 0);
        assert_eq!(plan.active_phase(13).phase_number, 1);
        assert_eq!(plan.active_phase(99).phase_number, 0);
    }

    #[test]
    fn estimated_completion_adds_total_weeks() {
        let plan = generate(&goal(TargetTier::Tier1));
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(plan.estimated_completion(start), start + Duration::days(24 * 7));
    }

    #[test]
    fn elapsed_weeks_floors_and_clamps() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(elapsed_weeks(start, start), 0);
        assert_eq!(elapsed_weeks(start, start + Duration::days(13)), 1);
        assert_eq!(elapsed_weeks(start, start + Duration::days(14)), 2);
        assert_eq!(elapsed_weeks(start, start - Duration::days(30)), 0);
    }

    #[test]
    fn from_phases_rejects_gaps_and_disorder() {
        let plan = generate(&goal(TargetTier::Tier2));
        let mut phases = plan.phases().to_vec();
        phases[1].start_week = 14;
        assert!(matches!(
            CurriculumPlan::from_phases(phases),
            Err(ShapeError::MalformedPlan { .. })
        ));

        let mut phases = plan.phases().to_vec();
        phases.swap(0, 1);
        assert!(CurriculumPlan::from_phases(phases).is_err());

        assert!(CurriculumPlan::from_phases(Vec::new()).is_err());
    }

    #[test]
    fn plan_round_trips_through_json_shape_check() {
        let plan = generate(&goal(TargetTier::Tier3));
        let json = serde_json::to_string(&plan).unwrap();
        let back: CurriculumPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, back);

        let broken = r#"{"phases": []}"#;
        assert!(serde_json::from_str::<CurriculumPlan>(broken).is_err());
    }

    #[test]
    fn goal_check_enforces_boundaries() {
        assert!(goal(TargetTier::Tier1).check().is_ok());
        let mut g = goal(TargetTier::Tier1);
        g.hours_per_week = 0;
        assert!(g.check().is_err());
        let g: Goal = serde_json::from_str(
            r#"{"currentLevel":"beginner","targetTier":"ciso","hoursPerWeek":5}"#,
        ).unwrap();
        assert_eq!(g.target_tier, TargetTier::Unrecognized);
        assert!(g.check().is_err());
        assert_eq!(generate(&g).len(), 1);
    }
}
