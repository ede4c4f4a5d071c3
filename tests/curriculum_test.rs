use chrono::NaiveDate;
use serde_json::json;
use skillgate_lib::curriculum::{elapsed_weeks, CurrentLevel, CurriculumPlan, Goal, TargetTier};
use skillgate_lib::generate_curriculum_plan;

fn goal(value: serde_json::Value) -> Goal {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_tier2_goal_yields_three_phases() {
    let plan = generate_curriculum_plan(&goal(json!({
        "currentLevel": "beginner",
        "targetTier": "tier2",
        "hoursPerWeek": 10
    })));
    let weeks: Vec<(u32, u32)> = plan.phases().iter().map(|p| (p.start_week, p.end_week)).collect();
    assert_eq!(weeks, vec![(1, 12), (13, 24), (25, 36)]);
    assert_eq!(plan.phases()[0].phase_number, 0);
    assert!(plan.phases().iter().all(|p| p.weekly_hours == 10.0));
}

#[test]
fn test_unknown_tier_gets_foundation_only() {
    let g = goal(json!({"currentLevel": "beginner", "targetTier": "ciso", "hoursPerWeek": 5}));
    assert_eq!(g.target_tier, TargetTier::Unrecognized);
    assert_eq!(generate_curriculum_plan(&g).len(), 1);
    assert!(g.check().is_err());
}

#[test]
fn test_generation_is_deterministic() {
    let g = Goal::new(CurrentLevel::Advanced, TargetTier::Tier3, 20);
    assert_eq!(generate_curriculum_plan(&g), generate_curriculum_plan(&g));
    assert_eq!(g.fingerprint(), g.clone().fingerprint());
}

#[test]
fn test_fingerprint_tracks_existing_skills() {
    let a = Goal::new(CurrentLevel::Beginner, TargetTier::Tier1, 8);
    let mut b = a.clone();
    b.existing_skills.insert("Python".to_string());
    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn test_active_phase_follows_elapsed_weeks() {
    let plan = generate_curriculum_plan(&Goal::new(CurrentLevel::Beginner, TargetTier::Tier3, 10));
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let today = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    assert_eq!(plan.active_phase(elapsed_weeks(start, today)).phase_number, 0);

    // 13 weeks in
    let today = start + chrono::Duration::weeks(13);
    assert_eq!(plan.active_phase(elapsed_weeks(start, today)).phase_number, 1);

    // Past the end of the plan
    assert_eq!(plan.active_phase(500).phase_number, 0);
    // Before the start date
    assert_eq!(elapsed_weeks(start, start - chrono::Duration::days(30)), 0);
}

#[test]
fn test_plan_completion_date() {
    let plan = generate_curriculum_plan(&Goal::new(CurrentLevel::Beginner, TargetTier::Tier1, 10));
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(plan.total_weeks(), 24);
    assert_eq!(plan.estimated_completion(start), start + chrono::Duration::weeks(24));
}

#[test]
fn test_malformed_plan_is_rejected_on_load() {
    let plan = generate_curriculum_plan(&Goal::new(CurrentLevel::Beginner, TargetTier::Tier2, 10));
    let mut value = serde_json::to_value(&plan).unwrap();
    value["phases"][1]["startWeek"] = json!(20);
    assert!(serde_json::from_value::<CurriculumPlan>(value).is_err());

    assert!(serde_json::from_value::<CurriculumPlan>(json!({"phases": []})).is_err());
}
