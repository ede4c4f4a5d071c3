//! Readiness detection: certification, first job, and tier advancement.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use chrono::{Duration, NaiveDate};
use serde::{Serialize, Deserialize};
use crate::skills::SkillMatrix;

/// Snapshot of a user's accumulated evidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    /// Mean skill proficiency on the 0..=10 scale.
    pub skills_matrix_avg: f64,
    pub phase0_complete: bool,
    pub portfolio_count: usize,
    pub verified_portfolio_count: usize,
    pub total_labs_completed: usize,
    pub total_tool_hours: f64,
    pub current_streak: u32,
}

impl UserProgress {
    /// Seed from a skill matrix; the caller fills in the remaining counts.
    pub fn from_matrix(matrix: &SkillMatrix) -> Self {
        Self {
            skills_matrix_avg: matrix.average_proficiency(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessThresholds {
    pub cert_min_avg: f64,
    pub job_min_verified_portfolio: usize,
    pub job_min_labs: usize,
    pub job_min_tool_hours: f64,
    pub tier_min_avg: f64,
    pub tier_min_verified_portfolio: usize,
    pub tier_min_streak: u32,
}

impl Default for ReadinessThresholds {
    fn default() -> Self {
        Self {
            cert_min_avg: 6.0,
            job_min_verified_portfolio: 5,
            job_min_labs: 30,
            job_min_tool_hours: 50.0,
            tier_min_avg: 8.0,
            tier_min_verified_portfolio: 10,
            tier_min_streak: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResult {
    pub cert_ready: bool,
    pub job_ready: bool,
    pub tier_advancement_ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_cert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_tier: Option<String>,
    pub blockers: Vec<String>,
    pub strengths: Vec<String>,
}

pub fn detect_readiness(progress: &UserProgress, t: &ReadinessThresholds) -> ReadinessResult {
    let mut result = ReadinessResult::default();

    if progress.skills_matrix_avg >= t.cert_min_avg && progress.phase0_complete {
        result.cert_ready = true;
        result.recommended_cert = Some("CompTIA Security+".to_string());
        result.strengths.push("Skills proficiency meets certification requirements".to_string());
    } else {
        if progress.skills_matrix_avg < t.cert_min_avg {
            result.blockers.push(format!(
                "Skills proficiency too low ({:.1}/10, need {:.1}+)",
                progress.skills_matrix_avg, t.cert_min_avg
            ));
        }
        if !progress.phase0_complete {
            result.blockers.push("Phase 0 foundation not complete".to_string());
        }
    }

    let portfolio_ok = progress.verified_portfolio_count >= t.job_min_verified_portfolio;
    let labs_ok = progress.total_labs_completed >= t.job_min_labs;
    let hours_ok = progress.total_tool_hours >= t.job_min_tool_hours;
    if portfolio_ok && labs_ok && hours_ok && progress.phase0_complete {
        result.job_ready = true;
        result.recommended_tier = Some("SOC Tier 1 Analyst".to_string());
        result.strengths.push("Portfolio demonstrates hands-on experience".to_string());
        result.strengths.push("Lab completion shows practical skills".to_string());
    } else {
        if !portfolio_ok {
            result.blockers.push(format!(
                "Need {} more verified portfolio items",
                t.job_min_verified_portfolio - progress.verified_portfolio_count
            ));
        }
        if !labs_ok {
            result.blockers.push(format!(
                "Need {} more labs completed",
                t.job_min_labs - progress.total_labs_completed
            ));
        }
        if !hours_ok {
            result.blockers.push(format!(
                "Need {:.1} more tool practice hours",
                t.job_min_tool_hours - progress.total_tool_hours
            ));
        }
    }

    if progress.skills_matrix_avg >= t.tier_min_avg
        && progress.verified_portfolio_count >= t.tier_min_verified_portfolio
        && progress.current_streak >= t.tier_min_streak
    {
        result.tier_advancement_ready = true;
        result.strengths.push(format!(
            "Consistent daily practice ({}+ day streak)",
            t.tier_min_streak
        ));
        result.strengths.push("Advanced skills proficiency".to_string());
    }

    tracing::debug!(
        cert_ready = result.cert_ready,
        job_ready = result.job_ready,
        tier_ready = result.tier_advancement_ready,
        blockers = result.blockers.len(),
        "Readiness evaluated"
    );
    result
}

/// Consecutive logged days ending today, or yesterday when today has no log
/// yet.
pub fn practice_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut cursor = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

pub fn readiness_report(result: &ReadinessResult) -> String {
    let mut report = String::from("# Readiness Assessment\n\n");

    match (result.cert_ready, result.recommended_cert.as_deref()) {
        (true, Some(cert)) => { let _ = writeln!(report, "- [x] **Certification Ready**: {}\n", cert); }
        _ => report.push_str("- [ ] **Not Certification Ready**\n\n"),
    }
    match (result.job_ready, result.recommended_tier.as_deref()) {
        (true, Some(tier)) => { let _ = writeln!(report, "- [x] **Job Ready**: {}\n", tier); }
        _ => report.push_str("- [ ] **Not Job Ready**\n\n"),
    }

    if !result.blockers.is_empty() {
        report.push_str("## Blockers\n");
        for blocker in &result.blockers {
            let _ = writeln!(report, "- {}", blocker);
        }
        report.push('\n');
    }
    if !result.strengths.is_empty() {
        report.push_str("## Strengths\n");
        for strength in &result.strengths {
            let _ = writeln!(report, "- {}", strength);
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn fresh_user_is_blocked_everywhere() {
        let result = detect_readiness(&UserProgress::default(), &ReadinessThresholds::default());
        assert!(!result.cert_ready && !result.job_ready && !result.tier_advancement_ready);
        assert!(result.blockers.iter().any(|b| b.contains("Phase 0")));
        assert!(result.blockers.iter().any(|b| b.contains("Need 30 more labs")));
    }

    #[test]
    fn job_ready_candidate() {
        let progress = UserProgress {
            skills_matrix_avg: 6.5,
            phase0_complete: true,
            portfolio_count: 6,
            verified_portfolio_count: 5,
            total_labs_completed: 31,
            total_tool_hours: 52.0,
            current_streak: 12,
        };
        let result = detect_readiness(&progress, &ReadinessThresholds::default());
        assert!(result.cert_ready && result.job_ready);
        assert!(!result.tier_advancement_ready);
        assert!(result.blockers.is_empty());
        let report = readiness_report(&result);
        assert!(report.contains("CompTIA Security+"));
        assert!(report.contains("SOC Tier 1 Analyst"));
        assert!(!report.contains("## Blockers"));
    }

    #[test]
    fn streak_tolerates_missing_today() {
        let days: BTreeSet<_> = [day(1), day(3), day(4), day(5)].into_iter().collect();
        assert_eq!(practice_streak(&days, day(5)), 3);
        assert_eq!(practice_streak(&days, day(6)), 3);
        assert_eq!(practice_streak(&days, day(7)), 0);
    }
}
