//! Checks that span several stored days: the weekly practice quota and the
//! tutorial-hell streak.

use std::collections::BTreeMap;
use chrono::{Duration, NaiveDate};
use serde::{Serialize, Deserialize};
use super::{DailyLogSubmission, ValidationPolicy};

/// A stored, already-accepted day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogRecord {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub submission: DailyLogSubmission,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_ending: NaiveDate,
    pub days_logged: usize,
    pub theory_hours: f64,
    pub hands_on_hours: f64,
    pub hands_on_percentage: f64,
    pub labs_completed: usize,
    pub tool_hours: f64,
    /// Items per week, averaged over the trailing two weeks.
    pub portfolio_rate: f64,
    pub meets_lab_quota: bool,
    pub meets_tool_quota: bool,
    pub meets_portfolio_quota: bool,
    pub meets_hands_on_share: bool,
    pub shortfalls: Vec<String>,
}

impl WeeklySummary {
    pub fn on_track(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

fn in_window(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    date >= start && date <= end
}

/// Summarize the seven days ending on `week_ending` against the weekly quota.
pub fn summarize_week(
    logs: &[DailyLogRecord],
    week_ending: NaiveDate,
    policy: &ValidationPolicy,
) -> WeeklySummary {
    let quota = &policy.weekly;
    let week_start = week_ending - Duration::days(6);
    let fortnight_start = week_ending - Duration::days(13);

    let week: Vec<&DailyLogRecord> = logs
        .iter()
        .filter(|r| in_window(r.date, week_start, week_ending))
        .collect();

    let theory_hours: f64 = week.iter().map(|r| r.submission.theory_hours).sum();
    let hands_on_hours: f64 = week.iter().map(|r| r.submission.hands_on_hours).sum();
    let labs_completed: usize = week.iter().map(|r| r.submission.labs_completed.len()).sum();
    let tool_hours: f64 = week.iter().map(|r| r.submission.tool_hours()).sum();
    let fortnight_items: usize = logs
        .iter()
        .filter(|r| in_window(r.date, fortnight_start, week_ending))
        .map(|r| r.submission.portfolio_items.len())
        .sum();
    let portfolio_rate = fortnight_items as f64 / 2.0;

    let total = theory_hours + hands_on_hours;
    let hands_on_percentage = if total > 0.0 { hands_on_hours / total * 100.0 } else { 0.0 };

    let meets_lab_quota = labs_completed >= quota.min_labs;
    let meets_tool_quota = tool_hours >= quota.min_tool_hours;
    let meets_portfolio_quota = portfolio_rate >= quota.min_portfolio_items;
    let meets_hands_on_share = hands_on_percentage >= policy.min_hands_on_percentage;

    let mut shortfalls = Vec::new();
    if !meets_lab_quota {
        shortfalls.push(format!(
            "Completed {} of {} labs this week",
            labs_completed, quota.min_labs
        ));
    }
    if !meets_tool_quota {
        shortfalls.push(format!(
            "Practiced tools for {:.1} of {:.1} hours this week",
            tool_hours, quota.min_tool_hours
        ));
    }
    if !meets_portfolio_quota {
        shortfalls.push(format!(
            "Created {} portfolio item(s) in two weeks, target is {:.0}",
            fortnight_items,
            (quota.min_portfolio_items * 2.0).ceil()
        ));
    }
    if !meets_hands_on_share {
        shortfalls.push(format!(
            "Hands-on share is {:.0}%, target is {:.0}%",
            hands_on_percentage, policy.min_hands_on_percentage
        ));
    }

    WeeklySummary {
        week_start,
        week_ending,
        days_logged: week.len(),
        theory_hours,
        hands_on_hours,
        hands_on_percentage,
        labs_completed,
        tool_hours,
        portfolio_rate,
        meets_lab_quota,
        meets_tool_quota,
        meets_portfolio_quota,
        meets_hands_on_share,
        shortfalls,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialHellStatus {
    pub streak_days: u32,
    pub alert: bool,
}

/// Length of the run of consecutive calendar days, ending at the most recent
/// log, whose theory share exceeds the threshold. Several logs on the same
/// date are merged first.
pub fn tutorial_hell_streak(logs: &[DailyLogRecord], policy: &ValidationPolicy) -> TutorialHellStatus {
    let threshold = &policy.tutorial_hell;

    let mut per_day: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for record in logs {
        let entry = per_day.entry(record.date).or_insert((0.0, 0.0));
        entry.0 += record.submission.theory_hours;
        entry.1 += record.submission.hands_on_hours;
    }

    let mut streak = 0u32;
    let mut expected: Option<NaiveDate> = None;
    for (date, (theory, hands_on)) in per_day.iter().rev() {
        if let Some(day) = expected {
            if *date != day {
                break;
            }
        }
        let total = theory + hands_on;
        if total <= 0.0 || theory / total * 100.0 <= threshold.theory_percentage {
            break;
        }
        streak += 1;
        expected = date.pred_opt();
    }

    TutorialHellStatus {
        streak_days: streak,
        alert: streak >= threshold.consecutive_days,
    }
}
