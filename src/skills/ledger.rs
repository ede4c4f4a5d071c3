//! Skill proficiency ledger: a monotone, saturating accumulator over
//! accepted practice.
//!
//! Each reference to a tool or lab name either creates a record at
//! proficiency 1 or adds 0.5 to the existing one, capped at 10. There is no
//! decay. [`apply`] does not deduplicate: crediting the same day twice
//! double-counts, so callers either serialize updates per user or go through
//! [`SkillMatrix::apply_once`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Deserialize};
use crate::validation::AcceptedSubmission;
use super::model::{
    normalize_key, SkillMap, SkillMatrix, SkillRecord, DEFAULT_CATEGORY, MAX_PROFICIENCY,
    MIN_PROFICIENCY,
};

pub const INITIAL_PROFICIENCY: f64 = 1.0;
pub const PROFICIENCY_STEP: f64 = 0.5;

/// Before/after view of one skill touched by an update, for notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDelta {
    pub key: String,
    pub display_name: String,
    pub before: Option<f64>,
    pub after: f64,
}

/// Credit every name in `activity_names` on `activity_date`.
pub fn apply(current: &SkillMap, activity_names: &[String], activity_date: NaiveDate) -> SkillMap {
    apply_at(current, activity_names, activity_date, Utc::now())
}

/// [`apply`] with an explicit `lastUpdated` timestamp.
pub fn apply_at(
    current: &SkillMap,
    activity_names: &[String],
    activity_date: NaiveDate,
    now: DateTime<Utc>,
) -> SkillMap {
    let mut next = current.clone();
    credit(&mut next, activity_names, activity_date, now);
    next
}

/// Credit the activities of a submission that passed the daily gate.
pub fn apply_accepted(
    current: &SkillMap,
    accepted: &AcceptedSubmission,
    activity_date: NaiveDate,
    now: DateTime<Utc>,
) -> SkillMap {
    apply_at(current, &accepted.activity_names(), activity_date, now)
}

/// Explicit correction; the only path that may lower a proficiency.
/// Returns false when the key is unknown.
pub fn correct_proficiency(map: &mut SkillMap, name: &str, proficiency: f64, now: DateTime<Utc>) -> bool {
    let Some(record) = map.get_mut(&normalize_key(name)) else {
        return false;
    };
    let clamped = if proficiency.is_finite() {
        proficiency.clamp(MIN_PROFICIENCY, MAX_PROFICIENCY)
    } else {
        MIN_PROFICIENCY
    };
    tracing::info!(
        skill = %record.display_name,
        from = record.proficiency,
        to = clamped,
        "Proficiency corrected"
    );
    record.proficiency = clamped;
    record.last_updated = now;
    true
}

fn credit(
    map: &mut SkillMap,
    activity_names: &[String],
    activity_date: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<SkillDelta> {
    let mut deltas: Vec<SkillDelta> = Vec::new();
    for name in activity_names {
        let key = normalize_key(name);
        if key.is_empty() {
            tracing::debug!(name = %name, "Skipping activity with no alphanumeric characters");
            continue;
        }

        let before = map.get(&key).map(|r| r.proficiency);
        let record = map
            .entry(key.clone())
            .and_modify(|r| {
                r.proficiency = (r.proficiency + PROFICIENCY_STEP).min(MAX_PROFICIENCY);
                r.evidence_dates.push(activity_date);
                r.last_updated = now;
            })
            .or_insert_with(|| SkillRecord {
                display_name: name.trim().to_string(),
                category: DEFAULT_CATEGORY.to_string(),
                proficiency: INITIAL_PROFICIENCY,
                evidence_dates: vec![activity_date],
                last_updated: now,
            });

        // A name repeated in one batch folds into a single delta.
        match deltas.iter_mut().find(|d| d.key == key) {
            Some(delta) => delta.after = record.proficiency,
            None => deltas.push(SkillDelta {
                key,
                display_name: record.display_name.clone(),
                before,
                after: record.proficiency,
            }),
        }
    }
    deltas
}

impl SkillMatrix {
    /// Credit a day at most once. Returns `None` when `activity_date` was
    /// already applied, otherwise the per-skill changes.
    ///
    /// A batch with no usable names (a theory-only day) credits nothing and
    /// leaves the date open for a later session on the same day.
    pub fn apply_once(
        &mut self,
        activity_names: &[String],
        activity_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Option<Vec<SkillDelta>> {
        if self.applied_days.contains(&activity_date) {
            tracing::warn!(date = %activity_date, "Day already credited, skipping skill update");
            return None;
        }
        let deltas = credit(&mut self.skills, activity_names, activity_date, now);
        if !deltas.is_empty() {
            self.applied_days.insert(activity_date);
        }
        Some(deltas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn repeated_practice_accumulates() {
        let map = apply(&SkillMap::new(), &names(&["Nmap"]), date(1));
        let map = apply(&map, &names(&["Nmap"]), date(2));
        let nmap = &map["nmap"];
        assert_eq!(nmap.proficiency, 1.5);
        assert_eq!(nmap.evidence_dates, vec![date(1), date(2)]);
        assert_eq!(nmap.category, "tools");
        assert_eq!(nmap.display_name, "Nmap");
    }

    #[test]
    fn proficiency_saturates_at_ten() {
        let mut map = SkillMap::new();
        for d in 1..=30 {
            map = apply(&map, &names(&["Wireshark"]), date(d));
        }
        assert_eq!(map["wireshark"].proficiency, MAX_PROFICIENCY);
        assert_eq!(map["wireshark"].evidence_dates.len(), 30);
    }

    #[test]
    fn name_variants_share_a_record() {
        let map = apply(&SkillMap::new(), &names(&["Splunk Free", "splunk-free"]), date(3));
        assert_eq!(map.len(), 1);
        assert_eq!(map["splunkfree"].proficiency, 1.5);
    }

    #[test]
    fn input_map_is_not_mutated() {
        let base = apply(&SkillMap::new(), &names(&["Yara"]), date(1));
        let _ = apply(&base, &names(&["Yara"]), date(2));
        assert_eq!(base["yara"].proficiency, 1.0);
    }

    #[test]
    fn apply_once_skips_credited_days() {
        let mut matrix = SkillMatrix::default();
        let now = Utc::now();
        let first = matrix.apply_once(&names(&["Nmap", "Nmap"]), date(1), now).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].before, None);
        assert_eq!(first[0].after, 1.5);

        assert!(matrix.apply_once(&names(&["Nmap"]), date(1), now).is_none());
        assert_eq!(matrix.get("nmap").unwrap().proficiency, 1.5);
    }

    #[test]
    fn empty_batch_leaves_the_day_open() {
        let mut matrix = SkillMatrix::default();
        let now = Utc::now();
        assert_eq!(matrix.apply_once(&[], date(3), now), Some(Vec::new()));
        assert_eq!(matrix.apply_once(&names(&["--"]), date(3), now), Some(Vec::new()));
        assert!(!matrix.has_applied(date(3)));

        let deltas = matrix.apply_once(&names(&["Nmap"]), date(3), now).unwrap();
        assert_eq!(deltas.len(), 1);
        assert!(matrix.has_applied(date(3)));
        assert!(matrix.apply_once(&names(&["Nmap"]), date(3), now).is_none());
    }

    #[test]
    fn correction_clamps_and_may_lower() {
        let mut map = apply(&SkillMap::new(), &names(&["Zeek (Bro)"]), date(1));
        assert!(correct_proficiency(&mut map, "Zeek (Bro)", 42.0, Utc::now()));
        assert_eq!(map["zeekbro"].proficiency, 10.0);
        assert!(correct_proficiency(&mut map, "zeekbro", 0.25, Utc::now()));
        assert_eq!(map["zeekbro"].proficiency, 0.25);
        assert!(!correct_proficiency(&mut map, "unknown", 3.0, Utc::now()));
    }
}
