use std::collections::{BTreeMap, BTreeSet};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Deserialize};

pub const MAX_PROFICIENCY: f64 = 10.0;
pub const MIN_PROFICIENCY: f64 = 0.0;
pub const DEFAULT_CATEGORY: &str = "tools";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    pub display_name: String,
    pub category: String,
    pub proficiency: f64,
    pub evidence_dates: Vec<NaiveDate>,
    pub last_updated: DateTime<Utc>,
}

/// Skill records keyed by [`normalize_key`].
pub type SkillMap = BTreeMap<String, SkillRecord>;

/// Lower-case the name and drop everything that is not alphanumeric.
/// "Nmap", "nmap " and "N-map" all land on `nmap`.
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A user's skill map plus the activity dates already credited to it.
///
/// The date set is the idempotency key for [`SkillMatrix::apply_once`]: the
/// matrix belongs to one user, so (user, date) reduces to the date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatrix {
    #[serde(default)]
    pub skills: SkillMap,
    #[serde(default)]
    pub applied_days: BTreeSet<NaiveDate>,
}

impl SkillMatrix {
    pub fn get(&self, name: &str) -> Option<&SkillRecord> {
        self.skills.get(&normalize_key(name))
    }

    pub fn has_applied(&self, date: NaiveDate) -> bool {
        self.applied_days.contains(&date)
    }

    /// Mean proficiency over all tracked skills, 0 when there are none.
    pub fn average_proficiency(&self) -> f64 {
        if self.skills.is_empty() {
            return 0.0;
        }
        self.skills.values().map(|r| r.proficiency).sum::<f64>() / self.skills.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_strips_and_lowercases() {
        assert_eq!(normalize_key("Nmap"), "nmap");
        assert_eq!(normalize_key("IDA Pro / Ghidra"), "idaproghidra");
        assert_eq!(normalize_key("TryHackMe: SOC Level 1"), "tryhackmesoclevel1");
        assert_eq!(normalize_key("--"), "");
    }

    #[test]
    fn average_of_empty_matrix_is_zero() {
        assert_eq!(SkillMatrix::default().average_proficiency(), 0.0);
    }
}
