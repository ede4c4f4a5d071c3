//! Portfolio verification: whether published work items count as evidence
//! toward job readiness, and how good they are.

use serde::{Serialize, Deserialize};
use crate::validation::evidence::{count_words, is_github_repo_url};
use crate::validation::PortfolioEntry;

pub const MIN_PORTFOLIO_WORDS: usize = 300;
/// Content longer than this many characters counts as a writeup.
pub const MIN_WRITEUP_CHARS: usize = 100;
pub const JOB_READY_ITEMS: usize = 5;
pub const JOB_READY_SCORE: u32 = 70;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioItem {
    pub id: String,
    pub title: String,
    pub github_url: Option<String>,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub skills: Vec<String>,
}

/// A portfolio entry from a daily log, before tags and skills are added.
impl From<&PortfolioEntry> for PortfolioItem {
    fn from(entry: &PortfolioEntry) -> Self {
        PortfolioItem {
            id: entry.github_url.clone().unwrap_or_default(),
            title: entry.kind.clone(),
            github_url: entry.github_url.clone(),
            content: entry.content.clone(),
            ..PortfolioItem::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioChecks {
    pub has_github_link: bool,
    /// Assumed for any valid repository link; no remote lookup is made.
    pub is_public: bool,
    pub has_readme: bool,
    pub has_writeup: bool,
    pub word_count: usize,
    pub meets_minimum_words: bool,
    pub all_checks_passed: bool,
}

impl PortfolioChecks {
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.has_github_link {
            issues.push("Missing valid GitHub URL".to_string());
        }
        if !self.is_public {
            issues.push("Repository is not public".to_string());
        }
        if !self.has_readme && !self.has_writeup {
            issues.push("Missing README or writeup content".to_string());
        }
        if !self.meets_minimum_words {
            issues.push(format!(
                "Writeup too short ({}/{} words)",
                self.word_count, MIN_PORTFOLIO_WORDS
            ));
        }
        issues
    }
}

pub fn verify_item(item: &PortfolioItem) -> PortfolioChecks {
    let has_github_link = item.github_url.as_deref().is_some_and(is_github_repo_url);
    let content = item.content.as_deref().unwrap_or_default();
    let word_count = count_words(content);

    let mut checks = PortfolioChecks {
        has_github_link,
        is_public: has_github_link,
        has_readme: has_github_link,
        has_writeup: content.chars().count() > MIN_WRITEUP_CHARS,
        word_count,
        meets_minimum_words: word_count >= MIN_PORTFOLIO_WORDS,
        all_checks_passed: false,
    };
    checks.all_checks_passed = checks.has_github_link
        && checks.is_public
        && (checks.has_readme || checks.has_writeup)
        && checks.meets_minimum_words;
    checks
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedItem {
    pub item: PortfolioItem,
    pub issues: Vec<String>,
    pub checks: PortfolioChecks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioVerification {
    pub verified: Vec<PortfolioItem>,
    pub failed: Vec<FailedItem>,
}

impl PortfolioVerification {
    pub fn count(&self) -> usize {
        self.verified.len()
    }
}

pub fn verify_items(items: &[PortfolioItem]) -> PortfolioVerification {
    let mut result = PortfolioVerification::default();
    for item in items {
        let checks = verify_item(item);
        if checks.all_checks_passed {
            result.verified.push(item.clone());
        } else {
            result.failed.push(FailedItem {
                item: item.clone(),
                issues: checks.issues(),
                checks,
            });
        }
    }
    result
}

/// 0..=100: link 25, words up to 50, tags 10, skills 15.
pub fn quality_score(item: &PortfolioItem) -> u32 {
    let mut score = 0;
    if item.github_url.as_deref().is_some_and(is_github_repo_url) {
        score += 25;
    }
    if let Some(content) = item.content.as_deref() {
        let words = count_words(content);
        if words >= MIN_PORTFOLIO_WORDS {
            score += 30;
        } else if words >= 150 {
            score += 15;
        }
        if words >= 500 {
            score += 10;
        }
        if words >= 1000 {
            score += 10;
        }
    }
    if item.tags.len() >= 3 {
        score += 10;
    }
    if item.skills.len() >= 3 {
        score += 15;
    }
    score.min(100)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioQualityReport {
    pub total_items: usize,
    pub verified_items: usize,
    pub average_quality_score: u32,
    pub ready_for_job_applications: bool,
    pub recommendations: Vec<String>,
}

pub fn quality_report(items: &[PortfolioItem]) -> PortfolioQualityReport {
    let verification = verify_items(items);
    let average_quality_score = if items.is_empty() {
        0
    } else {
        let total: u32 = items.iter().map(quality_score).sum();
        (f64::from(total) / items.len() as f64).round() as u32
    };

    let mut recommendations = Vec::new();
    if verification.count() < JOB_READY_ITEMS {
        recommendations.push(format!(
            "Create {} more portfolio items to meet the job readiness requirement",
            JOB_READY_ITEMS - verification.count()
        ));
    }
    if !verification.failed.is_empty() {
        recommendations.push(format!(
            "Fix {} portfolio items that don't meet quality standards",
            verification.failed.len()
        ));
    }
    if average_quality_score < JOB_READY_SCORE {
        recommendations.push(
            "Improve writeup quality: add more details, screenshots, and technical depth".to_string(),
        );
    }

    PortfolioQualityReport {
        total_items: items.len(),
        verified_items: verification.count(),
        average_quality_score,
        ready_for_job_applications: verification.count() >= JOB_READY_ITEMS
            && average_quality_score >= JOB_READY_SCORE,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(words: usize) -> PortfolioItem {
        PortfolioItem {
            id: "p1".into(),
            title: "Phishing triage".into(),
            github_url: Some("https://github.com/alice/phishing-triage".into()),
            content: Some(vec!["alert"; words].join(" ")),
            tags: vec!["soc".into(), "email".into(), "triage".into()],
            skills: vec!["Splunk".into(), "MITRE ATT&CK".into(), "YARA".into()],
        }
    }

    #[test]
    fn complete_item_verifies() {
        let checks = verify_item(&item(320));
        assert!(checks.all_checks_passed);
        assert!(checks.issues().is_empty());
    }

    #[test]
    fn short_item_without_link_lists_issues() {
        let mut short = item(40);
        short.github_url = Some("https://example.com/x".into());
        let checks = verify_item(&short);
        assert!(!checks.all_checks_passed);
        let issues = checks.issues();
        assert!(issues.iter().any(|i| i.contains("GitHub")));
        assert!(issues.iter().any(|i| i.contains("40/300")));
    }

    #[test]
    fn quality_score_bands() {
        assert_eq!(quality_score(&item(1200)), 100);
        assert_eq!(quality_score(&item(320)), 80);
        assert_eq!(quality_score(&PortfolioItem::default()), 0);
    }

    #[test]
    fn report_requires_five_verified_items() {
        let four: Vec<_> = (0..4).map(|_| item(600)).collect();
        let report = quality_report(&four);
        assert!(!report.ready_for_job_applications);
        assert_eq!(report.verified_items, 4);

        let five: Vec<_> = (0..5).map(|_| item(600)).collect();
        let report = quality_report(&five);
        assert!(report.ready_for_job_applications);
        assert!(report.recommendations.is_empty());
    }
}
