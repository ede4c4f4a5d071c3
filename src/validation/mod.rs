//! Daily log gate: decides whether one day's practice record may be
//! submitted.
//!
//! Theory-only days are always allowed. Claimed hands-on time is not: it
//! must come with artifacts (lab screenshots and writeups, tool evidence,
//! or portfolio items), and every artifact listed must itself be complete.

pub mod evidence;
pub mod weekly;

use serde::{Serialize, Deserialize};
use crate::error::ShapeError;
use self::evidence::{count_words, is_blank, Evidence};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// "At least one of" requirement for a day with hands-on hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinDailyRequirement {
    pub labs_completed: usize,
    pub tool_hours: f64,
    pub portfolio_items: usize,
}

impl Default for MinDailyRequirement {
    fn default() -> Self {
        Self { labs_completed: 1, tool_hours: 1.0, portfolio_items: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabEvidenceRule {
    pub min_writeup_words: usize,
}

impl Default for LabEvidenceRule {
    fn default() -> Self {
        Self { min_writeup_words: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolEvidenceRule {
    pub min_description_words: usize,
    pub min_duration_hours: f64,
}

impl Default for ToolEvidenceRule {
    fn default() -> Self {
        Self { min_description_words: 50, min_duration_hours: 0.5 }
    }
}

/// Per-week practice quota, checked over stored logs rather than one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyQuota {
    pub min_labs: usize,
    pub min_tool_hours: f64,
    /// Portfolio items per week; 0.5 means one item every two weeks.
    pub min_portfolio_items: f64,
}

impl Default for WeeklyQuota {
    fn default() -> Self {
        Self { min_labs: 2, min_tool_hours: 5.0, min_portfolio_items: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorialHellThreshold {
    pub consecutive_days: u32,
    pub theory_percentage: f64,
}

impl Default for TutorialHellThreshold {
    fn default() -> Self {
        Self { consecutive_days: 7, theory_percentage: 50.0 }
    }
}

/// Every threshold the validator and the weekly checks use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    pub min_hands_on_percentage: f64,
    pub max_theory_percentage: f64,
    /// Theory share above which a day raises the tutorial-hell flag.
    pub tutorial_hell_percentage: f64,
    /// Upper bound for any single hours field; larger values are a shape error.
    pub max_daily_hours: f64,
    pub min_daily: MinDailyRequirement,
    pub lab_evidence: LabEvidenceRule,
    pub tool_evidence: ToolEvidenceRule,
    pub weekly: WeeklyQuota,
    pub tutorial_hell: TutorialHellThreshold,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_hands_on_percentage: 60.0,
            max_theory_percentage: 40.0,
            tutorial_hell_percentage: 50.0,
            max_daily_hours: 24.0,
            min_daily: MinDailyRequirement::default(),
            lab_evidence: LabEvidenceRule::default(),
            tool_evidence: ToolEvidenceRule::default(),
            weekly: WeeklyQuota::default(),
            tutorial_hell: TutorialHellThreshold::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Insane,
    #[default]
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabEntry {
    pub name: String,
    pub platform: String,
    pub screenshot_url: Option<String>,
    pub writeup: Option<String>,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolEntry {
    pub tool_name: String,
    pub activity: String,
    pub description: Option<String>,
    /// Session length in hours.
    pub duration: f64,
    pub evidence: Option<Evidence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioEntry {
    pub github_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Option<String>,
}

/// One day's raw practice record as submitted by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogSubmission {
    pub theory_hours: f64,
    pub hands_on_hours: f64,
    #[serde(default)]
    pub labs_completed: Vec<LabEntry>,
    #[serde(default)]
    pub tools_practiced: Vec<ToolEntry>,
    #[serde(default)]
    pub portfolio_items: Vec<PortfolioEntry>,
}

impl DailyLogSubmission {
    pub fn total_hours(&self) -> f64 {
        self.theory_hours + self.hands_on_hours
    }

    pub fn tool_hours(&self) -> f64 {
        self.tools_practiced.iter().map(|t| t.duration).sum()
    }

    /// Tool names followed by lab names, the order the skill ledger expects.
    pub fn activity_names(&self) -> Vec<String> {
        self.tools_practiced
            .iter()
            .map(|t| t.tool_name.clone())
            .chain(self.labs_completed.iter().map(|l| l.name.clone()))
            .collect()
    }

    /// Reject numerically impossible submissions before any rule runs.
    pub fn check_shape(&self, policy: &ValidationPolicy) -> Result<(), ShapeError> {
        check_hours("theoryHours", self.theory_hours, policy.max_daily_hours)?;
        check_hours("handsOnHours", self.hands_on_hours, policy.max_daily_hours)?;
        for (i, tool) in self.tools_practiced.iter().enumerate() {
            check_hours(
                &format!("toolsPracticed[{}].duration", i),
                tool.duration,
                policy.max_daily_hours,
            )?;
        }
        Ok(())
    }
}

fn check_hours(field: &str, value: f64, max: f64) -> Result<(), ShapeError> {
    if !value.is_finite() {
        return Err(ShapeError::submission(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ShapeError::submission(field, "must not be negative"));
    }
    if value > max {
        return Err(ShapeError::submission(field, format!("must not exceed {} hours", max)));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    EmptySubmission,
    MissingHandsOnEvidence,
    MissingScreenshot,
    WriteupTooShort,
    MissingToolEvidence,
    DescriptionTooShort,
    SessionTooShort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    TheoryImbalance,
    TheoryOnlySession,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    pub can_submit: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    /// Informational; does not affect `can_submit`.
    pub tutorial_hell_alert: bool,
    pub theory_percent: f64,
}

impl ValidationVerdict {
    pub fn has_error(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

/// A submission that passed the gate. Only [`DailyLogValidator::gate`]
/// constructs one, so anything holding it was accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedSubmission {
    submission: DailyLogSubmission,
    verdict: ValidationVerdict,
}

impl AcceptedSubmission {
    pub fn submission(&self) -> &DailyLogSubmission {
        &self.submission
    }

    pub fn verdict(&self) -> &ValidationVerdict {
        &self.verdict
    }

    pub fn activity_names(&self) -> Vec<String> {
        self.submission.activity_names()
    }

    pub fn into_parts(self) -> (DailyLogSubmission, ValidationVerdict) {
        (self.submission, self.verdict)
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct DailyLogValidator {
    policy: ValidationPolicy,
}

impl DailyLogValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn validate(&self, log: &DailyLogSubmission) -> ValidationVerdict {
        let policy = &self.policy;
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let total_hours = log.total_hours();
        if total_hours <= 0.0 {
            errors.push(ValidationError {
                kind: ValidationErrorKind::EmptySubmission,
                field: "hours".to_string(),
                message: "You must log at least some study time".to_string(),
            });
            return ValidationVerdict {
                can_submit: false,
                errors,
                warnings,
                tutorial_hell_alert: false,
                theory_percent: 0.0,
            };
        }

        let theory_percent = log.theory_hours / total_hours * 100.0;

        if theory_percent > policy.max_theory_percentage && log.hands_on_hours > 0.0 {
            warnings.push(ValidationWarning {
                kind: WarningKind::TheoryImbalance,
                message: format!(
                    "Theory time is {:.0}% (recommended max {:.0}%). Balance it with more hands-on practice to avoid tutorial hell.",
                    theory_percent, policy.max_theory_percentage
                ),
            });
        }

        if theory_percent >= 100.0 {
            warnings.push(ValidationWarning {
                kind: WarningKind::TheoryOnlySession,
                message: "Theory-only session. Fine occasionally, but schedule hands-on labs soon.".to_string(),
            });
        }

        if log.hands_on_hours > 0.0 && !self.meets_daily_minimum(log) {
            errors.push(ValidationError {
                kind: ValidationErrorKind::MissingHandsOnEvidence,
                field: "handsOn".to_string(),
                message: format!(
                    "Hands-on hours were logged without evidence. Complete at least {} lab, practice tools for {} hour(s), or add {} portfolio item",
                    policy.min_daily.labs_completed,
                    policy.min_daily.tool_hours,
                    policy.min_daily.portfolio_items
                ),
            });
        }

        for (i, lab) in log.labs_completed.iter().enumerate() {
            self.check_lab(i, lab, &mut errors);
        }
        for (i, tool) in log.tools_practiced.iter().enumerate() {
            self.check_tool(i, tool, &mut errors);
        }

        let verdict = ValidationVerdict {
            can_submit: errors.is_empty(),
            errors,
            warnings,
            tutorial_hell_alert: theory_percent > policy.tutorial_hell_percentage,
            theory_percent,
        };

        tracing::debug!(
            can_submit = verdict.can_submit,
            errors = verdict.errors.len(),
            warnings = verdict.warnings.len(),
            theory_percent = verdict.theory_percent,
            "Validated daily log"
        );

        verdict
    }

    /// Validate and, when allowed, wrap the submission for the ledger.
    pub fn gate(&self, log: DailyLogSubmission) -> Result<AcceptedSubmission, ValidationVerdict> {
        let verdict = self.validate(&log);
        if verdict.can_submit {
            Ok(AcceptedSubmission { submission: log, verdict })
        } else {
            Err(verdict)
        }
    }

    fn meets_daily_minimum(&self, log: &DailyLogSubmission) -> bool {
        let min = &self.policy.min_daily;
        log.labs_completed.len() >= min.labs_completed
            || log.tool_hours() >= min.tool_hours
            || log.portfolio_items.len() >= min.portfolio_items
    }

    fn check_lab(&self, index: usize, lab: &LabEntry, errors: &mut Vec<ValidationError>) {
        let min_words = self.policy.lab_evidence.min_writeup_words;

        if is_blank(lab.screenshot_url.as_deref()) {
            errors.push(ValidationError {
                kind: ValidationErrorKind::MissingScreenshot,
                field: format!("labsCompleted[{}].screenshotUrl", index),
                message: format!("Lab \"{}\" requires a completion screenshot URL", lab.name),
            });
        }

        let words = lab.writeup.as_deref().map(count_words).unwrap_or(0);
        if words < min_words {
            errors.push(ValidationError {
                kind: ValidationErrorKind::WriteupTooShort,
                field: format!("labsCompleted[{}].writeup", index),
                message: format!(
                    "Lab \"{}\" requires a writeup of at least {} words ({} given)",
                    lab.name, min_words, words
                ),
            });
        }
    }

    fn check_tool(&self, index: usize, tool: &ToolEntry, errors: &mut Vec<ValidationError>) {
        let rule = &self.policy.tool_evidence;

        if !tool.evidence.as_ref().is_some_and(Evidence::is_present) {
            errors.push(ValidationError {
                kind: ValidationErrorKind::MissingToolEvidence,
                field: format!("toolsPracticed[{}].evidence", index),
                message: format!(
                    "Tool practice \"{}\" requires evidence (screenshot or file)",
                    tool.tool_name
                ),
            });
        }

        let words = tool.description.as_deref().map(count_words).unwrap_or(0);
        if words < rule.min_description_words {
            errors.push(ValidationError {
                kind: ValidationErrorKind::DescriptionTooShort,
                field: format!("toolsPracticed[{}].description", index),
                message: format!(
                    "Tool practice \"{}\" requires a description of at least {} words ({} given)",
                    tool.tool_name, rule.min_description_words, words
                ),
            });
        }

        if tool.duration < rule.min_duration_hours {
            errors.push(ValidationError {
                kind: ValidationErrorKind::SessionTooShort,
                field: format!("toolsPracticed[{}].duration", index),
                message: format!(
                    "Tool practice \"{}\" must last at least {} hours",
                    tool.tool_name, rule.min_duration_hours
                ),
            });
        }
    }
}

/// Validate one submission against a policy.
pub fn validate(log: &DailyLogSubmission, policy: &ValidationPolicy) -> ValidationVerdict {
    DailyLogValidator::new(policy.clone()).validate(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["packet"; n].join(" ")
    }

    #[test]
    fn empty_submission_short_circuits() {
        let mut log = DailyLogSubmission::default();
        log.labs_completed.push(LabEntry::default());
        let verdict = validate(&log, &ValidationPolicy::default());
        assert!(!verdict.can_submit);
        assert_eq!(verdict.errors.len(), 1);
        assert_eq!(verdict.errors[0].kind, ValidationErrorKind::EmptySubmission);
        assert!(verdict.warnings.is_empty());
    }

    #[test]
    fn theory_only_day_is_allowed_with_warning() {
        let log = DailyLogSubmission { theory_hours: 2.0, ..Default::default() };
        let verdict = validate(&log, &ValidationPolicy::default());
        assert!(verdict.can_submit);
        assert!(verdict.has_warning(WarningKind::TheoryOnlySession));
        assert!(!verdict.has_warning(WarningKind::TheoryImbalance));
        assert!(verdict.tutorial_hell_alert);
    }

    #[test]
    fn tool_errors_accumulate_per_entry() {
        let log = DailyLogSubmission {
            hands_on_hours: 2.0,
            tools_practiced: vec![ToolEntry {
                tool_name: "Wireshark".into(),
                duration: 0.25,
                ..Default::default()
            }],
            ..Default::default()
        };
        let verdict = validate(&log, &ValidationPolicy::default());
        assert!(!verdict.can_submit);
        assert!(verdict.has_error(ValidationErrorKind::MissingHandsOnEvidence));
        assert!(verdict.has_error(ValidationErrorKind::MissingToolEvidence));
        assert!(verdict.has_error(ValidationErrorKind::DescriptionTooShort));
        assert!(verdict.has_error(ValidationErrorKind::SessionTooShort));
    }

    #[test]
    fn evidenced_tool_hours_satisfy_minimum() {
        let log = DailyLogSubmission {
            hands_on_hours: 1.5,
            tools_practiced: vec![ToolEntry {
                tool_name: "Splunk Free".into(),
                activity: "dashboards".into(),
                description: Some(words(60)),
                duration: 1.5,
                evidence: Some(Evidence::Link("https://imgur.com/x.png".into())),
            }],
            ..Default::default()
        };
        let verdict = validate(&log, &ValidationPolicy::default());
        assert!(verdict.can_submit, "{:?}", verdict.errors);
    }

    #[test]
    fn policy_thresholds_are_honored() {
        let mut policy = ValidationPolicy::default();
        policy.lab_evidence.min_writeup_words = 5;
        let log = DailyLogSubmission {
            hands_on_hours: 1.0,
            labs_completed: vec![LabEntry {
                name: "Room".into(),
                screenshot_url: Some("https://imgur.com/a.png".into()),
                writeup: Some(words(5)),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(validate(&log, &policy).can_submit);
        assert!(!validate(&log, &ValidationPolicy::default()).can_submit);
    }

    #[test]
    fn gate_only_accepts_submittable_days() {
        let validator = DailyLogValidator::default();
        let rejected = DailyLogSubmission { theory_hours: 3.0, hands_on_hours: 1.0, ..Default::default() };
        assert!(validator.gate(rejected).is_err());

        let accepted = validator
            .gate(DailyLogSubmission { theory_hours: 1.0, ..Default::default() })
            .expect("theory-only day should pass");
        assert!(accepted.activity_names().is_empty());
    }

    #[test]
    fn shape_check_rejects_negative_and_oversized_hours() {
        let policy = ValidationPolicy::default();
        let log = DailyLogSubmission { theory_hours: -1.0, ..Default::default() };
        assert!(matches!(log.check_shape(&policy), Err(ShapeError::InvalidSubmissionShape { .. })));

        let log = DailyLogSubmission { hands_on_hours: 25.0, ..Default::default() };
        assert!(log.check_shape(&policy).is_err());

        let log = DailyLogSubmission {
            hands_on_hours: 1.0,
            tools_practiced: vec![ToolEntry { duration: f64::NAN, ..Default::default() }],
            ..Default::default()
        };
        assert!(log.check_shape(&policy).is_err());
    }

    #[test]
    fn activity_names_lists_tools_before_labs() {
        let log = DailyLogSubmission {
            labs_completed: vec![LabEntry { name: "Lab A".into(), ..Default::default() }],
            tools_practiced: vec![ToolEntry { tool_name: "Nmap".into(), ..Default::default() }],
            ..Default::default()
        };
        assert_eq!(log.activity_names(), vec!["Nmap".to_string(), "Lab A".to_string()]);
    }
}
