//! Hands-on progress gates: milestones that stay locked until counted
//! evidence reaches a target.

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::skills::normalize_key;
use crate::validation::weekly::DailyLogRecord;
use crate::validation::LabEntry;

pub const PHASE0_GATE_ID: &str = "phase0_complete";
pub const TIER1_JOBS_GATE_ID: &str = "ready_for_tier1_jobs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    ToolHours,
    PortfolioCount,
    LabCount,
    ManualCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateRequirement {
    pub id: String,
    pub name: String,
    pub kind: RequirementKind,
    pub required: f64,
    pub current: f64,
    #[serde(default)]
    pub evidence_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_create: Option<String>,
    #[serde(default)]
    pub must_be_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    pub met: bool,
}

impl GateRequirement {
    fn counted(id: &str, name: &str, kind: RequirementKind, required: f64, evidence: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            required,
            current: 0.0,
            evidence_required: evidence.iter().map(|s| s.to_string()).collect(),
            must_create: None,
            must_be_public: false,
            depends_on: None,
            met: false,
        }
    }

    /// Percentage toward the target, capped at 100. Manual checks are all or
    /// nothing.
    pub fn progress(&self) -> f64 {
        match self.kind {
            RequirementKind::ManualCheck => if self.met { 100.0 } else { 0.0 },
            _ if self.required <= 0.0 => 100.0,
            _ => (self.current / self.required * 100.0).min(100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressGate {
    pub id: String,
    pub locked: bool,
    pub requirements: Vec<GateRequirement>,
    pub all_met: bool,
    pub progress: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Mean requirement progress, rounded. Zero for a gate with no requirements.
pub fn calculate_progress(gate: &ProgressGate) -> u32 {
    if gate.requirements.is_empty() {
        return 0;
    }
    let total: f64 = gate.requirements.iter().map(GateRequirement::progress).sum();
    (total / gate.requirements.len() as f64).round() as u32
}

/// Recompute `met`, `all_met`, `progress` and `locked`. `unlocked_at` is set
/// the first time the gate opens and kept afterwards.
pub fn update_gate(gate: &ProgressGate, now: DateTime<Utc>) -> ProgressGate {
    let requirements: Vec<GateRequirement> = gate
        .requirements
        .iter()
        .map(|req| {
            let mut req = req.clone();
            if req.kind != RequirementKind::ManualCheck {
                req.met = req.current >= req.required;
            }
            req
        })
        .collect();

    let all_met = requirements.iter().all(|r| r.met);
    let mut next = ProgressGate {
        id: gate.id.clone(),
        locked: !all_met,
        requirements,
        all_met,
        progress: 0,
        unlocked_at: gate.unlocked_at,
    };
    next.progress = calculate_progress(&next);
    if all_met && next.unlocked_at.is_none() {
        tracing::info!(gate = %next.id, "Gate unlocked");
        next.unlocked_at = Some(now);
    }
    next
}

/// Add counted evidence to one requirement. Returns false for an unknown id
/// or a manual check.
pub fn record_progress(gate: &mut ProgressGate, requirement_id: &str, amount: f64) -> bool {
    match gate.requirements.iter_mut().find(|r| r.id == requirement_id) {
        Some(req) if req.kind != RequirementKind::ManualCheck => {
            req.current += amount.max(0.0);
            true
        }
        _ => false,
    }
}

/// Tick a manual check.
pub fn confirm_manual(gate: &mut ProgressGate, requirement_id: &str) -> bool {
    match gate.requirements.iter_mut().find(|r| r.id == requirement_id) {
        Some(req) if req.kind == RequirementKind::ManualCheck => {
            req.met = true;
            req.current = req.required;
            true
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSeverity {
    Critical,
    High,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBlock {
    pub blocked_feature: String,
    pub reason: String,
    pub requirements: Vec<GateRequirement>,
    pub action: String,
    pub severity: BlockSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandsOnGates {
    pub current_phase: String,
    pub gates: BTreeMap<String, ProgressGate>,
}

impl Default for HandsOnGates {
    fn default() -> Self {
        let mut gates = BTreeMap::new();
        gates.insert(PHASE0_GATE_ID.to_string(), phase0_gate());
        gates.insert(TIER1_JOBS_GATE_ID.to_string(), tier1_jobs_gate());
        Self {
            current_phase: "phase0_foundation".to_string(),
            gates,
        }
    }
}

impl HandsOnGates {
    /// Fill the default gates from stored logs. Tool hours and labs are
    /// matched on normalized names; portfolio requirements take the count
    /// of verified items. Manual checks stay as they are except the Phase-0
    /// dependency, which follows the Phase-0 gate.
    pub fn from_logs(logs: &[DailyLogRecord], verified_portfolio: usize, now: DateTime<Utc>) -> Self {
        let mut gates = Self::default();
        let tool_hours = |needle: &str| -> f64 {
            logs.iter()
                .flat_map(|r| &r.submission.tools_practiced)
                .filter(|t| normalize_key(&t.tool_name).contains(needle))
                .map(|t| t.duration)
                .sum()
        };
        let wireshark = tool_hours("wireshark");
        let splunk = tool_hours("splunk");
        let thm = count_labs(logs, |l| normalize_key(&l.platform).contains("tryhackme"));
        let pcap = count_labs(logs, |l| normalize_key(&l.name).contains("pcap"));
        let verified = verified_portfolio as f64;

        if let Some(phase0) = gates.gates.get_mut(PHASE0_GATE_ID) {
            record_progress(phase0, "wireshark_hours", wireshark);
            record_progress(phase0, "splunk_practice", splunk);
            record_progress(phase0, "thm_soc_level1", thm);
            record_progress(phase0, "pcap_analysis", pcap);
            record_progress(phase0, "incident_writeups", verified);
            *phase0 = update_gate(phase0, now);
        }
        let phase0_done = gates.phase0_complete();
        if let Some(tier1) = gates.gates.get_mut(TIER1_JOBS_GATE_ID) {
            record_progress(tier1, "public_portfolio", verified);
            if phase0_done {
                confirm_manual(tier1, "phase0_gate");
            }
            *tier1 = update_gate(tier1, now);
        }
        gates
    }

    pub fn phase0_complete(&self) -> bool {
        self.gates.get(PHASE0_GATE_ID).is_some_and(|g| g.all_met)
    }
}

fn count_labs(logs: &[DailyLogRecord], pred: impl Fn(&LabEntry) -> bool) -> f64 {
    logs.iter()
        .flat_map(|r| &r.submission.labs_completed)
        .filter(|l| pred(l))
        .count() as f64
}

pub fn check_progress_blocks(gates: &HandsOnGates) -> Vec<ProgressBlock> {
    let mut blocks = Vec::new();

    if let Some(phase0) = gates.gates.get(PHASE0_GATE_ID).filter(|g| !g.all_met) {
        blocks.push(ProgressBlock {
            blocked_feature: "Advance to Tier 1 Job Search".to_string(),
            reason: "Phase 0 hands-on requirements not met".to_string(),
            requirements: phase0.requirements.iter().filter(|r| !r.met).cloned().collect(),
            action: "Complete the outstanding hands-on requirements".to_string(),
            severity: BlockSeverity::Critical,
        });
    }

    if let Some(tier1) = gates.gates.get(TIER1_JOBS_GATE_ID).filter(|g| !g.all_met) {
        if let Some(portfolio) = tier1
            .requirements
            .iter()
            .find(|r| r.id == "public_portfolio" && !r.met)
        {
            blocks.push(ProgressBlock {
                blocked_feature: "\"Ready for Tier 1 Jobs\" indicator".to_string(),
                reason: format!(
                    "Only {}/{} public portfolio items",
                    portfolio.current, portfolio.required
                ),
                requirements: vec![portfolio.clone()],
                action: "Create more incident investigations and document them on GitHub".to_string(),
                severity: BlockSeverity::High,
            });
        }
    }

    blocks
}

pub fn phase0_gate() -> ProgressGate {
    use RequirementKind::*;
    let mut incident_writeups = GateRequirement::counted(
        "incident_writeups",
        "Incident Investigation Writeups",
        PortfolioCount,
        3.0,
        &["github_urls"],
    );
    incident_writeups.must_be_public = true;
    let mut splunk = GateRequirement::counted(
        "splunk_practice",
        "Splunk Queries & Dashboards",
        ToolHours,
        15.0,
        &["screenshots", "spl_queries"],
    );
    splunk.must_create = Some("1 custom dashboard".to_string());

    ProgressGate {
        id: PHASE0_GATE_ID.to_string(),
        locked: true,
        requirements: vec![
            GateRequirement::counted(
                "wireshark_hours",
                "Wireshark Practice",
                ToolHours,
                20.0,
                &["screenshots", "pcap_files"],
            ),
            incident_writeups,
            GateRequirement::counted(
                "thm_soc_level1",
                "TryHackMe SOC Level 1 Rooms",
                LabCount,
                15.0,
                &["completion_screenshots"],
            ),
            splunk,
            GateRequirement::counted(
                "pcap_analysis",
                "PCAP Analysis Practice",
                LabCount,
                10.0,
                &["analysis_writeups"],
            ),
        ],
        all_met: false,
        progress: 0,
        unlocked_at: None,
    }
}

pub fn tier1_jobs_gate() -> ProgressGate {
    use RequirementKind::*;
    let mut portfolio = GateRequirement::counted(
        "public_portfolio",
        "Public GitHub Portfolio",
        PortfolioCount,
        5.0,
        &["github_urls", "verified_public"],
    );
    portfolio.must_be_public = true;
    let mut phase0 = GateRequirement::counted("phase0_gate", "Phase 0 Completed", ManualCheck, 1.0, &[]);
    phase0.depends_on = Some(PHASE0_GATE_ID.to_string());

    ProgressGate {
        id: TIER1_JOBS_GATE_ID.to_string(),
        locked: true,
        requirements: vec![
            portfolio,
            GateRequirement::counted("linkedin_profile", "LinkedIn Profile Updated", ManualCheck, 1.0, &[]),
            phase0,
        ],
        all_met: false,
        progress: 0,
        unlocked_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_gates_are_locked_and_blocking() {
        let gates = HandsOnGates::default();
        let blocks = check_progress_blocks(&gates);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].severity, BlockSeverity::Critical);
        assert_eq!(blocks[0].requirements.len(), 5);
    }

    #[test]
    fn progress_is_mean_of_capped_requirements() {
        let mut gate = phase0_gate();
        assert!(record_progress(&mut gate, "wireshark_hours", 40.0));
        assert!(record_progress(&mut gate, "pcap_analysis", 5.0));
        let gate = update_gate(&gate, Utc::now());
        // (100 + 0 + 0 + 0 + 50) / 5
        assert_eq!(gate.progress, 30);
        assert!(gate.locked);
        assert!(gate.requirements[0].met);
    }

    #[test]
    fn gates_fill_from_logs() {
        use crate::validation::{DailyLogSubmission, ToolEntry};
        let record = DailyLogRecord {
            date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            submission: DailyLogSubmission {
                theory_hours: 0.0,
                hands_on_hours: 3.0,
                labs_completed: vec![LabEntry {
                    name: "PCAP Basics".into(),
                    platform: "TryHackMe".into(),
                    ..LabEntry::default()
                }],
                tools_practiced: vec![ToolEntry {
                    tool_name: "Wireshark".into(),
                    duration: 2.5,
                    ..ToolEntry::default()
                }],
                portfolio_items: vec![],
            },
        };
        let gates = HandsOnGates::from_logs(&[record], 1, Utc::now());
        let phase0 = &gates.gates[PHASE0_GATE_ID];
        let current = |id: &str| phase0.requirements.iter().find(|r| r.id == id).unwrap().current;
        assert_eq!(current("wireshark_hours"), 2.5);
        assert_eq!(current("thm_soc_level1"), 1.0);
        assert_eq!(current("pcap_analysis"), 1.0);
        assert_eq!(current("incident_writeups"), 1.0);
        assert!(!gates.phase0_complete());
    }

    #[test]
    fn unlocking_stamps_once() {
        let mut gate = tier1_jobs_gate();
        assert!(record_progress(&mut gate, "public_portfolio", 5.0));
        assert!(!record_progress(&mut gate, "linkedin_profile", 1.0));
        assert!(confirm_manual(&mut gate, "linkedin_profile"));
        assert!(confirm_manual(&mut gate, "phase0_gate"));

        let first = Utc::now();
        let opened = update_gate(&gate, first);
        assert!(opened.all_met && !opened.locked);
        assert_eq!(opened.progress, 100);
        assert_eq!(opened.unlocked_at, Some(first));

        let later = update_gate(&opened, first + chrono::Duration::days(3));
        assert_eq!(later.unlocked_at, Some(first));
    }
}
