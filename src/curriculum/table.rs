//! Static phase content, one entry per slot of the tier ladder.
//!
//! Adding a tier means adding a slot here; the generator walks
//! [`PhaseSlot::LADDER`] and never branches on tier names itself.

use super::{Phase, TargetTier};

/// A position on the curriculum ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseSlot {
    Foundation,
    SocTier1,
    SocTier2,
    SocTier3,
}

/// Fixed content for one slot.
#[derive(Debug)]
pub struct PhaseTemplate {
    pub phase_number: u32,
    pub phase_name: &'static str,
    pub start_week: u32,
    pub end_week: u32,
    /// Minimum tier rank that unlocks this slot. Zero means always included.
    pub required_rank: u8,
    pub skills: &'static [&'static str],
    pub tools: &'static [&'static str],
    pub labs: &'static [&'static str],
    pub certifications: &'static [&'static str],
}

impl PhaseSlot {
    /// Slots in ladder order. Week blocks are contiguous from week 1.
    pub const LADDER: [PhaseSlot; 4] = [
        PhaseSlot::Foundation,
        PhaseSlot::SocTier1,
        PhaseSlot::SocTier2,
        PhaseSlot::SocTier3,
    ];

    pub fn template(self) -> &'static PhaseTemplate {
        match self {
            PhaseSlot::Foundation => &FOUNDATION,
            PhaseSlot::SocTier1 => &SOC_TIER_1,
            PhaseSlot::SocTier2 => &SOC_TIER_2,
            PhaseSlot::SocTier3 => &SOC_TIER_3,
        }
    }

    pub fn unlocked_by(self, tier: TargetTier) -> bool {
        tier.rank() >= self.template().required_rank
    }

    /// Materialize the slot as a phase at the given weekly commitment.
    pub fn build(self, weekly_hours: f64) -> Phase {
        let t = self.template();
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Phase {
            phase_number: t.phase_number,
            phase_name: t.phase_name.to_string(),
            start_week: t.start_week,
            end_week: t.end_week,
            skills: owned(t.skills),
            tools: owned(t.tools),
            labs: owned(t.labs),
            certifications: owned(t.certifications),
            weekly_hours,
        }
    }
}

static FOUNDATION: PhaseTemplate = PhaseTemplate {
    phase_number: 0,
    phase_name: "Foundation - Core Skills",
    start_week: 1,
    end_week: 12,
    required_rank: 0,
    skills: &[
        "TCP/IP Networking",
        "Linux Command Line",
        "Windows Administration",
        "Security Fundamentals",
        "Log Analysis Basics",
    ],
    tools: &["Wireshark", "Splunk Free", "Nmap", "Sysinternals Suite", "tcpdump"],
    labs: &[
        "TryHackMe: SOC Level 1 Path",
        "CyberDefenders: Blue Team Labs",
        "LetsDefend: SOC Analyst Path",
        "Wireshark Packet Analysis Labs",
    ],
    certifications: &["Google Cybersecurity Certificate"],
};

static SOC_TIER_1: PhaseTemplate = PhaseTemplate {
    phase_number: 1,
    phase_name: "SOC Tier 1 - Incident Response",
    start_week: 13,
    end_week: 24,
    required_rank: 1,
    skills: &[
        "Incident Response",
        "SIEM Operations",
        "Threat Intelligence",
        "Malware Analysis Basics",
        "Alert Triage",
    ],
    tools: &["Splunk Enterprise", "ELK Stack", "MITRE ATT&CK", "VirusTotal", "Any.run"],
    labs: &[
        "Blue Team Labs Online",
        "LetsDefend Advanced",
        "CyberDefenders Incident Response",
        "SANS Cyber Aces",
    ],
    certifications: &["CompTIA Security+", "BTL1 (Blue Team Level 1)"],
};

static SOC_TIER_2: PhaseTemplate = PhaseTemplate {
    phase_number: 2,
    phase_name: "SOC Tier 2 - Advanced Analysis",
    start_week: 25,
    end_week: 36,
    required_rank: 2,
    skills: &[
        "Advanced Malware Analysis",
        "Memory Forensics",
        "Network Forensics",
        "Threat Hunting",
        "SOAR Automation",
    ],
    tools: &["Volatility", "REMnux", "IDA Pro / Ghidra", "Zeek (Bro)", "TheHive"],
    labs: &[
        "Malware Traffic Analysis",
        "SANS FOR508 Labs",
        "Practical Malware Analysis Labs",
    ],
    certifications: &["GIAC GCIH", "BTL2 (Blue Team Level 2)"],
};

static SOC_TIER_3: PhaseTemplate = PhaseTemplate {
    phase_number: 3,
    phase_name: "SOC Tier 3 - Threat Hunting",
    start_week: 37,
    end_week: 48,
    required_rank: 3,
    skills: &[
        "Advanced Threat Hunting",
        "Reverse Engineering",
        "APT Detection",
        "Custom Detection Rules",
        "Threat Intelligence Analysis",
    ],
    tools: &["Yara", "Sigma Rules", "Velociraptor", "OSQuery", "Custom Python Tools"],
    labs: &[
        "Active Countermeasures",
        "SANS Threat Hunting Labs",
        "Custom CTF Challenges",
    ],
    certifications: &["GIAC GCFA", "GIAC GREM", "OSCP (Optional)"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_weeks_are_contiguous_from_week_one() {
        let mut next = 1;
        for slot in PhaseSlot::LADDER {
            let t = slot.template();
            assert_eq!(t.start_week, next, "{:?} starts out of sequence", slot);
            assert!(t.start_week <= t.end_week);
            next = t.end_week + 1;
        }
    }

    #[test]
    fn foundation_is_unlocked_by_every_tier() {
        for tier in [
            TargetTier::Tier1,
            TargetTier::Tier2,
            TargetTier::Tier3,
            TargetTier::Specialist,
            TargetTier::Unrecognized,
        ] {
            assert!(PhaseSlot::Foundation.unlocked_by(tier));
        }
    }
}
