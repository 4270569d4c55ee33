//! Registry Integrity Verification
//!
//! Cross-checks the entity store for states that the store operations
//! should never produce, plus softer inconsistencies an operator may want
//! to review. Run after seeding or bulk edits, or periodically from a
//! supervisor task.
//!
//! Violations are hard invariant breaks. Advisories (alert severity that
//! disagrees with its numeric risk score) are reported but never corrected,
//! since both fields are operator-set.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::logging::{self, Component};
use crate::model::{Alert, HistoryEntry, Message, MessageStatus, PopulationRecord, RiskLevel};
use crate::store::EntityStore;

// ============================================================================
// Report types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub checked_at: DateTime<Utc>,
    pub summary: IntegritySummary,
    pub violations: Vec<Finding>,
    pub advisories: Vec<Finding>,
    pub status: VerificationStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntegritySummary {
    pub alerts_checked: usize,
    pub records_checked: usize,
    pub messages_checked: usize,
    pub history_entries_checked: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub entity_id: String,
    pub kind: FindingKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A population record claims more vulnerable residents than residents.
    VulnerableExceedsPopulation,
    /// A message left `pending` but nothing in history says how.
    MissingHistory,
    /// A history entry points at an entity the store does not hold.
    OrphanHistory,
    /// Alert severity and numeric risk score fall in different bands.
    SeverityRiskMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Clean,
    AdvisoriesOnly,
    Violations,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.status == VerificationStatus::Clean
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// Checks
// ============================================================================

/// Severity band a 0–100 risk score falls into: high ≥ 70, medium ≥ 40,
/// otherwise low.
pub fn expected_severity(risk_level: u8) -> RiskLevel {
    match risk_level {
        70.. => RiskLevel::High,
        40..=69 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

/// Runs every check over the given snapshots.
pub fn verify_entities(
    alerts: &[Alert],
    records: &[PopulationRecord],
    messages: &[Message],
    history: &[HistoryEntry],
    now: DateTime<Utc>,
) -> IntegrityReport {
    let mut violations = Vec::new();
    let mut advisories = Vec::new();

    for record in records {
        if record.vulnerable_population > record.population {
            violations.push(Finding {
                entity_id: record.id.to_string(),
                kind: FindingKind::VulnerableExceedsPopulation,
                detail: format!(
                    "{}: {} vulnerable of {} residents",
                    record.community, record.vulnerable_population, record.population
                ),
            });
        }
    }

    let with_history: HashSet<_> = history.iter().map(|h| h.entity_id).collect();
    for message in messages {
        if message.status != MessageStatus::Pending && !with_history.contains(&message.id) {
            violations.push(Finding {
                entity_id: message.id.to_string(),
                kind: FindingKind::MissingHistory,
                detail: format!("message is {} but has no history entry", message.status),
            });
        }
    }

    let known: HashSet<_> = alerts
        .iter()
        .map(|a| a.id)
        .chain(messages.iter().map(|m| m.id))
        .collect();
    for entry in history {
        if !known.contains(&entry.entity_id) {
            violations.push(Finding {
                entity_id: entry.entity_id.to_string(),
                kind: FindingKind::OrphanHistory,
                detail: format!("'{}' entry at {} has no matching entity", entry.action, entry.time),
            });
        }
    }

    for alert in alerts {
        let expected = expected_severity(alert.risk_level);
        if alert.severity != expected {
            advisories.push(Finding {
                entity_id: alert.id.to_string(),
                kind: FindingKind::SeverityRiskMismatch,
                detail: format!(
                    "{}: severity {} but risk score {} suggests {}",
                    alert.location, alert.severity, alert.risk_level, expected
                ),
            });
        }
    }

    let status = if !violations.is_empty() {
        VerificationStatus::Violations
    } else if !advisories.is_empty() {
        VerificationStatus::AdvisoriesOnly
    } else {
        VerificationStatus::Clean
    };

    IntegrityReport {
        checked_at: now,
        summary: IntegritySummary {
            alerts_checked: alerts.len(),
            records_checked: records.len(),
            messages_checked: messages.len(),
            history_entries_checked: history.len(),
        },
        violations,
        advisories,
        status,
    }
}

/// Verifies the current contents of `store`.
pub fn verify_store(store: &EntityStore, now: DateTime<Utc>) -> IntegrityReport {
    let report = verify_entities(
        &store.list_alerts(),
        &store.list_population_records(None),
        &store.list_messages(),
        &store.history(),
        now,
    );
    log_report(&report);
    report
}

/// Logs one line for the overall result and one per violation.
pub fn log_report(report: &IntegrityReport) {
    let s = &report.summary;
    let line = format!(
        "Integrity check: {} alerts, {} records, {} messages, {} history entries; {} violations, {} advisories",
        s.alerts_checked,
        s.records_checked,
        s.messages_checked,
        s.history_entries_checked,
        report.violations.len(),
        report.advisories.len()
    );
    match report.status {
        VerificationStatus::Violations => logging::error(Component::System, None, &line),
        VerificationStatus::AdvisoriesOnly => logging::warn(Component::System, None, &line),
        VerificationStatus::Clean => logging::info(Component::System, None, &line),
    }
    for finding in &report.violations {
        logging::error(Component::System, Some(&finding.entity_id), &finding.detail);
    }
}

// ============================================================================
// Tests
// ============================================================================
