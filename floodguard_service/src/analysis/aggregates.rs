/// Dashboard aggregates over alerts, population records, and messages.
///
/// All functions take slices (store snapshots) and recompute from scratch.
/// Counts are `u64` sums of already-validated non-negative fields, so no
/// overflow handling is needed at realistic registry sizes.

use serde::Serialize;

use crate::analysis::groupings::group_by_state;
use crate::model::{Alert, Message, MessageStatus, PopulationRecord, RiskLevel};

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Sum of `affected_population` across all alerts.
///
/// Overlapping alerts for the same area are not de-duplicated; the figure
/// is an upper bound on the number of people affected.
pub fn total_population_at_risk(alerts: &[Alert]) -> u64 {
    alerts.iter().map(|a| a.affected_population).sum()
}

/// Per-level tallies used for both record risk levels and alert severities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskBucketCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskBucketCounts {
    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }

    fn bump(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
        }
    }
}

/// Alerts tallied by severity.
pub fn severity_counts(alerts: &[Alert]) -> RiskBucketCounts {
    let mut counts = RiskBucketCounts::default();
    for alert in alerts {
        counts.bump(alert.severity);
    }
    counts
}

// ---------------------------------------------------------------------------
// Population records
// ---------------------------------------------------------------------------

/// Records tallied by risk level. The three buckets always sum to the
/// number of records.
pub fn risk_bucket_counts(records: &[PopulationRecord]) -> RiskBucketCounts {
    let mut counts = RiskBucketCounts::default();
    for record in records {
        counts.bump(record.risk_level);
    }
    counts
}

/// Totals for the communities of one state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    pub community_count: usize,
    pub total_population: u64,
    pub total_households: u64,
    pub total_vulnerable: u64,
    pub high_risk_community_count: usize,
}

/// Summary for a single state. A state with no records yields all zeros.
pub fn state_summary(records: &[PopulationRecord], state: &str) -> StateSummary {
    summarize(records.iter().filter(|r| r.state == state))
}

/// One summary per state present in `records`, ordered by state name.
pub fn state_summaries(records: &[PopulationRecord]) -> Vec<(String, StateSummary)> {
    group_by_state(records)
        .into_iter()
        .map(|(state, group)| (state.to_string(), summarize(group.into_iter())))
        .collect()
}

fn summarize<'a>(records: impl Iterator<Item = &'a PopulationRecord>) -> StateSummary {
    let mut summary = StateSummary::default();
    for record in records {
        summary.community_count += 1;
        summary.total_population += record.population;
        summary.total_households += record.households;
        summary.total_vulnerable += record.vulnerable_population;
        if record.risk_level == RiskLevel::High {
            summary.high_risk_community_count += 1;
        }
    }
    summary
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Message counts by lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStats {
    pub pending: usize,
    pub sent: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryStats {
    pub fn total(&self) -> usize {
        self.pending + self.sent + self.delivered + self.failed
    }

    /// Delivered share of resolved (delivered + failed) messages.
    /// `None` until at least one message has resolved.
    pub fn delivery_rate(&self) -> Option<f64> {
        let resolved = self.delivered + self.failed;
        if resolved == 0 {
            return None;
        }
        Some(self.delivered as f64 / resolved as f64)
    }
}

pub fn delivery_stats(messages: &[Message]) -> DeliveryStats {
    let mut stats = DeliveryStats::default();
    for message in messages {
        match message.status {
            MessageStatus::Pending => stats.pending += 1,
            MessageStatus::Sent => stats.sent += 1,
            MessageStatus::Delivered => stats.delivered += 1,
            MessageStatus::Failed => stats.failed += 1,
        }
    }
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::MessageLanguage;
    use crate::model::{Channel, Priority};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn alert(severity: RiskLevel, affected: u64) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            location: "Somewhere".to_string(),
            severity,
            message: "Water rising".to_string(),
            affected_population: affected,
            risk_level: 50,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap(),
        }
    }

    fn record(state: &str, households: u64, population: u64, vulnerable: u64, risk: RiskLevel) -> PopulationRecord {
        PopulationRecord {
            id: Uuid::new_v4(),
            state: state.to_string(),
            lga: "LGA".to_string(),
            ward: "Ward".to_string(),
            community: "Community".to_string(),
            households,
            population,
            vulnerable_population: vulnerable,
            contact_person: "Contact".to_string(),
            phone_number: "+234-803-123-4567".to_string(),
            risk_level: risk,
            last_updated: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    fn message(status: MessageStatus) -> Message {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();
        Message {
            id: Uuid::new_v4(),
            recipients: vec!["+234-803-123-4567".to_string()],
            subject: None,
            body: "Evacuate".to_string(),
            channel: Channel::Sms,
            priority: Priority::High,
            language: MessageLanguage::English,
            status,
            provider_id: None,
            failure_reason: None,
            timestamp: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_total_population_at_risk_sums_all_alerts() {
        let alerts = vec![
            alert(RiskLevel::High, 12_000),
            alert(RiskLevel::High, 8_500),
        ];
        assert_eq!(total_population_at_risk(&alerts), 20_500);
    }

    #[test]
    fn test_total_population_at_risk_empty_is_zero() {
        assert_eq!(total_population_at_risk(&[]), 0);
    }

    #[test]
    fn test_risk_buckets_partition_records() {
        let records = vec![
            record("Niger", 450, 2800, 420, RiskLevel::High),
            record("Niger", 320, 1950, 285, RiskLevel::Medium),
            record("Niger", 180, 890, 156, RiskLevel::High),
            record("Lagos", 10, 60, 5, RiskLevel::Low),
        ];
        let counts = risk_bucket_counts(&records);

        assert_eq!(counts, RiskBucketCounts { low: 1, medium: 1, high: 2 });
        assert_eq!(counts.total(), records.len());
        assert_eq!(counts.get(RiskLevel::High), 2);
    }

    #[test]
    fn test_risk_buckets_do_not_depend_on_input_order() {
        let ordered = vec![
            record("Niger", 1, 10, 1, RiskLevel::High),
            record("Niger", 1, 10, 1, RiskLevel::Medium),
            record("Niger", 1, 10, 1, RiskLevel::High),
            record("Niger", 1, 10, 1, RiskLevel::Low),
        ];
        let expected = RiskBucketCounts { low: 1, medium: 1, high: 2 };
        assert_eq!(risk_bucket_counts(&ordered), expected);

        let mut reversed = ordered.clone();
        reversed.reverse();
        assert_eq!(risk_bucket_counts(&reversed), expected);

        let shuffled = vec![
            ordered[3].clone(),
            ordered[0].clone(),
            ordered[1].clone(),
            ordered[2].clone(),
        ];
        assert_eq!(risk_bucket_counts(&shuffled), expected);
    }

    #[test]
    fn test_severity_counts() {
        let alerts = vec![
            alert(RiskLevel::High, 1),
            alert(RiskLevel::Medium, 1),
            alert(RiskLevel::Medium, 1),
        ];
        let counts = severity_counts(&alerts);
        assert_eq!(counts.high, 1);
        assert_eq!(counts.medium, 2);
        assert_eq!(counts.low, 0);
    }

    #[test]
    fn test_niger_state_summary() {
        let records = vec![
            record("Niger", 450, 2800, 420, RiskLevel::High),
            record("Niger", 320, 1950, 285, RiskLevel::Medium),
            record("Niger", 180, 890, 156, RiskLevel::High),
            record("Rivers", 680, 4200, 630, RiskLevel::High),
        ];
        let summary = state_summary(&records, "Niger");

        assert_eq!(summary.community_count, 3);
        assert_eq!(summary.total_population, 5640);
        assert_eq!(summary.total_households, 950);
        assert_eq!(summary.total_vulnerable, 861);
        assert_eq!(summary.high_risk_community_count, 2);
    }

    #[test]
    fn test_unknown_state_summary_is_zero() {
        let records = vec![record("Niger", 450, 2800, 420, RiskLevel::High)];
        assert_eq!(state_summary(&records, "Kano"), StateSummary::default());
    }

    #[test]
    fn test_state_summaries_are_ordered_by_state() {
        let records = vec![
            record("Rivers", 680, 4200, 630, RiskLevel::High),
            record("Lagos", 220, 1350, 195, RiskLevel::Medium),
            record("Niger", 450, 2800, 420, RiskLevel::High),
        ];
        let summaries = state_summaries(&records);
        let names: Vec<_> = summaries.iter().map(|(s, _)| s.as_str()).collect();

        assert_eq!(names, vec!["Lagos", "Niger", "Rivers"]);
        assert_eq!(summaries[2].1.total_population, 4200);
    }

    #[test]
    fn test_delivery_stats_and_rate() {
        let messages = vec![
            message(MessageStatus::Pending),
            message(MessageStatus::Sent),
            message(MessageStatus::Delivered),
            message(MessageStatus::Delivered),
            message(MessageStatus::Delivered),
            message(MessageStatus::Failed),
        ];
        let stats = delivery_stats(&messages);

        assert_eq!(stats.total(), 6);
        assert_eq!(stats.delivered, 3);
        assert_eq!(stats.delivery_rate(), Some(0.75));
    }

    #[test]
    fn test_delivery_rate_undefined_without_resolved_messages() {
        let stats = delivery_stats(&[message(MessageStatus::Pending), message(MessageStatus::Sent)]);
        assert_eq!(stats.delivery_rate(), None);
    }
}
