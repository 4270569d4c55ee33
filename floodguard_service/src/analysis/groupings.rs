//! Groups flat population record lists by administrative area.
//!
//! `BTreeMap` keys keep the output ordered by name so summaries render in a
//! stable order regardless of insertion order in the store.

use std::collections::BTreeMap;

use crate::model::PopulationRecord;

/// Records keyed by state name.
pub fn group_by_state(records: &[PopulationRecord]) -> BTreeMap<&str, Vec<&PopulationRecord>> {
    let mut groups: BTreeMap<&str, Vec<&PopulationRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.state.as_str()).or_default().push(record);
    }
    groups
}

/// Records of one state keyed by LGA.
pub fn group_by_lga<'a>(
    records: &'a [PopulationRecord],
    state: &str,
) -> BTreeMap<&'a str, Vec<&'a PopulationRecord>> {
    let mut groups: BTreeMap<&str, Vec<&PopulationRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.state == state) {
        groups.entry(record.lga.as_str()).or_default().push(record);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RiskLevel;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn record(state: &str, lga: &str, community: &str) -> PopulationRecord {
        PopulationRecord {
            id: Uuid::new_v4(),
            state: state.to_string(),
            lga: lga.to_string(),
            ward: String::new(),
            community: community.to_string(),
            households: 10,
            population: 50,
            vulnerable_population: 5,
            contact_person: String::new(),
            phone_number: String::new(),
            risk_level: RiskLevel::Low,
            last_updated: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_group_by_state_is_sorted_by_name() {
        let records = vec![
            record("Rivers", "Port Harcourt", "Mile 1 Diobu"),
            record("Niger", "Bosso", "Gbaiko Village"),
            record("Niger", "Chanchaga", "Chanchaga Riverside"),
        ];
        let groups = group_by_state(&records);

        let states: Vec<_> = groups.keys().copied().collect();
        assert_eq!(states, vec!["Niger", "Rivers"]);
        assert_eq!(groups["Niger"].len(), 2);
    }

    #[test]
    fn test_group_by_lga_ignores_other_states() {
        let records = vec![
            record("Niger", "Bosso", "Gbaiko Village"),
            record("Niger", "Bosso", "Tunga Central"),
            record("Niger", "Chanchaga", "Chanchaga Riverside"),
            record("Lagos", "Bosso", "Not Niger"),
        ];
        let groups = group_by_lga(&records, "Niger");

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["Bosso"].len(), 2);
        assert!(groups["Bosso"].iter().all(|r| r.state == "Niger"));
    }

    #[test]
    fn test_empty_input_gives_empty_groups() {
        assert!(group_by_state(&[]).is_empty());
        assert!(group_by_lga(&[], "Niger").is_empty());
    }
}
