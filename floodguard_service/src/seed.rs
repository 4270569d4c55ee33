/// Demo data for development and walkthroughs.
///
/// When no field data has been entered yet, use this module to populate a
/// store with a realistic set of alerts, community records and contact
/// groups. Everything goes through the regular store operations, so the
/// seeded state passes the same validation and produces the same history
/// as operator input.

use serde::Serialize;

use crate::contacts::default_contact_groups;
use crate::logging::{self, Component};
use crate::model::{NewAlert, PopulationRecordInput, RegistryError, RiskLevel};
use crate::store::EntityStore;

/// What `seed_demo_data` loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub alerts: usize,
    pub population_records: usize,
    pub contact_groups: usize,
}

/// Active alerts for Niger, Rivers and Lagos states.
pub fn demo_alerts() -> Vec<NewAlert> {
    vec![
        NewAlert {
            location: "Bosso Ward, Minna, Niger State".to_string(),
            severity: RiskLevel::High,
            message: "URGENT: Heavy rainfall detected. River level rising rapidly. \
                      Evacuate low-lying areas immediately."
                .to_string(),
            affected_population: 12_000,
            risk_level: 85,
        },
        NewAlert {
            location: "Mile 1 Diobu, Port Harcourt, Rivers State".to_string(),
            severity: RiskLevel::High,
            message: "HIGH FLOOD RISK: Excessive rainfall in upstream areas. \
                      Prepare for possible flooding in next 6 hours."
                .to_string(),
            affected_population: 8_500,
            risk_level: 78,
        },
        NewAlert {
            location: "Tunga Ward, Minna, Niger State".to_string(),
            severity: RiskLevel::Medium,
            message: "ALERT DELIVERED: Flood warning successfully sent to 3,200 residents \
                      via SMS and USSD."
                .to_string(),
            affected_population: 3_200,
            risk_level: 45,
        },
        NewAlert {
            location: "Victoria Island, Lagos State".to_string(),
            severity: RiskLevel::Medium,
            message: "MODERATE RISK: Coastal flooding possible due to high tide and \
                      rainfall combination."
                .to_string(),
            affected_population: 5_600,
            risk_level: 52,
        },
    ]
}

/// Community records with their local contact person.
pub fn demo_population_records() -> Vec<PopulationRecordInput> {
    let record = |state: &str,
                  lga: &str,
                  ward: &str,
                  community: &str,
                  counts: (i64, i64, i64),
                  contact: (&str, &str),
                  risk_level: RiskLevel| PopulationRecordInput {
        id: None,
        state: state.to_string(),
        lga: lga.to_string(),
        ward: ward.to_string(),
        community: community.to_string(),
        households: counts.0,
        population: counts.1,
        vulnerable_population: counts.2,
        contact_person: contact.0.to_string(),
        phone_number: contact.1.to_string(),
        risk_level,
    };

    vec![
        record(
            "Niger",
            "Bosso",
            "Bosso Ward A",
            "Gbaiko Village",
            (450, 2800, 420),
            ("Malam Sani Ibrahim", "+234-803-123-4567"),
            RiskLevel::High,
        ),
        record(
            "Niger",
            "Bosso",
            "Tunga Ward",
            "Tunga Central",
            (320, 1950, 285),
            ("Mrs. Fatima Usman", "+234-807-987-6543"),
            RiskLevel::Medium,
        ),
        record(
            "Niger",
            "Chanchaga",
            "Chanchaga Ward",
            "Chanchaga Riverside",
            (180, 890, 156),
            ("Chief John Adamu", "+234-809-456-7890"),
            RiskLevel::High,
        ),
        record(
            "Rivers",
            "Port Harcourt",
            "Diobu Ward",
            "Mile 1 Diobu",
            (680, 4200, 630),
            ("Elder Samuel Okoro", "+234-811-234-5678"),
            RiskLevel::High,
        ),
        record(
            "Lagos",
            "Eti-Osa",
            "Victoria Island",
            "Bar Beach Area",
            (220, 1350, 195),
            ("Mrs. Adenike Johnson", "+234-812-345-6789"),
            RiskLevel::Medium,
        ),
    ]
}

/// Loads the demo alerts, records and contact groups into `store`.
///
/// Stops at the first rejected entity; entities created before it stay.
pub fn seed_demo_data(store: &mut EntityStore) -> Result<SeedSummary, RegistryError> {
    let mut summary = SeedSummary {
        alerts: 0,
        population_records: 0,
        contact_groups: 0,
    };

    for alert in demo_alerts() {
        store.create_alert(alert)?;
        summary.alerts += 1;
    }
    for record in demo_population_records() {
        store.upsert_population_record(record)?;
        summary.population_records += 1;
    }
    let groups = default_contact_groups();
    summary.contact_groups = groups.len();
    store.load_contact_groups(groups);

    logging::info(
        Component::System,
        None,
        &format!(
            "Demo data loaded: {} alerts, {} population records, {} contact groups",
            summary.alerts, summary.population_records, summary.contact_groups
        ),
    );
    Ok(summary)
}
