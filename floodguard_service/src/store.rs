/// In-memory entity store for alerts, population records, messages,
/// contact groups, and the dispatch history.
///
/// The store is constructed once at start-up and handed to consumers by
/// reference (or wrapped in `SharedStore` for the async dispatcher). Every
/// read returns owned copies, so callers cannot reach into store state.
/// Every mutation validates first and only then writes, so a rejected call
/// leaves the store exactly as it was.
///
/// # Clock injection
/// Timestamps come from a `Clock` rather than `Utc::now()` directly so tests
/// can pin "now".

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::alert::lifecycle::{self, DeliveryOutcome, DispatchEvent, Transition};
use crate::logging::{self, Component};
use crate::model::{
    Alert, ContactGroup, DispatchFailure, EntityId, EntityKind, HistoryAction, HistoryEntry,
    Message, MessageStatus, NewAlert, NewMessage, PopulationRecord, PopulationRecordInput,
    RegistryError, ValidationError,
};

/// Store shared between the dispatcher and UI-side callers.
pub type SharedStore = Arc<tokio::sync::Mutex<EntityStore>>;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct EntityStore {
    clock: Arc<dyn Clock>,
    alerts: Vec<Alert>,
    population: Vec<PopulationRecord>,
    messages: Vec<Message>,
    contact_groups: Vec<ContactGroup>,
    history: Vec<HistoryEntry>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            alerts: Vec::new(),
            population: Vec::new(),
            messages: Vec::new(),
            contact_groups: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Wrap the store for sharing with a `Dispatcher`.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    // --- Alerts -------------------------------------------------------------

    /// Validate and store a new alert with a fresh id and the current time.
    pub fn create_alert(&mut self, fields: NewAlert) -> Result<Alert, RegistryError> {
        if !(0..=100).contains(&fields.risk_level) {
            return Err(self.reject(ValidationError::RiskLevelOutOfRange(fields.risk_level)));
        }
        let affected_population = non_negative("affected_population", fields.affected_population)
            .map_err(|e| self.reject(e))?;

        let now = self.clock.now();
        let alert = Alert {
            id: Uuid::new_v4(),
            location: fields.location,
            severity: fields.severity,
            message: fields.message,
            affected_population,
            // Range checked above.
            risk_level: fields.risk_level as u8,
            timestamp: now,
        };

        self.history.push(HistoryEntry {
            time: now,
            entity_id: alert.id,
            action: HistoryAction::AlertCreated,
            recipient_count: 0,
        });
        self.alerts.push(alert.clone());

        logging::info(
            Component::Store,
            Some(&alert.id.to_string()),
            &format!("alert created for {} ({} severity)", alert.location, alert.severity),
        );
        Ok(alert)
    }

    pub fn list_alerts(&self) -> Vec<Alert> {
        self.alerts.clone()
    }

    pub fn get_alert(&self, id: EntityId) -> Result<Alert, RegistryError> {
        self.alerts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(RegistryError::NotFound {
                kind: EntityKind::Alert,
                id,
            })
    }

    // --- Population records -------------------------------------------------

    /// Insert or replace a population record.
    ///
    /// A record whose `id` matches an existing entry replaces it in place;
    /// any other record is inserted under a fresh id. `last_updated` is set
    /// to today in both cases.
    pub fn upsert_population_record(
        &mut self,
        record: PopulationRecordInput,
    ) -> Result<PopulationRecord, RegistryError> {
        let households = non_negative("households", record.households).map_err(|e| self.reject(e))?;
        let population = non_negative("population", record.population).map_err(|e| self.reject(e))?;
        let vulnerable_population = non_negative("vulnerable_population", record.vulnerable_population)
            .map_err(|e| self.reject(e))?;
        if vulnerable_population > population {
            return Err(self.reject(ValidationError::VulnerableExceedsPopulation {
                vulnerable: record.vulnerable_population,
                population: record.population,
            }));
        }

        let existing = record
            .id
            .and_then(|id| self.population.iter().position(|r| r.id == id));
        let stored = PopulationRecord {
            id: match existing {
                Some(index) => self.population[index].id,
                None => Uuid::new_v4(),
            },
            state: record.state,
            lga: record.lga,
            ward: record.ward,
            community: record.community,
            households,
            population,
            vulnerable_population,
            contact_person: record.contact_person,
            phone_number: record.phone_number,
            risk_level: record.risk_level,
            last_updated: self.clock.now().date_naive(),
        };

        let id = stored.id.to_string();
        match existing {
            Some(index) => {
                self.population[index] = stored.clone();
                logging::info(Component::Store, Some(&id), "population record updated");
            }
            None => {
                self.population.push(stored.clone());
                logging::info(
                    Component::Store,
                    Some(&id),
                    &format!("population record added for {}, {}", stored.community, stored.state),
                );
            }
        }
        Ok(stored)
    }

    /// All records, or only those whose `state` matches exactly.
    pub fn list_population_records(&self, filter_by_state: Option<&str>) -> Vec<PopulationRecord> {
        self.population
            .iter()
            .filter(|r| filter_by_state.is_none_or(|state| r.state == state))
            .cloned()
            .collect()
    }

    pub fn get_population_record(&self, id: EntityId) -> Result<PopulationRecord, RegistryError> {
        self.population
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RegistryError::NotFound {
                kind: EntityKind::PopulationRecord,
                id,
            })
    }

    // --- Messages -----------------------------------------------------------

    /// Store a composed message in `pending`.
    ///
    /// Recipients are trimmed and de-duplicated (first occurrence wins).
    pub fn create_message(&mut self, fields: NewMessage) -> Result<Message, RegistryError> {
        let recipients = normalize_recipients(fields.recipients);
        validate_sendable(&recipients, &fields.body).map_err(|e| self.reject(e))?;

        let now = self.clock.now();
        let message = Message {
            id: Uuid::new_v4(),
            recipients,
            subject: fields.subject,
            body: fields.body,
            channel: fields.channel,
            priority: fields.priority,
            language: fields.language,
            status: MessageStatus::Pending,
            provider_id: None,
            failure_reason: None,
            timestamp: now,
            updated_at: now,
        };
        self.messages.push(message.clone());

        logging::debug(
            Component::Store,
            Some(&message.id.to_string()),
            &format!(
                "{} message composed for {} recipient(s)",
                message.channel,
                message.recipients.len()
            ),
        );
        Ok(message)
    }

    /// Edit the recipients and body of a message that is still `pending`.
    ///
    /// Drafts are not validated here; `mark_sent` re-checks them before the
    /// message can leave `pending`.
    pub fn revise_message(
        &mut self,
        id: EntityId,
        recipients: Vec<String>,
        body: String,
    ) -> Result<Message, RegistryError> {
        let now = self.clock.now();
        let message = self.message_mut(id)?;
        if message.status != MessageStatus::Pending {
            return Err(RegistryError::InvalidTransition {
                from: message.status,
                action: "revise",
            });
        }
        message.recipients = normalize_recipients(recipients);
        message.body = body;
        message.updated_at = now;
        Ok(message.clone())
    }

    pub fn list_messages(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn get_message(&self, id: EntityId) -> Result<Message, RegistryError> {
        self.messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(RegistryError::NotFound {
                kind: EntityKind::Message,
                id,
            })
    }

    /// Remember the provider's reference for a handed-off message. Only a
    /// `sent` message is awaiting its provider, so drafts and resolved
    /// messages are rejected unchanged.
    pub fn record_provider_id(&mut self, id: EntityId, provider_id: &str) -> Result<(), RegistryError> {
        let message = self.message_mut(id)?;
        if message.status != MessageStatus::Sent {
            return Err(RegistryError::InvalidTransition {
                from: message.status,
                action: "record a provider id for",
            });
        }
        message.provider_id = Some(provider_id.to_string());
        Ok(())
    }

    // --- Dispatch transitions -----------------------------------------------

    /// `pending → sent`. Fails with a validation error (message stays
    /// `pending`) when there are no recipients or the body is blank.
    pub fn mark_sent(&mut self, id: EntityId) -> Result<MessageStatus, RegistryError> {
        self.apply(id, DispatchEvent::Dispatch)
    }

    /// `sent → delivered | failed` from a carrier acknowledgment.
    pub fn confirm_delivery(
        &mut self,
        id: EntityId,
        outcome: DeliveryOutcome,
    ) -> Result<MessageStatus, RegistryError> {
        self.apply(id, DispatchEvent::Confirm(outcome))
    }

    /// Any non-terminal state `→ failed`. Not retried.
    pub fn mark_failed(
        &mut self,
        id: EntityId,
        failure: DispatchFailure,
    ) -> Result<MessageStatus, RegistryError> {
        self.apply(id, DispatchEvent::Fail(failure))
    }

    /// Withdraw a message that has not been sent yet.
    pub fn cancel_message(&mut self, id: EntityId) -> Result<MessageStatus, RegistryError> {
        self.apply(id, DispatchEvent::Cancel)
    }

    fn apply(&mut self, id: EntityId, event: DispatchEvent) -> Result<MessageStatus, RegistryError> {
        let now = self.clock.now();
        let message = self.message_mut(id)?;

        if message.status == MessageStatus::Pending && matches!(event, DispatchEvent::Dispatch) {
            if let Err(e) = validate_sendable(&message.recipients, &message.body) {
                logging::warn(
                    Component::Dispatch,
                    Some(&id.to_string()),
                    &format!("dispatch refused: {}", e),
                );
                return Err(e.into());
            }
        }

        let to = match lifecycle::next_status(message.status, &event)? {
            Transition::Unchanged(status) => return Ok(status),
            Transition::Moved { to, .. } => to,
        };

        message.status = to;
        message.updated_at = now;
        if let Some(reason) = lifecycle::failure_reason(&event) {
            message.failure_reason = Some(reason);
        }
        let entry = HistoryEntry {
            time: now,
            entity_id: id,
            action: lifecycle::history_action(&event),
            recipient_count: message.recipients.len(),
        };
        self.history.push(entry);
        Ok(to)
    }

    fn message_mut(&mut self, id: EntityId) -> Result<&mut Message, RegistryError> {
        self.messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(RegistryError::NotFound {
                kind: EntityKind::Message,
                id,
            })
    }

    // --- Contacts and history -----------------------------------------------

    /// Replace the contact reference data in one go.
    pub fn load_contact_groups(&mut self, groups: Vec<ContactGroup>) {
        logging::debug(
            Component::Store,
            None,
            &format!("loaded {} contact group(s)", groups.len()),
        );
        self.contact_groups = groups;
    }

    pub fn list_contact_groups(&self) -> Vec<ContactGroup> {
        self.contact_groups.clone()
    }

    /// Append-only audit trail, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.clone()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn reject(&self, error: ValidationError) -> RegistryError {
        logging::warn(Component::Store, None, &format!("rejected input: {}", error));
        error.into()
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn non_negative(field: &'static str, value: i64) -> Result<u64, ValidationError> {
    u64::try_from(value).map_err(|_| ValidationError::NegativeCount { field, value })
}

fn normalize_recipients(recipients: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(recipients.len());
    for recipient in recipients {
        let recipient = recipient.trim().to_string();
        if !recipient.is_empty() && !seen.contains(&recipient) {
            seen.push(recipient);
        }
    }
    seen
}

fn validate_sendable(recipients: &[String], body: &str) -> Result<(), ValidationError> {
    if recipients.is_empty() {
        return Err(ValidationError::EmptyRecipients);
    }
    if body.trim().is_empty() {
        return Err(ValidationError::BlankBody);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
