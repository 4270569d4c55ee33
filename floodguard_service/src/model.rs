/// Core data types for the FloodGuard risk-communication registry.
///
/// This module defines the shared domain model imported by all other
/// modules: alerts, population records, notification messages, contact
/// groups, dispatch history and the error taxonomy. Severity, priority,
/// status and channel are tagged enums parsed at the boundary via `FromStr`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::language::MessageLanguage;

/// Identifier for every entity owned by the store.
pub type EntityId = Uuid;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Discrete risk bucket used for alert severity and for population records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(ValidationError::UnknownValue {
                kind: "risk level",
                value: s.to_string(),
            }),
        }
    }
}

/// Message urgency as chosen by the operator in the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(ValidationError::UnknownValue {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// Outbound delivery channel for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    WhatsApp,
    Email,
    Push,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::WhatsApp => "whatsapp",
            Channel::Email => "email",
            Channel::Push => "push",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sms" => Ok(Channel::Sms),
            "whatsapp" => Ok(Channel::WhatsApp),
            "email" => Ok(Channel::Email),
            "push" => Ok(Channel::Push),
            _ => Err(ValidationError::UnknownValue {
                kind: "channel",
                value: s.to_string(),
            }),
        }
    }
}

/// Delivery state of a message. See `alert::lifecycle` for the allowed
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sent,
    Delivered,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Failed => "failed",
        }
    }

    /// `delivered` and `failed` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageStatus::Delivered | MessageStatus::Failed)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// An operator-issued flood-risk notice. Immutable once stored.
///
/// `severity` and `risk_level` are supplied independently; the registry
/// does not derive one from the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: EntityId,
    pub location: String,
    pub severity: RiskLevel,
    pub message: String,
    pub affected_population: u64,
    /// Percentage in 0..=100.
    pub risk_level: u8,
    pub timestamp: DateTime<Utc>,
}

/// Raw alert fields as submitted by an operator form.
///
/// Numeric fields are signed so out-of-range input can be reported as a
/// validation error rather than being unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub location: String,
    pub severity: RiskLevel,
    pub message: String,
    pub affected_population: i64,
    pub risk_level: i32,
}

// ---------------------------------------------------------------------------
// Population registry
// ---------------------------------------------------------------------------

/// Census-style record for one community, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub id: EntityId,
    pub state: String,
    /// Local Government Area.
    pub lga: String,
    pub ward: String,
    pub community: String,
    pub households: u64,
    pub population: u64,
    /// Elderly, children and disabled residents. Never exceeds `population`.
    pub vulnerable_population: u64,
    pub contact_person: String,
    pub phone_number: String,
    pub risk_level: RiskLevel,
    pub last_updated: NaiveDate,
}

/// Upsert payload for a population record. `id: None` (or an id the store
/// does not know) inserts a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRecordInput {
    pub id: Option<EntityId>,
    pub state: String,
    pub lga: String,
    pub ward: String,
    pub community: String,
    pub households: i64,
    pub population: i64,
    pub vulnerable_population: i64,
    pub contact_person: String,
    pub phone_number: String,
    pub risk_level: RiskLevel,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A notification addressed to one or more contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: EntityId,
    pub recipients: Vec<String>,
    /// Only meaningful for email.
    pub subject: Option<String>,
    pub body: String,
    pub channel: Channel,
    pub priority: Priority,
    pub language: MessageLanguage,
    pub status: MessageStatus,
    /// Set once a provider accepts the hand-off.
    pub provider_id: Option<String>,
    /// Set on transition to `failed`.
    pub failure_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Composer output used to create a pending message.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub recipients: Vec<String>,
    pub subject: Option<String>,
    pub body: String,
    pub channel: Channel,
    pub priority: Priority,
    pub language: MessageLanguage,
}

// ---------------------------------------------------------------------------
// Dispatch history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    AlertCreated,
    MessageSent,
    MessageDelivered,
    MessageFailed,
    MessageCancelled,
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HistoryAction::AlertCreated => "alert created",
            HistoryAction::MessageSent => "message sent",
            HistoryAction::MessageDelivered => "message delivered",
            HistoryAction::MessageFailed => "message failed",
            HistoryAction::MessageCancelled => "message cancelled",
        };
        f.write_str(label)
    }
}

/// Append-only audit entry. Never mutated after it is pushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub time: DateTime<Utc>,
    /// The alert or message this entry describes.
    pub entity_id: EntityId,
    pub action: HistoryAction,
    pub recipient_count: usize,
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: String,
}

/// Read-only reference group of contacts, loaded once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactGroup {
    pub id: String,
    pub name: String,
    pub contacts: Vec<Contact>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Bad input shape or range. Always recoverable; never changes store state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("risk level must be between 0 and 100, got {0}")]
    RiskLevelOutOfRange(i32),

    #[error("{field} must not be negative, got {value}")]
    NegativeCount { field: &'static str, value: i64 },

    #[error("vulnerable population ({vulnerable}) exceeds population ({population})")]
    VulnerableExceedsPopulation { vulnerable: i64, population: i64 },

    #[error("at least one recipient is required")]
    EmptyRecipients,

    #[error("message body must not be blank")]
    BlankBody,

    #[error("unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },
}

/// Why a dispatch ended in `failed`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchFailure {
    /// The provider answered but refused the message.
    #[error("{channel} provider rejected the message")]
    Rejected { channel: Channel },

    /// The provider could not be reached or errored.
    #[error("{channel} provider error: {reason}")]
    Provider { channel: Channel, reason: String },

    /// Carrier acknowledgment reported non-delivery.
    #[error("carrier reported the message undelivered")]
    Undelivered,

    #[error("dispatch cancelled before send")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Alert,
    PopulationRecord,
    Message,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Alert => write!(f, "alert"),
            EntityKind::PopulationRecord => write!(f, "population record"),
            EntityKind::Message => write!(f, "message"),
        }
    }
}

/// Top-level error returned by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("cannot {action} a message that is {from}")]
    InvalidTransition {
        from: MessageStatus,
        action: &'static str,
    },

    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchFailure),

    #[error("session storage error at {path}: {source}")]
    Session {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session encoding error: {0}")]
    SessionEncoding(#[from] serde_json::Error),

    #[error("cannot read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config value for {key}: {reason}")]
    ConfigValue { key: String, reason: String },

    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("HIGH".parse::<RiskLevel>(), Ok(RiskLevel::High));
        assert_eq!(" critical ".parse::<Priority>(), Ok(Priority::Critical));
        assert_eq!("WhatsApp".parse::<Channel>(), Ok(Channel::WhatsApp));
    }

    #[test]
    fn test_unknown_enum_value_is_validation_error() {
        let err = "severe".parse::<RiskLevel>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownValue {
                kind: "risk level",
                value: "severe".to_string()
            }
        );
        assert_eq!(err.to_string(), "unknown risk level 'severe'");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!MessageStatus::Pending.is_terminal());
        assert!(!MessageStatus::Sent.is_terminal());
        assert!(MessageStatus::Delivered.is_terminal());
        assert!(MessageStatus::Failed.is_terminal());
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Channel::WhatsApp).unwrap(), "\"whatsapp\"");
        assert_eq!(serde_json::to_string(&MessageStatus::Delivered).unwrap(), "\"delivered\"");
        assert_eq!(serde_json::to_string(&HistoryAction::MessageSent).unwrap(), "\"message_sent\"");
    }

    #[test]
    fn test_history_action_display_matches_audit_labels() {
        assert_eq!(HistoryAction::MessageSent.to_string(), "message sent");
        assert_eq!(HistoryAction::AlertCreated.to_string(), "alert created");
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = RegistryError::InvalidTransition {
            from: MessageStatus::Sent,
            action: "cancel",
        };
        assert_eq!(err.to_string(), "cannot cancel a message that is sent");
    }
}
