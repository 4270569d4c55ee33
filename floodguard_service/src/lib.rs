/// FloodGuard risk-communication registry.
///
/// Keeps flood alerts, at-risk community records and outbound notification
/// messages for emergency coordinators, derives dashboard statistics from
/// them, and simulates message delivery through pluggable provider
/// adapters.
///
/// Layout:
/// - `model`: entities, tagged enums, error types
/// - `store`: the in-memory entity store and its clock
/// - `alert`: message lifecycle, async dispatch, recency labels
/// - `analysis`: aggregates, groupings, SMS segment estimates
/// - `language`: supported languages and message templates
/// - `contacts`: default recipient groups
/// - `session`: persisted operator session
/// - `config`, `logging`: runtime configuration and tracing setup
/// - `seed`, `verify`: demo data and integrity checks

pub mod alert;
pub mod analysis;
pub mod config;
pub mod contacts;
pub mod language;
pub mod logging;
pub mod model;
pub mod seed;
pub mod session;
pub mod store;
pub mod verify;
