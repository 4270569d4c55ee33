/// Message delivery for the registry.
///
/// Submodules:
/// - `lifecycle`: the pending → sent → delivered/failed state machine.
/// - `dispatch`: provider adapters, delivery outcome sources, and the
///   async `Dispatcher`.
/// - `recency`: "N minutes ago" labels for alert and message timestamps.

pub mod dispatch;
pub mod lifecycle;
pub mod recency;
