//! Message delivery state machine.
//!
//! ```text
//! pending ──dispatch──▶ sent ──confirm(delivered)──▶ delivered
//!    │                   │
//!    │                   ├──confirm(undelivered)──▶ failed
//!    │                   └──fail──────────────────▶ failed
//!    ├──fail───────────────────────────────────────▶ failed
//!    └──cancel─────────────────────────────────────▶ failed
//! ```
//!
//! `delivered` and `failed` are terminal: any event applied to them is a
//! no-op that reports the current status. Pre-send validation (recipients,
//! body) is the store's job; this module only knows about states.

use crate::model::{DispatchFailure, HistoryAction, MessageStatus, RegistryError};

/// Carrier acknowledgment for a sent message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Undelivered,
}

/// Something that can happen to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    /// Operator pressed send.
    Dispatch,
    /// Carrier acknowledgment arrived.
    Confirm(DeliveryOutcome),
    /// Explicit failure signal, e.g. a provider error.
    Fail(DispatchFailure),
    /// Operator withdrew the message before it was sent.
    Cancel,
}

impl DispatchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DispatchEvent::Dispatch => "dispatch",
            DispatchEvent::Confirm(_) => "confirm delivery of",
            DispatchEvent::Fail(_) => "fail",
            DispatchEvent::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved { from: MessageStatus, to: MessageStatus },
    /// Terminal message; nothing happened.
    Unchanged(MessageStatus),
}

/// Computes the status that `event` moves a message in `current` to.
///
/// Terminal states always yield `Transition::Unchanged`. Events that make
/// no sense for a live message (confirming a message that was never sent,
/// sending twice, cancelling after send) are rejected with
/// `RegistryError::InvalidTransition`.
pub fn next_status(current: MessageStatus, event: &DispatchEvent) -> Result<Transition, RegistryError> {
    use DispatchEvent::*;
    use MessageStatus::*;

    if current.is_terminal() {
        return Ok(Transition::Unchanged(current));
    }

    let to = match (current, event) {
        (Pending, Dispatch) => Sent,
        (Pending, Fail(_)) | (Pending, Cancel) => Failed,
        (Sent, Confirm(DeliveryOutcome::Delivered)) => Delivered,
        (Sent, Confirm(DeliveryOutcome::Undelivered)) => Failed,
        (Sent, Fail(_)) => Failed,
        (from, event) => {
            return Err(RegistryError::InvalidTransition {
                from,
                action: event.name(),
            });
        }
    };

    Ok(Transition::Moved { from: current, to })
}

/// Audit label for an event that moved a message.
pub fn history_action(event: &DispatchEvent) -> HistoryAction {
    match event {
        DispatchEvent::Dispatch => HistoryAction::MessageSent,
        DispatchEvent::Confirm(DeliveryOutcome::Delivered) => HistoryAction::MessageDelivered,
        DispatchEvent::Confirm(DeliveryOutcome::Undelivered) | DispatchEvent::Fail(_) => {
            HistoryAction::MessageFailed
        }
        DispatchEvent::Cancel => HistoryAction::MessageCancelled,
    }
}

/// Reason to store on the message when `event` ends in `failed`.
pub fn failure_reason(event: &DispatchEvent) -> Option<String> {
    match event {
        DispatchEvent::Fail(failure) => Some(failure.to_string()),
        DispatchEvent::Confirm(DeliveryOutcome::Undelivered) => {
            Some(DispatchFailure::Undelivered.to_string())
        }
        DispatchEvent::Cancel => Some(DispatchFailure::Cancelled.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Channel;

    fn moved(from: MessageStatus, to: MessageStatus) -> Transition {
        Transition::Moved { from, to }
    }

    fn provider_error() -> DispatchEvent {
        DispatchEvent::Fail(DispatchFailure::Provider {
            channel: Channel::Sms,
            reason: "HTTP 503".to_string(),
        })
    }

    #[test]
    fn test_happy_path_pending_sent_delivered() {
        use MessageStatus::*;
        assert_eq!(next_status(Pending, &DispatchEvent::Dispatch).unwrap(), moved(Pending, Sent));
        assert_eq!(
            next_status(Sent, &DispatchEvent::Confirm(DeliveryOutcome::Delivered)).unwrap(),
            moved(Sent, Delivered)
        );
    }

    #[test]
    fn test_failure_paths() {
        use MessageStatus::*;
        assert_eq!(
            next_status(Sent, &DispatchEvent::Confirm(DeliveryOutcome::Undelivered)).unwrap(),
            moved(Sent, Failed)
        );
        assert_eq!(next_status(Sent, &provider_error()).unwrap(), moved(Sent, Failed));
        assert_eq!(next_status(Pending, &provider_error()).unwrap(), moved(Pending, Failed));
        assert_eq!(next_status(Pending, &DispatchEvent::Cancel).unwrap(), moved(Pending, Failed));
    }

    #[test]
    fn test_terminal_states_are_no_ops() {
        let events = [
            DispatchEvent::Dispatch,
            DispatchEvent::Confirm(DeliveryOutcome::Delivered),
            DispatchEvent::Confirm(DeliveryOutcome::Undelivered),
            provider_error(),
            DispatchEvent::Cancel,
        ];
        for terminal in [MessageStatus::Delivered, MessageStatus::Failed] {
            for event in &events {
                assert_eq!(
                    next_status(terminal, event).unwrap(),
                    Transition::Unchanged(terminal),
                    "{:?} on {:?} should be a no-op",
                    event,
                    terminal
                );
            }
        }
    }

    #[test]
    fn test_out_of_order_events_are_rejected() {
        use MessageStatus::*;
        for (from, event) in [
            (Pending, DispatchEvent::Confirm(DeliveryOutcome::Delivered)),
            (Sent, DispatchEvent::Dispatch),
            (Sent, DispatchEvent::Cancel),
        ] {
            let err = next_status(from, &event).unwrap_err();
            assert!(
                matches!(err, RegistryError::InvalidTransition { from: f, .. } if f == from),
                "expected InvalidTransition from {:?}, got {:?}",
                from,
                err
            );
        }
    }

    #[test]
    fn test_history_labels_and_failure_reasons() {
        assert_eq!(history_action(&DispatchEvent::Dispatch), HistoryAction::MessageSent);
        assert_eq!(history_action(&DispatchEvent::Cancel), HistoryAction::MessageCancelled);
        assert_eq!(history_action(&provider_error()), HistoryAction::MessageFailed);

        assert_eq!(failure_reason(&DispatchEvent::Dispatch), None);
        assert_eq!(
            failure_reason(&DispatchEvent::Cancel).as_deref(),
            Some("dispatch cancelled before send")
        );
        assert_eq!(
            failure_reason(&provider_error()).as_deref(),
            Some("sms provider error: HTTP 503")
        );
    }
}
