//! Message dispatch against pluggable provider adapters.
//!
//! [`Dispatcher`] drives a stored message through the lifecycle:
//!
//! 1. mark it `sent` (validates recipients and body, appends history);
//! 2. hand it to a [`DispatchAdapter`] (`send_via`);
//! 3. wait for a [`DeliveryConfirmation`] and resolve to `delivered` or
//!    `failed`.
//!
//! The store lock is only held for the state changes, never across the
//! provider call or the confirmation wait, so concurrent dispatches and
//! ordinary store operations proceed independently.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::alert::lifecycle::DeliveryOutcome;
use crate::config::DispatchConfig;
use crate::logging::{self, Component};
use crate::model::{Channel, DispatchFailure, EntityId, MessageStatus, RegistryError};
use crate::store::SharedStore;

// ---------------------------------------------------------------------------
// Provider boundary
// ---------------------------------------------------------------------------

/// Provider answer to a hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub success: bool,
    pub provider_id: Option<String>,
}

/// Outbound channel provider (SMS gateway, WhatsApp Business, email, push).
#[async_trait]
pub trait DispatchAdapter: Send + Sync {
    async fn send_via(
        &self,
        channel: Channel,
        recipients: &[String],
        body: &str,
    ) -> Result<SendReceipt, DispatchFailure>;
}

/// Source of carrier acknowledgments for handed-off messages.
#[async_trait]
pub trait DeliveryConfirmation: Send + Sync {
    async fn await_outcome(&self, message_id: EntityId, receipt: &SendReceipt) -> DeliveryOutcome;
}

// ---------------------------------------------------------------------------
// Simulated provider
// ---------------------------------------------------------------------------

/// Stand-in gateway used in demo mode. Accepts every message after
/// `latency` unless constructed with [`SimulatedGateway::offline`].
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    latency: Duration,
    online: bool,
}

impl SimulatedGateway {
    pub fn new(latency: Duration) -> Self {
        Self { latency, online: true }
    }

    /// A gateway whose every call fails with a provider error.
    pub fn offline() -> Self {
        Self {
            latency: Duration::ZERO,
            online: false,
        }
    }
}

#[async_trait]
impl DispatchAdapter for SimulatedGateway {
    async fn send_via(
        &self,
        channel: Channel,
        recipients: &[String],
        _body: &str,
    ) -> Result<SendReceipt, DispatchFailure> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if !self.online {
            return Err(DispatchFailure::Provider {
                channel,
                reason: "gateway offline".to_string(),
            });
        }
        logging::debug(
            Component::Dispatch,
            None,
            &format!("simulated {} hand-off to {} recipient(s)", channel, recipients.len()),
        );
        Ok(SendReceipt {
            success: true,
            provider_id: Some(format!("sim-{}", Uuid::new_v4())),
        })
    }
}

// ---------------------------------------------------------------------------
// Outcome sources
// ---------------------------------------------------------------------------

/// Default delivery success rate for carrier acknowledgments.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.98;

/// Resolves each confirmation as delivered with probability `rate`.
///
/// Seeding the RNG makes a run reproducible.
pub struct SuccessRatePolicy {
    rate: f64,
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl SuccessRatePolicy {
    /// `rate` is clamped to 0.0..=1.0; NaN falls back to
    /// `DEFAULT_SUCCESS_RATE`. Without a seed the RNG is seeded from the OS.
    pub fn new(rate: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let rate = if rate.is_nan() {
            logging::warn(
                Component::Dispatch,
                None,
                &format!("success rate is NaN, using {}", DEFAULT_SUCCESS_RATE),
            );
            DEFAULT_SUCCESS_RATE
        } else {
            rate.clamp(0.0, 1.0)
        };
        Self {
            rate,
            latency: Duration::ZERO,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn draw(&self) -> DeliveryOutcome {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if rng.gen_bool(self.rate) {
            DeliveryOutcome::Delivered
        } else {
            DeliveryOutcome::Undelivered
        }
    }
}

#[async_trait]
impl DeliveryConfirmation for SuccessRatePolicy {
    async fn await_outcome(&self, _message_id: EntityId, _receipt: &SendReceipt) -> DeliveryOutcome {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.draw()
    }
}

/// Replays a fixed sequence of outcomes, then `fallback` once exhausted.
pub struct ScriptedOutcomes {
    outcomes: Mutex<VecDeque<DeliveryOutcome>>,
    fallback: DeliveryOutcome,
}

impl ScriptedOutcomes {
    pub fn new(outcomes: impl IntoIterator<Item = DeliveryOutcome>, fallback: DeliveryOutcome) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            fallback,
        }
    }

    /// Every confirmation reports `outcome`.
    pub fn always(outcome: DeliveryOutcome) -> Self {
        Self::new([], outcome)
    }
}

#[async_trait]
impl DeliveryConfirmation for ScriptedOutcomes {
    async fn await_outcome(&self, _message_id: EntityId, _receipt: &SendReceipt) -> DeliveryOutcome {
        let mut outcomes = match self.outcomes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        outcomes.pop_front().unwrap_or(self.fallback)
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Dispatcher {
    store: SharedStore,
    adapter: Arc<dyn DispatchAdapter>,
    confirmation: Arc<dyn DeliveryConfirmation>,
}

impl Dispatcher {
    pub fn new(
        store: SharedStore,
        adapter: Arc<dyn DispatchAdapter>,
        confirmation: Arc<dyn DeliveryConfirmation>,
    ) -> Self {
        Self {
            store,
            adapter,
            confirmation,
        }
    }

    /// Demo-mode dispatcher: simulated gateway plus the configured success
    /// rate.
    pub fn simulated(store: SharedStore, config: &DispatchConfig) -> Self {
        let adapter = SimulatedGateway::new(Duration::from_millis(config.send_latency_ms));
        let confirmation = SuccessRatePolicy::new(config.success_rate, config.seed)
            .with_latency(Duration::from_millis(config.confirm_latency_ms));
        Self::new(store, Arc::new(adapter), Arc::new(confirmation))
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Send one stored message and wait for its final status.
    ///
    /// Terminal messages are returned unchanged without contacting the
    /// provider. Validation failures leave the message `pending` and are
    /// returned as errors. Provider failures and undelivered confirmations
    /// are not errors: the message ends `failed` and that status is returned.
    pub async fn dispatch(&self, message_id: EntityId) -> Result<MessageStatus, RegistryError> {
        let message = {
            let mut store = self.store.lock().await;
            let current = store.get_message(message_id)?;
            if current.status.is_terminal() {
                return Ok(current.status);
            }
            store.mark_sent(message_id)?;
            store.get_message(message_id)?
        };
        let id = message_id.to_string();
        logging::info(
            Component::Dispatch,
            Some(&id),
            &format!(
                "{} {} message sent to {} recipient(s)",
                message.priority,
                message.channel,
                message.recipients.len()
            ),
        );

        let receipt = match self
            .adapter
            .send_via(message.channel, &message.recipients, &message.body)
            .await
        {
            Ok(receipt) if receipt.success => receipt,
            Ok(_) => {
                return self
                    .fail(message_id, DispatchFailure::Rejected { channel: message.channel })
                    .await;
            }
            Err(failure) => return self.fail(message_id, failure).await,
        };

        if let Some(provider_id) = &receipt.provider_id {
            self.store.lock().await.record_provider_id(message_id, provider_id)?;
        }

        let outcome = self.confirmation.await_outcome(message_id, &receipt).await;
        let status = self.store.lock().await.confirm_delivery(message_id, outcome)?;
        match status {
            MessageStatus::Delivered => logging::info(Component::Dispatch, Some(&id), "message delivered"),
            MessageStatus::Failed => logging::log_dispatch_failure(&id, &DispatchFailure::Undelivered),
            _ => {}
        }
        Ok(status)
    }

    /// Dispatch several messages concurrently. Results arrive in completion
    /// order, not input order.
    pub async fn dispatch_all(
        &self,
        message_ids: &[EntityId],
    ) -> Vec<(EntityId, Result<MessageStatus, RegistryError>)> {
        let mut tasks = JoinSet::new();
        for &id in message_ids {
            let dispatcher = self.clone();
            tasks.spawn(async move { (id, dispatcher.dispatch(id).await) });
        }

        let mut results = Vec::with_capacity(message_ids.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => logging::error(Component::Dispatch, None, &format!("dispatch task aborted: {}", e)),
            }
        }

        let delivered = results
            .iter()
            .filter(|(_, r)| matches!(r, Ok(MessageStatus::Delivered)))
            .count();
        logging::log_dispatch_summary(results.len(), delivered, results.len() - delivered);
        results
    }

    async fn fail(&self, message_id: EntityId, failure: DispatchFailure) -> Result<MessageStatus, RegistryError> {
        logging::log_dispatch_failure(&message_id.to_string(), &failure);
        self.store.lock().await.mark_failed(message_id, failure)
    }
}
