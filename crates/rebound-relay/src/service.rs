//! # Relay Service
//!
//! Production service wiring the callback dispatcher, the flow mirror engine,
//! and the governance operations onto the [`FlowLedger`] port.
//!
//! ## Failure containment
//!
//! The host treats any failure escaping a callback as grounds for jailing the
//! relay. Before-phases reject through the normal rejection channel; once an
//! effectful phase runs, every ledger failure is caught here, logged, counted,
//! and folded into a successful callback result. The same containment applies
//! to every host-facing call made by the emergency sweep.

use crate::adapters::{InMemoryEventSink, InMemoryLedger};
use crate::domain::entities::{CallbackContext, FlowTermination, GovernanceState, MirrorOutcome};
use crate::domain::services::{derive_seed, select_tier};
use crate::domain::value_objects::{Address, FlowRate, RarityTable, RarityTier, Token, U256};
use crate::errors::{AdminError, CallbackError, LedgerError};
use crate::events::RelayEvent;
use crate::ports::inbound::{FlowLifecycleApi, RelayAdminApi};
use crate::ports::outbound::{EventSink, FlowLedger};

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Relay service configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// The designated host; the only caller allowed on the callback surface.
    pub host: Address,
    /// The relay's own address on the host ledger.
    pub relay: Address,
    /// Fixed beneficiary for outbound mirrors. When unset, mirrors flow back
    /// to each sender.
    pub beneficiary: Option<Address>,
    /// Initial owner.
    pub owner: Address,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: Address::ZERO,
            relay: Address::ZERO,
            beneficiary: None,
            owner: Address::ZERO,
        }
    }
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Counters maintained by the relay service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Mirrors established or adjusted.
    pub flows_mirrored: u64,
    /// Pairs torn down.
    pub flows_unmirrored: u64,
    /// Host-facing failures caught and absorbed.
    pub contained_failures: u64,
    /// Callbacks rejected in a before-phase or for a wrong caller.
    pub rejected_callbacks: u64,
    /// Emergency sweeps executed.
    pub emergency_sweeps: u64,
    /// Rarity draws served.
    pub rarity_draws: u64,
}

// =============================================================================
// RELAY SERVICE
// =============================================================================

/// The relay: callback dispatcher, mirror engine, and governance in one
/// service.
///
/// Holds only governance state; flow rates live in the host ledger behind the
/// [`FlowLedger`] port. All operations are serialized against the single
/// governance lock, matching the host's one-transaction-at-a-time execution
/// model.
pub struct RelayService<L: FlowLedger, E: EventSink> {
    /// Static configuration.
    config: ServiceConfig,
    /// Host flow ledger adapter.
    ledger: Arc<L>,
    /// Event sink adapter.
    sink: Arc<E>,
    /// Governance state: owner, lock, allow-list, rarity table.
    state: Arc<RwLock<GovernanceState>>,
    /// Service counters.
    stats: Arc<RwLock<ServiceStats>>,
    /// Monotonic draw counter mixed into rarity seeds.
    draw_counter: AtomicU64,
}

impl<L: FlowLedger, E: EventSink> RelayService<L, E> {
    /// Creates a new relay service with the initial owner from `config`.
    pub fn new(ledger: L, sink: E, config: ServiceConfig) -> Self {
        let state = GovernanceState::new(config.owner);
        Self {
            config,
            ledger: Arc::new(ledger),
            sink: Arc::new(sink),
            state: Arc::new(RwLock::new(state)),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
            draw_counter: AtomicU64::new(0),
        }
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Handle to the underlying ledger adapter.
    #[must_use]
    pub fn ledger(&self) -> Arc<L> {
        Arc::clone(&self.ledger)
    }

    /// Handle to the event sink adapter.
    #[must_use]
    pub fn sink(&self) -> Arc<E> {
        Arc::clone(&self.sink)
    }

    /// Current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Where the mirror for `sender`'s inbound flow goes.
    fn outbound_receiver(&self, sender: Address) -> Address {
        self.config.beneficiary.unwrap_or(sender)
    }

    /// Enforces that the callback surface is driven by the designated host.
    async fn guard_host(&self, caller: Address) -> Result<(), CallbackError> {
        if caller == self.config.host {
            Ok(())
        } else {
            warn!(caller = %caller, "callback from non-host caller");
            self.stats.write().await.rejected_callbacks += 1;
            Err(CallbackError::UnauthorizedHost { caller })
        }
    }

    /// Enforces owner identity for an admin operation.
    async fn guard_owner(&self, caller: Address) -> Result<(), AdminError> {
        if self.state.read().await.owner == caller {
            Ok(())
        } else {
            warn!(caller = %caller, "unauthorized admin call");
            Err(AdminError::Unauthorized { caller })
        }
    }

    /// Records a rejected before-phase.
    async fn reject_callback(&self, err: CallbackError) -> CallbackError {
        debug!(reason = %err, "rejecting callback in before-phase");
        self.stats.write().await.rejected_callbacks += 1;
        err
    }

    /// Absorbs a host-facing failure: log, count, announce, continue.
    async fn contain(
        &self,
        token: Token,
        counterparty: Address,
        err: LedgerError,
    ) -> MirrorOutcome {
        warn!(token = %token, counterparty = %counterparty, error = %err,
            "contained host-facing failure");
        self.stats.write().await.contained_failures += 1;
        self.sink
            .publish(RelayEvent::MirrorDropped {
                token,
                counterparty,
                reason: err.to_string(),
            })
            .await;
        MirrorOutcome::Dropped {
            reason: err.to_string(),
        }
    }

    // =========================================================================
    // FLOW MIRROR ENGINE
    // =========================================================================

    /// Establishes the outbound mirror for a freshly created inbound flow.
    ///
    /// Issued as create-or-update: a leftover outbound flow from an earlier
    /// inconsistency is adopted and set to the new rate.
    async fn mirror_create(&self, token: Token, sender: Address, rate: FlowRate) -> MirrorOutcome {
        let receiver = self.outbound_receiver(sender);
        let result = match self.ledger.create_flow(token, receiver, rate).await {
            Err(LedgerError::FlowAlreadyExists { .. }) => {
                self.ledger.update_flow(token, receiver, rate).await
            }
            other => other,
        };
        match result {
            Ok(()) => {
                self.stats.write().await.flows_mirrored += 1;
                self.sink
                    .publish(RelayEvent::FlowMirrored {
                        token,
                        counterparty: receiver,
                        rate,
                    })
                    .await;
                MirrorOutcome::Mirrored { rate }
            }
            Err(err) => self.contain(token, receiver, err).await,
        }
    }

    /// Adjusts the outbound mirror to the new inbound rate.
    ///
    /// A missing mirror (e.g. its creation was dropped against a hostile
    /// token that has since recovered) is re-established instead.
    async fn mirror_update(&self, token: Token, sender: Address, rate: FlowRate) -> MirrorOutcome {
        let receiver = self.outbound_receiver(sender);
        let result = match self.ledger.update_flow(token, receiver, rate).await {
            Err(LedgerError::FlowNotFound { .. }) => {
                self.ledger.create_flow(token, receiver, rate).await
            }
            other => other,
        };
        match result {
            Ok(()) => {
                self.stats.write().await.flows_mirrored += 1;
                self.sink
                    .publish(RelayEvent::FlowMirrored {
                        token,
                        counterparty: receiver,
                        rate,
                    })
                    .await;
                MirrorOutcome::Mirrored { rate }
            }
            Err(err) => self.contain(token, receiver, err).await,
        }
    }

    /// Tears down the surviving half of a terminated pair.
    ///
    /// Inbound-initiated terminations close the outbound mirror;
    /// outbound-initiated ones (rogue beneficiary) close the inbound flow so
    /// a counterparty cannot keep streaming in while refusing the mirror.
    /// A pair the ledger has no record of is an idempotent no-op.
    async fn mirror_terminate(&self, termination: FlowTermination) -> MirrorOutcome {
        let relay = self.config.relay;
        let counterparty = termination.counterparty(relay);
        let (sender, receiver) = if termination.is_outbound_from(relay) {
            (counterparty, relay)
        } else {
            (relay, self.outbound_receiver(counterparty))
        };

        match self
            .ledger
            .delete_flow(termination.token, sender, receiver)
            .await
        {
            Ok(()) => {
                self.stats.write().await.flows_unmirrored += 1;
                self.sink
                    .publish(RelayEvent::FlowUnmirrored {
                        token: termination.token,
                        counterparty,
                    })
                    .await;
                MirrorOutcome::Mirrored {
                    rate: FlowRate::ZERO,
                }
            }
            Err(err) if err.is_missing_flow() => {
                debug!(token = %termination.token, counterparty = %counterparty,
                    "nothing to terminate");
                MirrorOutcome::NothingToDo
            }
            Err(err) => self.contain(termination.token, counterparty, err).await,
        }
    }
}

// =============================================================================
// FlowLifecycleApi Implementation (Callback Dispatcher)
// =============================================================================

#[async_trait]
impl<L: FlowLedger, E: EventSink> FlowLifecycleApi for RelayService<L, E> {
    #[instrument(skip(self, ctx))]
    async fn before_flow_created(
        &self,
        caller: Address,
        token: Token,
        sender: Address,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError> {
        self.guard_host(caller).await?;

        let (allowed, locked) = {
            let state = self.state.read().await;
            (state.is_allowed(token), state.locked)
        };
        if !allowed {
            return Err(self
                .reject_callback(CallbackError::DisallowedToken(token))
                .await);
        }
        if locked {
            return Err(self.reject_callback(CallbackError::Locked).await);
        }
        Ok(ctx)
    }

    #[instrument(skip(self, ctx))]
    async fn after_flow_created(
        &self,
        caller: Address,
        token: Token,
        sender: Address,
        new_rate: FlowRate,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError> {
        self.guard_host(caller).await?;

        let outcome = self.mirror_create(token, sender, new_rate).await;
        debug!(outcome = ?outcome, "create handled");
        Ok(ctx)
    }

    #[instrument(skip(self, ctx))]
    async fn before_flow_updated(
        &self,
        caller: Address,
        token: Token,
        sender: Address,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError> {
        self.guard_host(caller).await?;

        if !self.state.read().await.is_allowed(token) {
            return Err(self
                .reject_callback(CallbackError::DisallowedToken(token))
                .await);
        }
        Ok(ctx)
    }

    #[instrument(skip(self, ctx))]
    async fn after_flow_updated(
        &self,
        caller: Address,
        token: Token,
        sender: Address,
        old_rate: FlowRate,
        new_rate: FlowRate,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError> {
        self.guard_host(caller).await?;

        debug!(old_rate = %old_rate, new_rate = %new_rate, "adjusting mirror");
        let outcome = self.mirror_update(token, sender, new_rate).await;
        debug!(outcome = ?outcome, "update handled");
        Ok(ctx)
    }

    #[instrument(skip(self, ctx))]
    async fn before_flow_terminated(
        &self,
        caller: Address,
        termination: FlowTermination,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError> {
        self.guard_host(caller).await?;

        // Terminations always proceed, allow-listed or not, locked or not.
        Ok(ctx)
    }

    #[instrument(skip(self, ctx))]
    async fn after_flow_terminated(
        &self,
        caller: Address,
        termination: FlowTermination,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError> {
        self.guard_host(caller).await?;

        let outcome = self.mirror_terminate(termination).await;
        debug!(outcome = ?outcome, "termination handled");
        Ok(ctx)
    }
}

// =============================================================================
// RelayAdminApi Implementation (Governance)
// =============================================================================

#[async_trait]
impl<L: FlowLedger, E: EventSink> RelayAdminApi for RelayService<L, E> {
    #[instrument(skip(self, tokens, statuses), fields(entries = tokens.len()))]
    async fn set_allow_list_batch(
        &self,
        caller: Address,
        tokens: Vec<Token>,
        statuses: Vec<bool>,
    ) -> Result<(), AdminError> {
        self.guard_owner(caller).await?;
        if tokens.len() != statuses.len() {
            return Err(AdminError::LengthMismatch {
                left: tokens.len(),
                right: statuses.len(),
            });
        }

        let entries: Vec<(Token, bool)> = tokens.into_iter().zip(statuses).collect();
        {
            let mut state = self.state.write().await;
            for (token, status) in &entries {
                state.set_allowed(*token, *status);
            }
        }
        info!(entries = entries.len(), "allow-list updated");
        self.sink
            .publish(RelayEvent::AllowListUpdated { entries })
            .await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_lock(&self, caller: Address, locked: bool) -> Result<(), AdminError> {
        self.guard_owner(caller).await?;

        self.state.write().await.locked = locked;
        info!(locked, "lock flag set");
        self.sink.publish(RelayEvent::LockChanged { locked }).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_rarity(&self, caller: Address, weights: [u16; 6]) -> Result<(), AdminError> {
        self.guard_owner(caller).await?;

        let table = RarityTable::new(weights).ok_or(AdminError::InvalidWeights {
            sum: RarityTable::weight_sum(&weights),
        })?;
        self.state.write().await.rarity = table;
        info!(?weights, "rarity table replaced");
        self.sink
            .publish(RelayEvent::RarityReconfigured { weights })
            .await;
        Ok(())
    }

    #[instrument(skip(self, counterparties, tokens), fields(pairs = counterparties.len()))]
    async fn emergency_close_stream(
        &self,
        caller: Address,
        counterparties: Vec<Address>,
        tokens: Vec<Token>,
    ) -> Result<(), AdminError> {
        self.guard_owner(caller).await?;
        if counterparties.len() != tokens.len() {
            return Err(AdminError::LengthMismatch {
                left: counterparties.len(),
                right: tokens.len(),
            });
        }

        let sweep_id = Uuid::new_v4();
        let relay = self.config.relay;
        let pairs = counterparties.len();
        let mut closed = 0usize;
        let mut contained = 0usize;

        for (counterparty, token) in counterparties.into_iter().zip(tokens) {
            // Both directions, each attempt isolated from the rest
            for (sender, receiver) in [(counterparty, relay), (relay, counterparty)] {
                match self.ledger.delete_flow(token, sender, receiver).await {
                    Ok(()) => {
                        closed += 1;
                        debug!(sweep_id = %sweep_id, token = %token,
                            sender = %sender, receiver = %receiver, "flow force-closed");
                    }
                    Err(err) if err.is_missing_flow() => {}
                    Err(err) => {
                        contained += 1;
                        warn!(sweep_id = %sweep_id, token = %token,
                            counterparty = %counterparty, error = %err,
                            "contained failure during sweep");
                    }
                }
            }
        }

        {
            let mut stats = self.stats.write().await;
            stats.emergency_sweeps += 1;
            stats.flows_unmirrored += closed as u64;
            stats.contained_failures += contained as u64;
        }
        info!(sweep_id = %sweep_id, pairs, closed, contained, "emergency sweep completed");
        self.sink
            .publish(RelayEvent::EmergencySweepCompleted {
                sweep_id,
                pairs,
                closed,
                contained,
            })
            .await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), AdminError> {
        self.guard_owner(caller).await?;
        if new_owner.is_zero() {
            return Err(AdminError::ZeroAddressOwner);
        }

        let previous = {
            let mut state = self.state.write().await;
            let previous = state.owner;
            state.owner = new_owner;
            previous
        };
        info!(previous = %previous, new_owner = %new_owner, "ownership transferred");
        self.sink
            .publish(RelayEvent::OwnershipTransferred {
                previous,
                new_owner,
            })
            .await;
        Ok(())
    }

    async fn get_rarity_tier(&self, seed: U256) -> RarityTier {
        let table = self.state.read().await.rarity;
        select_tier(seed, &table)
    }

    async fn draw_rarity(&self, caller: Address, entropy: [u8; 32]) -> RarityTier {
        let counter = self.draw_counter.fetch_add(1, Ordering::Relaxed);
        let seed = derive_seed(&entropy, caller, counter);
        let table = self.state.read().await.rarity;
        let tier = select_tier(seed, &table);
        self.stats.write().await.rarity_draws += 1;
        debug!(caller = %caller, counter, tier = %tier, "rarity drawn");
        tier
    }

    async fn rarity_weights(&self) -> [u16; 6] {
        self.state.read().await.rarity.weights()
    }

    async fn owner(&self) -> Address {
        self.state.read().await.owner
    }

    async fn is_locked(&self) -> bool {
        self.state.read().await.locked
    }

    async fn is_token_allowed(&self, token: Token) -> bool {
        self.state.read().await.is_allowed(token)
    }
}

/// Create a default service with in-memory adapters (for testing).
#[must_use]
pub fn create_test_service() -> RelayService<InMemoryLedger, InMemoryEventSink> {
    let config = ServiceConfig {
        host: Address::new([0xAA; 20]),
        relay: Address::new([0xBB; 20]),
        beneficiary: None,
        owner: Address::new([0xCC; 20]),
    };
    RelayService::new(
        InMemoryLedger::new(config.relay),
        InMemoryEventSink::new(),
        config,
    )
}

// =============================================================================
// TESTS
// =============================================================================
