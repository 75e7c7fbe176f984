//! # Simulated Host
//!
//! Drives the relay the way the real host protocol would: before-phase,
//! host-side ledger bookkeeping, then after-phase, with the host's jailing
//! rule applied faithfully. A before-phase rejection of a create/update rolls
//! the whole operation back cleanly (the counterparty just sees a rejected
//! transaction); any failure escaping an effectful phase - or any phase of a
//! termination - marks the relay jailed.

use rebound_relay::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// =============================================================================
// WELL-KNOWN ACCOUNTS & TOKENS
// =============================================================================

/// The designated host.
pub const HOST: Address = Address::new([0x01; 20]);
/// The relay's own ledger address.
pub const RELAY: Address = Address::new([0x02; 20]);
/// Initial owner / admin.
pub const OWNER: Address = Address::new([0x0A; 20]);
/// Counterparty accounts.
pub const ALICE: Address = Address::new([0xA1; 20]);
/// Second counterparty.
pub const BOB: Address = Address::new([0xB0; 20]);
/// Counterparty with no flows (sweep target).
pub const SUNNY: Address = Address::new([0x5A; 20]);

/// Allow-listed test token.
pub const DAIX: Token = Token::new(Address::new([0xD1; 20]));
/// Second allow-listed test token.
pub const USDCX: Token = Token::new(Address::new([0xD2; 20]));
/// Token left off the allow-list until a test opts in.
pub const WETHX: Token = Token::new(Address::new([0xD3; 20]));

/// Flow rates mirroring the scenarios the relay is tuned for.
pub const RATE_HIGH: FlowRate = FlowRate::new(100_000);
/// Medium scenario rate.
pub const RATE_MED: FlowRate = FlowRate::new(90_000);
/// Low scenario rate.
pub const RATE_LOW: FlowRate = FlowRate::new(80_000);

// =============================================================================
// HOST-SIDE REJECTIONS
// =============================================================================

/// How the host reports a cleanly rejected flow operation back to the
/// counterparty. These are ordinary transaction failures, not jailings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRejection {
    /// The relay rejected the operation in a before-phase.
    Callback(CallbackError),
    /// The counterparty tried to create a flow that already exists.
    FlowExists,
    /// The counterparty addressed a flow the ledger has no record of.
    UnknownFlow,
}

// =============================================================================
// SIMULATED HOST
// =============================================================================

/// A minimal stand-in for the host protocol: owns the callback ordering and
/// the jailing rule, and keeps the ledger's books for counterparty-initiated
/// operations.
pub struct SimulatedHost {
    relay: RelayService<InMemoryLedger, InMemoryEventSink>,
    jailed: AtomicBool,
}

impl SimulatedHost {
    /// Boots a fresh host + relay pair with the well-known addresses and the
    /// standard two-token allow-list.
    pub async fn bootstrap() -> Self {
        let host = Self::new();
        host.relay
            .set_allow_list_batch(OWNER, vec![USDCX, DAIX], vec![true, true])
            .await
            .expect("owner configures allow-list");
        host
    }

    /// Boots a fresh host + relay pair with an empty allow-list.
    #[must_use]
    pub fn new() -> Self {
        let config = ServiceConfig {
            host: HOST,
            relay: RELAY,
            beneficiary: None,
            owner: OWNER,
        };
        let relay = RelayService::new(
            InMemoryLedger::new(RELAY),
            InMemoryEventSink::new(),
            config,
        );
        Self {
            relay,
            jailed: AtomicBool::new(false),
        }
    }

    /// The relay under test.
    pub fn relay(&self) -> &RelayService<InMemoryLedger, InMemoryEventSink> {
        &self.relay
    }

    /// The shared ledger.
    pub fn ledger(&self) -> Arc<InMemoryLedger> {
        self.relay.ledger()
    }

    /// The shared event sink.
    pub fn sink(&self) -> Arc<InMemoryEventSink> {
        self.relay.sink()
    }

    /// True once any callback failed where the host forbids failure.
    pub fn is_jailed(&self) -> bool {
        self.jailed.load(Ordering::SeqCst)
    }

    fn jail_if_failed(&self, result: &Result<CallbackContext, CallbackError>) {
        if result.is_err() {
            self.jailed.store(true, Ordering::SeqCst);
        }
    }

    // =========================================================================
    // COUNTERPARTY-INITIATED FLOW OPERATIONS
    // =========================================================================

    /// `sender` opens a flow of `token` into the relay at `rate`.
    pub async fn create_flow(
        &self,
        sender: Address,
        token: Token,
        rate: FlowRate,
    ) -> Result<(), HostRejection> {
        if !self.ledger().rate_between(token, sender, RELAY).is_zero() {
            return Err(HostRejection::FlowExists);
        }

        let ctx = self
            .relay
            .before_flow_created(HOST, token, sender, CallbackContext::empty())
            .await
            .map_err(HostRejection::Callback)?;

        self.ledger().insert_flow(token, sender, RELAY, rate);

        let result = self
            .relay
            .after_flow_created(HOST, token, sender, rate, ctx)
            .await;
        self.jail_if_failed(&result);
        Ok(())
    }

    /// `sender` adjusts their existing inbound flow to `new_rate`.
    pub async fn update_flow(
        &self,
        sender: Address,
        token: Token,
        new_rate: FlowRate,
    ) -> Result<(), HostRejection> {
        let old_rate = self.ledger().rate_between(token, sender, RELAY);
        if old_rate.is_zero() {
            return Err(HostRejection::UnknownFlow);
        }

        let ctx = self
            .relay
            .before_flow_updated(HOST, token, sender, CallbackContext::empty())
            .await
            .map_err(HostRejection::Callback)?;

        self.ledger().insert_flow(token, sender, RELAY, new_rate);

        let result = self
            .relay
            .after_flow_updated(HOST, token, sender, old_rate, new_rate, ctx)
            .await;
        self.jail_if_failed(&result);
        Ok(())
    }

    /// Deletes the flow `sender -> receiver` of `token`, firing the relay's
    /// termination callbacks. Either endpoint may be the relay itself; per
    /// host rules a termination callback is never allowed to fail.
    pub async fn delete_flow(
        &self,
        sender: Address,
        receiver: Address,
        token: Token,
    ) -> Result<(), HostRejection> {
        if self.ledger().rate_between(token, sender, receiver).is_zero() {
            return Err(HostRejection::UnknownFlow);
        }

        let termination = FlowTermination {
            token,
            sender,
            receiver,
        };

        let before = self
            .relay
            .before_flow_terminated(HOST, termination, CallbackContext::empty())
            .await;
        self.jail_if_failed(&before);
        let ctx = before.unwrap_or_else(|_| CallbackContext::empty());

        self.ledger().remove_flow(token, sender, receiver);

        let after = self
            .relay
            .after_flow_terminated(HOST, termination, ctx)
            .await;
        self.jail_if_failed(&after);
        Ok(())
    }

    // =========================================================================
    // ASSERTIONS
    // =========================================================================

    /// Inbound rate from `counterparty` for `token`.
    pub fn inbound_rate(&self, token: Token, counterparty: Address) -> FlowRate {
        self.ledger().rate_between(token, counterparty, RELAY)
    }

    /// Outbound rate to `counterparty` for `token`.
    pub fn outbound_rate(&self, token: Token, counterparty: Address) -> FlowRate {
        self.ledger().rate_between(token, RELAY, counterparty)
    }

    /// Asserts the mirror invariant for one (token, counterparty) pair.
    pub async fn assert_mirrors(&self, token: Token, counterparty: Address) {
        let inbound = self.inbound_rate(token, counterparty);
        let outbound = self.outbound_rate(token, counterparty);
        let table = RarityTable::new(self.relay.rarity_weights().await)
            .expect("relay holds a valid table");
        let check = check_pair_invariants(inbound, outbound, &table);
        assert!(
            check.passed(),
            "invariants violated for {token} / {counterparty}: {:?}\n inflow:  {inbound}\n outflow: {outbound}",
            check.violations
        );
    }

    /// Asserts both directions of a pair are closed.
    pub fn assert_pair_closed(&self, token: Token, counterparty: Address) {
        assert_eq!(
            self.inbound_rate(token, counterparty),
            FlowRate::ZERO,
            "inbound {token} flow from {counterparty} not closed"
        );
        assert_eq!(
            self.outbound_rate(token, counterparty),
            FlowRate::ZERO,
            "outbound {token} flow to {counterparty} not closed"
        );
    }

    /// Asserts the host never had reason to jail the relay.
    pub fn assert_not_jailed(&self) {
        assert!(!self.is_jailed(), "relay was jailed");
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}
