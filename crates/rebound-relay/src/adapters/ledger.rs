//! # In-Memory Flow Ledger
//!
//! Flow ledger implementation for testing and local simulation. Production
//! deployments adapt the real host protocol behind the same port.
//!
//! Flows are keyed `(token, sender, receiver)` exactly like the host's
//! ledger. Poisoned tokens make every relay-issued mutation fail with
//! [`LedgerError::CounterpartyRejected`], which is how tests model a token
//! whose receipt hooks revert on every call; direct host-side bookkeeping
//! (the `insert_flow`/`remove_flow` helpers) is unaffected.

use crate::domain::value_objects::{Address, FlowRate, Token};
use crate::errors::LedgerError;
use crate::ports::outbound::FlowLedger;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// In-memory ledger for testing.
#[derive(Debug)]
pub struct InMemoryLedger {
    /// The relay's own address; implicit sender of created/updated flows.
    relay: Address,
    /// Open flows by `(token, sender, receiver)`.
    flows: RwLock<HashMap<(Token, Address, Address), FlowRate>>,
    /// Tokens whose mutations fail adversarially.
    poisoned: RwLock<HashSet<Token>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger scoped to the given relay address.
    #[must_use]
    pub fn new(relay: Address) -> Self {
        Self {
            relay,
            flows: RwLock::new(HashMap::new()),
            poisoned: RwLock::new(HashSet::new()),
        }
    }

    /// The relay address this ledger is scoped to.
    #[must_use]
    pub fn relay(&self) -> Address {
        self.relay
    }

    /// Host-side bookkeeping: records a flow directly, bypassing poison.
    pub fn insert_flow(&self, token: Token, sender: Address, receiver: Address, rate: FlowRate) {
        self.flows
            .write()
            .unwrap()
            .insert((token, sender, receiver), rate);
    }

    /// Host-side bookkeeping: removes a flow directly, bypassing poison.
    /// Returns true if a flow existed.
    pub fn remove_flow(&self, token: Token, sender: Address, receiver: Address) -> bool {
        self.flows
            .write()
            .unwrap()
            .remove(&(token, sender, receiver))
            .is_some()
    }

    /// Synchronous rate lookup for assertions. Zero when no flow exists.
    #[must_use]
    pub fn rate_between(&self, token: Token, sender: Address, receiver: Address) -> FlowRate {
        self.flows
            .read()
            .unwrap()
            .get(&(token, sender, receiver))
            .copied()
            .unwrap_or(FlowRate::ZERO)
    }

    /// Number of open flows across all tokens.
    #[must_use]
    pub fn open_flow_count(&self) -> usize {
        self.flows.read().unwrap().len()
    }

    /// Marks a token adversarial: subsequent mutations on it fail.
    pub fn poison(&self, token: Token) {
        self.poisoned.write().unwrap().insert(token);
    }

    /// Clears a token's adversarial behavior.
    pub fn cure(&self, token: Token) {
        self.poisoned.write().unwrap().remove(&token);
    }

    fn ensure_not_poisoned(&self, token: Token) -> Result<(), LedgerError> {
        if self.poisoned.read().unwrap().contains(&token) {
            Err(LedgerError::CounterpartyRejected(format!(
                "token {token} reverted in transfer hook"
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FlowLedger for InMemoryLedger {
    async fn flow_rate(
        &self,
        token: Token,
        sender: Address,
        receiver: Address,
    ) -> Result<FlowRate, LedgerError> {
        Ok(self.rate_between(token, sender, receiver))
    }

    async fn create_flow(
        &self,
        token: Token,
        receiver: Address,
        rate: FlowRate,
    ) -> Result<(), LedgerError> {
        self.ensure_not_poisoned(token)?;
        let key = (token, self.relay, receiver);
        let mut flows = self.flows.write().unwrap();
        if flows.contains_key(&key) {
            return Err(LedgerError::FlowAlreadyExists { token, receiver });
        }
        flows.insert(key, rate);
        Ok(())
    }

    async fn update_flow(
        &self,
        token: Token,
        receiver: Address,
        rate: FlowRate,
    ) -> Result<(), LedgerError> {
        self.ensure_not_poisoned(token)?;
        let key = (token, self.relay, receiver);
        let mut flows = self.flows.write().unwrap();
        if !flows.contains_key(&key) {
            return Err(LedgerError::FlowNotFound {
                token,
                sender: self.relay,
                receiver,
            });
        }
        flows.insert(key, rate);
        Ok(())
    }

    async fn delete_flow(
        &self,
        token: Token,
        sender: Address,
        receiver: Address,
    ) -> Result<(), LedgerError> {
        self.ensure_not_poisoned(token)?;
        let mut flows = self.flows.write().unwrap();
        if flows.remove(&(token, sender, receiver)).is_none() {
            return Err(LedgerError::FlowNotFound {
                token,
                sender,
                receiver,
            });
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
