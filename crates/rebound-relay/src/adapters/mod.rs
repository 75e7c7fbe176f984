//! # Adapters Layer (Outer Hexagon)
//!
//! Adapters connect the relay to external systems.
//!
//! - Adapters implement domain ports
//! - [`InMemoryLedger`] stands in for the host's flow ledger in tests and
//!   local simulation, including adversarial (poison token) behavior
//! - Event sinks deliver [`RelayEvent`](crate::events::RelayEvent)s

pub mod event_sink;
pub mod ledger;

pub use event_sink::*;
pub use ledger::*;
