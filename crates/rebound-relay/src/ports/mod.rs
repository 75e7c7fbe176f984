//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the relay.
//! These are the interfaces between the domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `FlowLifecycleApi`, `RelayAdminApi`
//! - **Driven Ports (Outbound)**: `FlowLedger`, `EventSink`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
