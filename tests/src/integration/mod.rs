//! # Integration Scenarios
//!
//! Each module drives a full host/relay pair through the scenarios the relay
//! must survive in production.

pub mod governance;
