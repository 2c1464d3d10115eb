//! Domain types and configuration for the maildesk support responder.
//!
//! This crate holds everything the rest of the workspace agrees on:
//!
//! - `domain` - email parsing, intent classification types, orders and
//!   fulfillments, knowledge-base entries, and the audit records written
//!   after every processed email
//! - `ports` - capability traits the agent consumes (order directory,
//!   vector index, interaction/escalation stores); implementations live
//!   in `maildesk-db` or in test doubles
//! - `config` - layered TOML + environment configuration with validation
//! - `errors` - the error taxonomy shared across crates
//!
//! Nothing here talks to the network or the database.

pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
