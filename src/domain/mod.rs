//! Domain layer containing generation rules and domain types.
//!
//! # Module Organization
//!
//! - `conversation` - Turns, flows, scenarios, flow state and the turn policy
pub mod conversation;
