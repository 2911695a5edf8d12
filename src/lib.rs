//! Amelia Conversation Generator
//!
//! Synthesizes check-in and crisis-log training conversations between a
//! scripted user persona and the Amelia agent, persisting them as resumable
//! JSON collections.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
