//! Shared domain types for Govorun.
//!
//! This crate contains the core domain types used across the Govorun stack:
//! utterances and chat turns, classified intents, provider descriptors and
//! payloads, response envelopes, health records, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod envelope;
pub mod error;
pub mod health;
pub mod intent;
pub mod provider;
