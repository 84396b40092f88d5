//! Observability setup for Govorun.
//!
//! The embedding application calls [`tracing_setup::init_tracing`] once at
//! startup; the library crates only emit `tracing` events and never touch
//! the global subscriber themselves.

pub mod tracing_setup;
