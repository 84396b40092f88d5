//! Infrastructure layer for Govorun.
//!
//! Contains the concrete provider adapters behind the `govorun-core`
//! provider boundary: the GigaChat conversational client and its OAuth
//! token source, the Pollinations/Picsum image generators, the
//! Perplexity/Yandex/DuckDuckGo/Wikipedia/wttr.in search sources, plus the
//! TOML configuration loader and the assembly glue that wires a ready
//! orchestrator.

pub mod assemble;
pub mod auth;
pub mod chat;
pub mod config;
pub mod image;
pub mod search;
