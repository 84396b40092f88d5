//! Provider health data shapes.
//!
//! The mutable records live in the core health tracker; these are the
//! serializable views handed to status endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    Rejected,
    Malformed,
    Auth,
    Transport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Rejected => write!(f, "rejected"),
            ErrorKind::Malformed => write!(f, "malformed"),
            ErrorKind::Auth => write!(f, "auth"),
            ErrorKind::Transport => write!(f, "transport"),
        }
    }
}

/// Read-only copy of one provider's health record.
///
/// Returned by `snapshot()`; detached from the live record, so mutating
/// the tracker afterwards does not alter it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// False while the provider sits in its failure cool-down.
    pub available: bool,
    pub consecutive_failures: u32,
    pub last_error_kind: Option<ErrorKind>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub total_attempts: u64,
    pub total_failures: u64,
    pub total_skips: u64,
}
