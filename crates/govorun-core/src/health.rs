//! Provider health tracking for the fallback chain.
//!
//! One record per configured provider, created at startup and never
//! removed. The executor consults [`HealthTracker::should_skip`] before
//! attempting a provider: after `failure_threshold` consecutive failures
//! the provider is skipped until the cool-down window has elapsed.
//!
//! Records are mutated by parallel in-flight requests, so they live in a
//! `DashMap` and every mutation goes through its per-entry lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use govorun_types::health::{ErrorKind, HealthSnapshot};

/// Mutable health record for a single provider.
#[derive(Debug, Default)]
struct ProviderHealth {
    consecutive_failures: u32,
    last_error_kind: Option<ErrorKind>,
    last_success_at: Option<DateTime<Utc>>,
    last_failure_at: Option<DateTime<Utc>>,
    /// Monotonic twin of `last_failure_at`, used for cool-down arithmetic.
    last_failure_instant: Option<Instant>,
    total_attempts: u64,
    total_failures: u64,
    total_skips: u64,
}

impl ProviderHealth {
    fn in_cooldown(&self, threshold: u32, cooldown: Duration) -> bool {
        self.consecutive_failures >= threshold
            && self
                .last_failure_instant
                .is_some_and(|at| at.elapsed() < cooldown)
    }

    fn to_snapshot(&self, threshold: u32, cooldown: Duration) -> HealthSnapshot {
        HealthSnapshot {
            available: !self.in_cooldown(threshold, cooldown),
            consecutive_failures: self.consecutive_failures,
            last_error_kind: self.last_error_kind,
            last_success_at: self.last_success_at,
            last_failure_at: self.last_failure_at,
            total_attempts: self.total_attempts,
            total_failures: self.total_failures,
            total_skips: self.total_skips,
        }
    }
}

/// Shared health store for every configured provider.
pub struct HealthTracker {
    records: DashMap<String, ProviderHealth>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl HealthTracker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            records: DashMap::new(),
            failure_threshold,
            cooldown,
        }
    }

    /// Create the record for a provider. Called once per provider at
    /// startup; registering an existing id leaves its record untouched.
    pub fn register(&self, id: impl Into<String>) {
        self.records.entry(id.into()).or_default();
    }

    /// Record a successful attempt: resets the consecutive-failure count.
    pub fn report_success(&self, id: &str) {
        let mut record = self.records.entry(id.to_string()).or_default();
        record.total_attempts += 1;
        record.consecutive_failures = 0;
        record.last_success_at = Some(Utc::now());
    }

    /// Record a failed attempt with its coarse error kind.
    pub fn report_failure(&self, id: &str, kind: ErrorKind) {
        let mut record = self.records.entry(id.to_string()).or_default();
        record.total_attempts += 1;
        record.total_failures += 1;
        record.consecutive_failures += 1;
        record.last_error_kind = Some(kind);
        record.last_failure_at = Some(Utc::now());
        record.last_failure_instant = Some(Instant::now());
    }

    /// Record that the executor skipped this provider without attempting
    /// it. A skip is not a failure: it does not extend the cool-down.
    pub fn report_skip(&self, id: &str) {
        let mut record = self.records.entry(id.to_string()).or_default();
        record.total_skips += 1;
    }

    /// Whether the executor should skip this provider right now.
    /// Read-only: never mutates the record.
    pub fn should_skip(&self, id: &str) -> bool {
        self.records
            .get(id)
            .is_some_and(|record| record.in_cooldown(self.failure_threshold, self.cooldown))
    }

    /// Detached read-only copy of every record.
    pub fn snapshot(&self) -> HashMap<String, HealthSnapshot> {
        self.records
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    entry.value().to_snapshot(self.failure_threshold, self.cooldown),
                )
            })
            .collect()
    }
}
