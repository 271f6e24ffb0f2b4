//! Wait conditions and the polling loop.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::UiwrightError;
use crate::query::ElementQuery;
use crate::tree::Node;

mod element;

pub use element::{WaitOutcome, Waiter};

/// Default timeout for assertions and action waits.
pub const SHORT: Duration = Duration::from_secs(10);

/// Timeout for slower transitions.
pub const LONG: Duration = Duration::from_secs(20);

/// Timeout for the slowest operations (cold launches, network-backed screens).
pub const LONGER: Duration = Duration::from_secs(30);

/// Default poll interval for checking conditions.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Element state to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// The element can be found.
    Exists,
    /// The element cannot be found.
    NotExists,
    /// The element exists and is enabled.
    Enabled,
    /// The element exists and is disabled.
    Disabled,
    /// The element exists and can receive a tap.
    Hittable,
    /// The element exists and has keyboard focus.
    Focused,
}

impl Predicate {
    /// Evaluate against the current resolution of an element.
    pub fn evaluate(self, node: Option<&Node>) -> bool {
        match (self, node) {
            (Predicate::NotExists, found) => found.is_none(),
            (_, None) => false,
            (Predicate::Exists, Some(_)) => true,
            (Predicate::Enabled, Some(node)) => node.enabled,
            (Predicate::Disabled, Some(node)) => !node.enabled,
            (Predicate::Hittable, Some(node)) => node.hittable,
            (Predicate::Focused, Some(node)) => node.focused,
        }
    }

    /// Get a human-readable description of this predicate.
    pub fn description(self) -> &'static str {
        match self {
            Predicate::Exists => "exist",
            Predicate::NotExists => "not exist",
            Predicate::Enabled => "be enabled",
            Predicate::Disabled => "be disabled",
            Predicate::Hittable => "be hittable",
            Predicate::Focused => "have focus",
        }
    }
}

/// A predicate together with its timing.
#[derive(Debug, Clone, Copy)]
pub struct WaitSpec {
    predicate: Predicate,
    timeout: Duration,
    poll_interval: Duration,
}

impl WaitSpec {
    /// Create a new wait spec with the default timing.
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            timeout: SHORT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the timeout for this wait operation.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll interval for checking the condition.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Get the predicate.
    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// Get the timeout.
    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the poll interval.
    pub fn get_poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Create a timeout error for this wait on the given query.
    pub fn timeout_error(&self, query: &ElementQuery) -> UiwrightError {
        UiwrightError::Timeout {
            condition: format!("{query} to {}", self.predicate.description()),
            timeout: self.timeout,
        }
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
///
/// Sleeps between polls so other tasks on the runtime keep running. Once the
/// deadline has passed the condition is evaluated one final time, and only a
/// false result there produces `false`.
pub async fn poll_until<F, Fut>(timeout: Duration, poll_interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition().await {
            return true;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return false;
        }
        tokio::time::sleep(poll_interval.min(remaining)).await;
    }
}

/// Extension trait for Duration to create durations more ergonomically.
pub trait DurationExt {
    /// Create a duration from this value in seconds.
    fn seconds(self) -> Duration;
    /// Create a duration from this value in milliseconds.
    fn millis(self) -> Duration;
}

impl DurationExt for u64 {
    fn seconds(self) -> Duration {
        Duration::from_secs(self)
    }

    fn millis(self) -> Duration {
        Duration::from_millis(self)
    }
}

impl DurationExt for i32 {
    fn seconds(self) -> Duration {
        Duration::from_secs(self.max(0) as u64)
    }

    fn millis(self) -> Duration {
        Duration::from_millis(self.max(0) as u64)
    }
}
