//! Waiting on elements of the live application.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};

use super::{Predicate, WaitSpec, poll_until};
use crate::error::Result;
use crate::query::{ElementQuery, ResolvedElement, resolve};
use crate::session::{CaptureReason, Session};

/// Result of waiting on an element.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    /// The predicate held. Carries the element when it exists.
    Satisfied { element: Option<ResolvedElement> },
    /// The element could not be found before the timeout.
    NotFound,
    /// The element was found but never reached the expected state.
    Mismatch { element: ResolvedElement },
}

impl WaitOutcome {
    /// Whether the predicate held.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, WaitOutcome::Satisfied { .. })
    }

    /// The element as last observed, if it was found.
    pub fn element(&self) -> Option<&ResolvedElement> {
        match self {
            WaitOutcome::Satisfied { element } => element.as_ref(),
            WaitOutcome::NotFound => None,
            WaitOutcome::Mismatch { element } => Some(element),
        }
    }

    /// Consume the outcome, keeping the element.
    pub fn into_element(self) -> Option<ResolvedElement> {
        match self {
            WaitOutcome::Satisfied { element } => element,
            WaitOutcome::NotFound => None,
            WaitOutcome::Mismatch { element } => Some(element),
        }
    }
}

/// Polls the session until an element satisfies a predicate.
///
/// Every poll takes a fresh snapshot from the driver and resolves the query
/// again; nothing is cached between polls. Awaiting a `Waiter` yields a
/// [`WaitOutcome`]. On timeout a diagnostic screenshot is attached to the
/// session report before the outcome is returned.
pub struct Waiter<'a> {
    session: &'a Session,
    query: ElementQuery,
    spec: WaitSpec,
}

impl<'a> Waiter<'a> {
    /// Create a waiter with the session's default timing.
    pub fn new(session: &'a Session, query: ElementQuery, predicate: Predicate) -> Self {
        let config = session.config();
        let spec = WaitSpec::new(predicate)
            .timeout(config.timeouts.short)
            .poll_interval(config.poll_interval);
        Self {
            session,
            query,
            spec,
        }
    }

    /// Set the timeout for this wait operation.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.spec = self.spec.timeout(timeout);
        self
    }

    /// Set the poll interval for checking the condition.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.spec = self.spec.poll_interval(interval);
        self
    }

    /// The wait parameters.
    pub fn spec(&self) -> &WaitSpec {
        &self.spec
    }

    /// Human-readable account of a failed outcome.
    pub fn describe_failure(&self, outcome: &WaitOutcome) -> String {
        let expected = format!(
            "{} to {} within {:?}",
            self.query,
            self.spec.predicate().description(),
            self.spec.get_timeout()
        );
        match outcome {
            WaitOutcome::Satisfied { .. } => expected,
            WaitOutcome::NotFound => format!("expected {expected}, but it was never found"),
            WaitOutcome::Mismatch { element } => {
                format!("expected {expected}, last seen as {}", element.node.summary())
            }
        }
    }

    /// Run the wait.
    pub async fn outcome(&self) -> WaitOutcome {
        let predicate = self.spec.predicate();
        let latest: Mutex<Option<ResolvedElement>> = Mutex::new(None);

        let satisfied = poll_until(self.spec.get_timeout(), self.spec.get_poll_interval(), || {
            let session = self.session;
            let query = &self.query;
            let latest = &latest;
            async move {
                match session.snapshot().await {
                    Ok(tree) => {
                        let found = resolve(query, &tree);
                        let holds = predicate.evaluate(found.as_ref().map(|e| &e.node));
                        if let Ok(mut slot) = latest.lock() {
                            *slot = found;
                        }
                        holds
                    }
                    Err(e) => {
                        warn!(error = %e, %query, "snapshot failed while waiting");
                        false
                    }
                }
            }
        })
        .await;

        let latest = latest.into_inner().unwrap_or_else(|e| e.into_inner());
        debug!(query = %self.query, predicate = ?predicate, satisfied, "wait finished");

        if satisfied {
            return WaitOutcome::Satisfied { element: latest };
        }

        let label = format!("wait-timeout {}", self.query);
        self.session.capture_on(CaptureReason::Failure, &label).await;

        match latest {
            Some(element) => WaitOutcome::Mismatch { element },
            None => WaitOutcome::NotFound,
        }
    }

    /// Run the wait, turning a failed outcome into a timeout error.
    pub async fn expect(self) -> Result<Option<ResolvedElement>> {
        match self.outcome().await {
            WaitOutcome::Satisfied { element } => Ok(element),
            _ => Err(self.spec.timeout_error(&self.query)),
        }
    }
}

impl<'a> IntoFuture for Waiter<'a> {
    type Output = WaitOutcome;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.outcome().await })
    }
}
