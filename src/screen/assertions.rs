//! Assertions on the elements of a screen.

use tracing::info;

use super::{ElementRepresentable, Flow, ScreenSpec, failure_kind};
use crate::query::{ElementQuery, count_matches, resolve};
use crate::report::FailureKind;
use crate::session::CaptureReason;
use crate::wait::Predicate;

impl<S: ScreenSpec> Flow<S> {
    /// Wait for each element in turn to satisfy `predicate`.
    ///
    /// In strict mode the remaining elements are skipped after the first
    /// failure.
    async fn assert_each<I>(self, elements: I, predicate: Predicate) -> Self
    where
        I: IntoIterator<Item = S::Element>,
    {
        if self.failed {
            return self;
        }
        let elements: Vec<S::Element> = elements.into_iter().collect();
        let mut flow = self;
        for element in elements {
            let waiter = flow.waiter(element.query(), predicate);
            let outcome = waiter.outcome().await;
            if outcome.is_satisfied() {
                continue;
            }
            let message = format!("{element:?}: {}", waiter.describe_failure(&outcome));
            flow = flow.fail(failure_kind(&outcome), message).await;
            if flow.failed {
                break;
            }
        }
        flow
    }

    /// Assert every element exists.
    pub async fn assert_exists<I>(self, elements: I) -> Self
    where
        I: IntoIterator<Item = S::Element>,
    {
        self.assert_each(elements, Predicate::Exists).await
    }

    /// Assert every element is absent.
    pub async fn assert_does_not_exist<I>(self, elements: I) -> Self
    where
        I: IntoIterator<Item = S::Element>,
    {
        self.assert_each(elements, Predicate::NotExists).await
    }

    /// Assert every element exists and is enabled.
    pub async fn assert_enabled<I>(self, elements: I) -> Self
    where
        I: IntoIterator<Item = S::Element>,
    {
        self.assert_each(elements, Predicate::Enabled).await
    }

    /// Assert every element exists and is disabled.
    pub async fn assert_disabled<I>(self, elements: I) -> Self
    where
        I: IntoIterator<Item = S::Element>,
    {
        self.assert_each(elements, Predicate::Disabled).await
    }

    /// Assert every element has keyboard focus.
    pub async fn assert_focused<I>(self, elements: I) -> Self
    where
        I: IntoIterator<Item = S::Element>,
    {
        self.assert_each(elements, Predicate::Focused).await
    }

    /// Assert every element can receive a tap.
    pub async fn assert_hittable<I>(self, elements: I) -> Self
    where
        I: IntoIterator<Item = S::Element>,
    {
        self.assert_each(elements, Predicate::Hittable).await
    }

    /// Assert exactly `count` static texts under the screen's root match `text`
    /// by identifier or label.
    ///
    /// Checked against a single snapshot without waiting. When the screen's
    /// root is not on screen the whole tree is counted.
    pub async fn assert_label_count(self, text: &str, count: usize) -> Self {
        if self.failed {
            return self;
        }
        let tree = match self.session().snapshot().await {
            Ok(tree) => tree,
            Err(e) => {
                let message = format!("could not snapshot to count '{text}': {e}");
                return self.fail(FailureKind::DriverError, message).await;
            }
        };

        let labels = ElementQuery::root().static_text(text);
        let found = match resolve(&S::root_query(), &tree) {
            Some(root) => count_matches(&labels, &root.node),
            None => count_matches(&labels, &tree),
        };
        if found == count {
            return self;
        }
        let message = format!("expected {count} label(s) matching '{text}', found {found}");
        self.fail(FailureKind::LabelCount, message).await
    }

    /// Wait for screen `T` to appear and continue the chain on it.
    ///
    /// Mode, timeout and lenient failure count carry over to the new flow.
    pub async fn assert_transition<T: ScreenSpec>(self) -> Flow<T> {
        if self.failed {
            return self.cast();
        }
        let waiter = self.waiter(T::root_query(), Predicate::Exists);
        let outcome = waiter.outcome().await;
        if outcome.is_satisfied() {
            info!(from = S::IDENTITY, to = T::IDENTITY, "screen transition");
            self.session()
                .capture_on(CaptureReason::Transition, &format!("transition-{}", T::IDENTITY))
                .await;
            return self.cast();
        }

        let message = format!(
            "{} never appeared within {:?}",
            T::IDENTITY,
            self.current_timeout()
        );
        self.fail(FailureKind::TransitionFailure, message)
            .await
            .cast()
    }
}
