//! Control flow within a chain.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tracing::info;

use super::{Flow, ScreenSpec};
use crate::driver::Idiom;
use crate::report::FailureKind;

type Branch<S> = Box<dyn FnOnce(Flow<S>) -> Pin<Box<dyn Future<Output = Flow<S>> + Send>> + Send>;

/// Per-idiom branches for [`Flow::platform`].
pub struct Platform<S> {
    tablet: Option<Branch<S>>,
    phone: Option<Branch<S>>,
}

impl<S: ScreenSpec> Platform<S> {
    /// No branches; every idiom passes through unchanged.
    pub fn new() -> Self {
        Self {
            tablet: None,
            phone: None,
        }
    }

    /// Steps to run on tablets.
    pub fn tablet<F, Fut>(mut self, steps: F) -> Self
    where
        F: FnOnce(Flow<S>) -> Fut + Send + 'static,
        Fut: Future<Output = Flow<S>> + Send + 'static,
    {
        self.tablet = Some(Box::new(move |flow| Box::pin(steps(flow))));
        self
    }

    /// Steps to run on phones.
    pub fn phone<F, Fut>(mut self, steps: F) -> Self
    where
        F: FnOnce(Flow<S>) -> Fut + Send + 'static,
        Fut: Future<Output = Flow<S>> + Send + 'static,
    {
        self.phone = Some(Box::new(move |flow| Box::pin(steps(flow))));
        self
    }
}

impl<S: ScreenSpec> Default for Platform<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Platform<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("tablet", &self.tablet.is_some())
            .field("phone", &self.phone.is_some())
            .finish()
    }
}

impl<S: ScreenSpec> Flow<S> {
    /// Run `action` only if `predicate` holds.
    ///
    /// The predicate sees a lenient copy of the flow, so its failures are
    /// never reported. The action runs on a strict copy and may end on any
    /// screen. Whatever either closure does, the chain continues from this
    /// flow unchanged.
    pub async fn condition<P, PFut, A, AFut>(self, predicate: P, action: A) -> Self
    where
        P: FnOnce(Self) -> PFut,
        PFut: Future<Output = bool>,
        A: FnOnce(Self) -> AFut,
        AFut: Future,
    {
        if self.failed {
            return self;
        }
        let holds = predicate(self.fresh(true)).await;
        info!(screen = S::IDENTITY, holds, "condition evaluated");
        if holds {
            action(self.fresh(false)).await;
        }
        self
    }

    /// Run the branch matching the device idiom.
    ///
    /// An idiom without a branch passes through. An idiom that is neither a
    /// phone nor a tablet is a hard failure.
    pub async fn platform(self, platform: Platform<S>) -> Self {
        if self.failed {
            return self;
        }
        let branch = match self.session().idiom() {
            Idiom::Pad => platform.tablet,
            Idiom::Phone => platform.phone,
            Idiom::Other(name) => {
                let message = format!("no platform branch for device idiom '{name}'");
                return self.fail_hard(FailureKind::UnsupportedIdiom, message).await;
            }
        };
        match branch {
            Some(steps) => steps(self).await,
            None => self,
        }
    }

    /// Run a synchronous side effect.
    pub fn execute(self, block: impl FnOnce()) -> Self {
        if !self.failed {
            block();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::super::fixtures::*;
    use super::*;
    use crate::driver::{Gesture, MemoryDriver};

    fn branches(taken: Arc<AtomicUsize>) -> Platform<Home> {
        let on_tablet = taken.clone();
        Platform::new()
            .tablet(move |flow| async move {
                on_tablet.fetch_add(1, Ordering::SeqCst);
                flow
            })
            .phone(move |flow| async move {
                taken.fetch_add(10, Ordering::SeqCst);
                flow.tap(HomeElement::Go).await
            })
    }

    #[tokio::test]
    async fn test_platform_runs_phone_branch() {
        let taken = Arc::new(AtomicUsize::new(0));
        let (driver, session) = session_with(MemoryDriver::new(home_tree()));
        let flow = session.screen::<Home>().platform(branches(taken.clone())).await;
        assert!(flow.passed());
        assert_eq!(taken.load(Ordering::SeqCst), 10);
        assert_eq!(driver.gestures().await.len(), 1);
    }

    #[tokio::test]
    async fn test_platform_runs_tablet_branch() {
        let taken = Arc::new(AtomicUsize::new(0));
        let (driver, session) =
            session_with(MemoryDriver::new(home_tree()).with_idiom(Idiom::Pad));
        session.screen::<Home>().platform(branches(taken.clone())).await;
        assert_eq!(taken.load(Ordering::SeqCst), 1);
        assert!(driver.gestures().await.is_empty());
    }

    #[tokio::test]
    async fn test_platform_missing_branch_passes_through() {
        let (_driver, session) =
            session_with(MemoryDriver::new(home_tree()).with_idiom(Idiom::Pad));
        let flow = session
            .screen::<Home>()
            .platform(Platform::new().phone(|flow| async move { flow }))
            .await;
        assert!(flow.passed());
    }

    #[tokio::test]
    async fn test_unsupported_idiom_fails_even_when_lenient() {
        let (_driver, session) = session_with(
            MemoryDriver::new(home_tree()).with_idiom(Idiom::Other("watch".into())),
        );
        let flow = session
            .screen::<Home>()
            .lenient()
            .platform(Platform::new())
            .await;
        assert!(flow.is_failed());
        let failures = session.failures().await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::UnsupportedIdiom);
        assert!(failures[0].message.contains("watch"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_condition_predicate_failures_are_not_reported() {
        let (driver, session) = session_with(MemoryDriver::new(home_tree()));
        let flow = session
            .screen::<Home>()
            .condition(
                |f| async move { f.assert_exists([HomeElement::Missing]).await.passed() },
                |f| async move { f.tap(HomeElement::Go).await },
            )
            .await;
        assert!(flow.passed());
        assert!(!flow.is_lenient());
        assert!(session.failures().await.is_empty());
        assert!(driver.gestures().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_condition_runs_action_strictly() {
        let (driver, session) = session_with(MemoryDriver::new(home_tree()));
        let flow = session
            .screen::<Home>()
            .lenient()
            .condition(
                |f| async move { f.assert_exists([HomeElement::Go]).await.passed() },
                |f| async move {
                    assert!(!f.is_lenient());
                    f.tap(HomeElement::Go).await.assert_focused([HomeElement::Title]).await
                },
            )
            .await;

        assert!(flow.is_lenient());
        assert!(!flow.is_failed());
        assert_eq!(flow.lenient_failures(), 0);
        assert_eq!(session.failures().await.len(), 1);
        assert!(matches!(driver.gestures().await[0], Gesture::Tap { .. }));
    }

    #[tokio::test]
    async fn test_execute_skipped_once_failed() {
        let (_driver, session) = session_with(MemoryDriver::new(home_tree()));
        let calls = AtomicUsize::new(0);
        let mut flow = session.screen::<Home>().execute(|| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        flow.failed = true;
        flow.execute(|| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
