//! Per-screen fluent controllers.
//!
//! A screen is described by a type implementing [`ScreenSpec`]: an identity
//! (the accessibility identifier of its root container) and a closed enum of
//! the elements it exposes. Tests drive a screen through a [`Flow`], chaining
//! actions and assertions:
//!
//! ```rust,ignore
//! session
//!     .screen::<CapitalsList>()
//!     .tap(CapitalsElement::Row("Ghana".into()))
//!     .await
//!     .assert_transition::<CapitalView>()
//!     .await
//!     .assert_exists([CapitalElement::Name])
//!     .await;
//! ```
//!
//! # Failure propagation
//!
//! In strict mode (the default) the first failed assertion is recorded once in
//! the session report and the flow becomes *failed*: every later call on it is
//! a no-op that performs no gesture, waits for nothing and records nothing.
//! In lenient mode failures are only counted; the flow stays live and
//! [`Flow::passed`] reports whether anything went wrong.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use tracing::{debug, warn};

use crate::query::ElementQuery;
use crate::report::{Failure, FailureKind};
use crate::session::Session;
use crate::wait::{Predicate, WaitOutcome, Waiter};

mod actions;
mod assertions;
mod control;
mod keypad;

pub use control::Platform;
pub use keypad::keypad_taps;

/// Something that can be located in the accessibility tree.
pub trait ElementRepresentable {
    /// Query locating the element from the application root.
    fn query(&self) -> ElementQuery;
}

impl ElementRepresentable for ElementQuery {
    fn query(&self) -> ElementQuery {
        self.clone()
    }
}

/// Static description of one screen of the application.
pub trait ScreenSpec: 'static {
    /// Accessibility identifier of the screen's root container.
    const IDENTITY: &'static str;

    /// Elements of the screen that tests may address.
    type Element: ElementRepresentable + fmt::Debug + Send + Sync;

    /// Name passed through the launch environment to open on this screen.
    fn launch_name() -> &'static str {
        Self::IDENTITY
    }

    /// Query for the screen's root container.
    fn root_query() -> ElementQuery {
        ElementQuery::root().identifier(Self::IDENTITY)
    }
}

/// Settings of a flow on screen `S`.
pub struct Screen<S> {
    session: Session,
    lenient: bool,
    timeout: Duration,
    _screen: PhantomData<fn() -> S>,
}

impl<S> Screen<S> {
    fn cast<T>(self) -> Screen<T> {
        Screen {
            session: self.session,
            lenient: self.lenient,
            timeout: self.timeout,
            _screen: PhantomData,
        }
    }
}

impl<S> Clone for Screen<S> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            lenient: self.lenient,
            timeout: self.timeout,
            _screen: PhantomData,
        }
    }
}

/// Outcome of a chain of steps on screen `S`, and the handle to continue it.
pub struct Flow<S> {
    screen: Screen<S>,
    failed: bool,
    lenient_failures: usize,
}

impl<S> Clone for Flow<S> {
    fn clone(&self) -> Self {
        Self {
            screen: self.screen.clone(),
            failed: self.failed,
            lenient_failures: self.lenient_failures,
        }
    }
}

impl<S> fmt::Debug for Flow<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("screen", &std::any::type_name::<S>())
            .field("failed", &self.failed)
            .field("lenient", &self.screen.lenient)
            .field("lenient_failures", &self.lenient_failures)
            .finish()
    }
}

impl<S: ScreenSpec> Flow<S> {
    pub(crate) fn new(session: Session) -> Self {
        let timeout = session.config().timeouts.short;
        Self {
            screen: Screen {
                session,
                lenient: false,
                timeout,
                _screen: PhantomData,
            },
            failed: false,
            lenient_failures: 0,
        }
    }

    /// The session this flow runs in.
    pub fn session(&self) -> &Session {
        &self.screen.session
    }

    /// Whether a strict failure ended this flow.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Whether failures are counted instead of reported.
    pub fn is_lenient(&self) -> bool {
        self.screen.lenient
    }

    /// Failures counted while lenient.
    pub fn lenient_failures(&self) -> usize {
        self.lenient_failures
    }

    /// Whether every step so far succeeded.
    pub fn passed(&self) -> bool {
        !self.failed && self.lenient_failures == 0
    }

    /// Timeout used by the following assertions and action waits.
    pub fn current_timeout(&self) -> Duration {
        self.screen.timeout
    }

    /// Count failures instead of reporting them for the rest of the chain.
    pub fn lenient(mut self) -> Self {
        self.screen.lenient = true;
        self
    }

    /// Report failures and stop at the first one for the rest of the chain.
    pub fn strict(mut self) -> Self {
        self.screen.lenient = false;
        self
    }

    /// Set the assertion timeout for the rest of the chain.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        if !self.failed {
            self.screen.timeout = timeout;
        }
        self
    }

    /// Use the configured long timeout for the rest of the chain.
    pub fn long_timeout(self) -> Self {
        let timeout = self.session().config().timeouts.long;
        self.timeout(timeout)
    }

    /// Use the configured longer timeout for the rest of the chain.
    pub fn longer_timeout(self) -> Self {
        let timeout = self.session().config().timeouts.longer;
        self.timeout(timeout)
    }

    /// Continue with an arbitrary step. Skipped once the flow has failed.
    pub async fn then<F, Fut>(self, step: F) -> Self
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Self>,
    {
        if self.failed {
            return self;
        }
        step(self).await
    }

    /// Print the current element tree to the test output.
    pub async fn debug_print_elements(self) -> Self {
        if self.failed {
            return self;
        }
        match self.session().snapshot().await {
            Ok(tree) => println!("{}", tree.describe()),
            Err(e) => warn!(error = %e, "could not snapshot elements"),
        }
        self
    }

    fn fresh(&self, lenient: bool) -> Self {
        let mut flow = self.clone();
        flow.screen.lenient = lenient;
        flow.failed = false;
        flow.lenient_failures = 0;
        flow
    }

    fn cast<T>(self) -> Flow<T> {
        Flow {
            screen: self.screen.cast(),
            failed: self.failed,
            lenient_failures: self.lenient_failures,
        }
    }

    fn waiter(&self, query: ElementQuery, predicate: Predicate) -> Waiter<'_> {
        self.session()
            .wait_for(query, predicate)
            .timeout(self.screen.timeout)
    }

    /// Register a failure according to the current mode.
    async fn fail(mut self, kind: FailureKind, message: String) -> Self {
        if self.screen.lenient {
            self.lenient_failures += 1;
            debug!(screen = S::IDENTITY, %kind, %message, "lenient failure");
            return self;
        }
        self.record(kind, message).await;
        self
    }

    /// Record and stop regardless of mode.
    async fn fail_hard(mut self, kind: FailureKind, message: String) -> Self {
        self.record(kind, message).await;
        self
    }

    async fn record(&mut self, kind: FailureKind, message: String) {
        self.session()
            .record(Failure::new(kind, S::IDENTITY, message))
            .await;
        self.failed = true;
    }
}

fn failure_kind(outcome: &WaitOutcome) -> FailureKind {
    match outcome {
        WaitOutcome::Mismatch { .. } => FailureKind::StateMismatch,
        _ => FailureKind::ElementNotFound,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::SessionConfig;
    use crate::driver::MemoryDriver;
    use crate::tree::{ElementType, Frame, Node};

    pub struct Home;

    #[derive(Debug, Clone, Copy)]
    pub enum HomeElement {
        Title,
        Go,
        Missing,
        Name,
    }

    impl ElementRepresentable for HomeElement {
        fn query(&self) -> ElementQuery {
            let root = Home::root_query();
            match self {
                HomeElement::Title => root.static_text("Home.Title"),
                HomeElement::Go => root.button("Go"),
                HomeElement::Missing => root.button("Missing"),
                HomeElement::Name => root.text_field("Home.Name"),
            }
        }
    }

    impl ScreenSpec for Home {
        const IDENTITY: &'static str = "Home";
        type Element = HomeElement;
    }

    pub struct Detail;

    impl ScreenSpec for Detail {
        const IDENTITY: &'static str = "Detail";
        type Element = ElementQuery;
    }

    pub fn home_tree() -> Node {
        Node::new(ElementType::Application)
            .frame(Frame::new(0.0, 0.0, 320.0, 480.0))
            .child(
                Node::new(ElementType::Other)
                    .identifier("Home")
                    .frame(Frame::new(0.0, 0.0, 320.0, 480.0))
                    .child(
                        Node::new(ElementType::StaticText)
                            .identifier("Home.Title")
                            .label("Welcome")
                            .frame(Frame::new(10.0, 10.0, 200.0, 20.0)),
                    )
                    .child(
                        Node::new(ElementType::Button)
                            .label("Go")
                            .frame(Frame::new(10.0, 40.0, 60.0, 30.0)),
                    )
                    .child(
                        Node::new(ElementType::TextField)
                            .identifier("Home.Name")
                            .value("Accra")
                            .frame(Frame::new(10.0, 80.0, 200.0, 30.0)),
                    ),
            )
    }

    pub fn quick_config() -> SessionConfig {
        SessionConfig::new()
            .short_timeout(Duration::from_millis(300))
            .poll_interval(Duration::from_millis(50))
    }

    pub fn session_with(driver: MemoryDriver) -> (Arc<MemoryDriver>, Session) {
        let driver = Arc::new(driver);
        let session = Session::attach(driver.clone(), quick_config());
        (driver, session)
    }
}
