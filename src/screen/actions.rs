//! Gestures performed through a flow.
//!
//! Each action first waits for its element to reach the state the gesture
//! needs. When that wait fails the gesture is skipped; what happens next
//! depends on the session's [`ActionFailurePolicy`].

use std::time::Duration;

use tracing::{info, warn};

use super::{ElementRepresentable, Flow, ScreenSpec, failure_kind, keypad_taps};
use crate::config::ActionFailurePolicy;
use crate::driver::{Gesture, Target};
use crate::input::{Key, KeyboardAction, ScrollDirection, SwipeDirection, Velocity};
use crate::query::{ElementQuery, ResolvedElement};
use crate::report::FailureKind;
use crate::wait::{Predicate, WaitOutcome};

/// Identifier of the control that confirms numeric keypad entry.
pub(crate) const RETURN_KEY: &str = "returnKeyEnabled";

/// Identifier of the button hiding the numeric keypad.
pub(crate) const HIDE_NUMERIC_KEYBOARD: &str = "numeric.keyboard.hide";

impl<S: ScreenSpec> Flow<S> {
    /// Wait for `query` to satisfy `predicate` before acting on it.
    ///
    /// Returns the flow and, when the wait held, the element to act on.
    async fn prepare(
        self,
        action: &str,
        query: ElementQuery,
        predicate: Predicate,
    ) -> (Self, Option<ResolvedElement>) {
        let label = query.to_string();
        let outcome = self.waiter(query, predicate).outcome().await;
        if let WaitOutcome::Satisfied {
            element: Some(element),
        } = &outcome
        {
            return (self, Some(element.clone()));
        }

        let detail = format!(
            "{action} {label}: {}",
            describe(&outcome, predicate, self.current_timeout())
        );
        match self.session().config().action_failures {
            ActionFailurePolicy::Defer => {
                warn!(screen = S::IDENTITY, "{detail}; gesture skipped");
                (self, None)
            }
            ActionFailurePolicy::Fail => {
                let kind = failure_kind(&outcome);
                (self.fail(kind, detail).await, None)
            }
        }
    }

    async fn perform(self, gesture: Gesture) -> Self {
        match self.session().perform(gesture).await {
            Ok(()) => self,
            Err(e) => {
                let message = format!("driver rejected gesture: {e}");
                self.fail(FailureKind::DriverError, message).await
            }
        }
    }

    async fn tap_query(self, query: ElementQuery) -> Self {
        if self.failed {
            return self;
        }
        let (flow, element) = self.prepare("tap", query, Predicate::Enabled).await;
        match element {
            Some(element) => {
                let target = Target::from_resolved(&element);
                flow.perform(Gesture::Tap { target }).await
            }
            None => flow,
        }
    }

    /// Tap the element once it is enabled.
    pub async fn tap(self, element: S::Element) -> Self {
        self.tap_query(element.query()).await
    }

    /// Double-tap the element once it is enabled.
    pub async fn double_tap(self, element: S::Element) -> Self {
        if self.failed {
            return self;
        }
        let (flow, element) = self
            .prepare("double tap", element.query(), Predicate::Enabled)
            .await;
        match element {
            Some(element) => {
                let target = Target::from_resolved(&element);
                flow.perform(Gesture::DoubleTap { target }).await
            }
            None => flow,
        }
    }

    /// Press and hold the element for the configured press duration.
    pub async fn long_press(self, element: S::Element) -> Self {
        if self.failed {
            return self;
        }
        let duration = self.session().config().press_duration;
        let (flow, element) = self
            .prepare("long press", element.query(), Predicate::Exists)
            .await;
        match element {
            Some(element) => {
                let target = Target::from_resolved(&element);
                flow.perform(Gesture::Press { target, duration }).await
            }
            None => flow,
        }
    }

    /// Swipe quickly on the element.
    pub async fn swipe(self, element: S::Element, direction: SwipeDirection) -> Self {
        if self.failed {
            return self;
        }
        let (flow, element) = self
            .prepare("swipe", element.query(), Predicate::Exists)
            .await;
        match element {
            Some(element) => {
                let target = Target::from_resolved(&element);
                let gesture = Gesture::Swipe {
                    target,
                    direction,
                    velocity: Velocity::Fast,
                };
                flow.perform(gesture).await
            }
            None => flow,
        }
    }

    /// Press `source`, drag it onto `target` and hold there.
    ///
    /// `hold` defaults to the configured drag hold.
    pub async fn drag(
        self,
        source: S::Element,
        target: S::Element,
        hold: Option<Duration>,
    ) -> Self {
        if self.failed {
            return self;
        }
        let config = self.session().config();
        let press = config.press_duration;
        let hold = hold.unwrap_or(config.drag_hold);

        let (flow, from) = self
            .prepare("drag", source.query(), Predicate::Exists)
            .await;
        let Some(from) = from else {
            return flow;
        };
        let (flow, to) = flow
            .prepare("drag onto", target.query(), Predicate::Exists)
            .await;
        let Some(to) = to else {
            return flow;
        };

        let gesture = Gesture::Drag {
            target: Target::from_resolved(&from),
            from: from.node.frame.center(),
            to: to.node.frame.center(),
            press,
            hold,
            velocity: Velocity::Default,
        };
        flow.perform(gesture).await
    }

    /// Scroll content in `direction`.
    ///
    /// Without an element the screen's root container is scrolled.
    pub async fn scroll(
        self,
        element: Option<S::Element>,
        direction: ScrollDirection,
        velocity: Velocity,
    ) -> Self {
        if self.failed {
            return self;
        }
        let query = element.map_or_else(S::root_query, |e| e.query());
        let (flow, element) = self.prepare("scroll", query, Predicate::Exists).await;
        match element {
            Some(element) => {
                let gesture = Gesture::Swipe {
                    target: Target::from_resolved(&element),
                    direction: direction.swipe(),
                    velocity,
                };
                flow.perform(gesture).await
            }
            None => flow,
        }
    }

    /// Pull down from the top of `anchor` to trigger a refresh.
    pub async fn pull_to_refresh(self, anchor: S::Element) -> Self {
        if self.failed {
            return self;
        }
        let (flow, element) = self
            .prepare("pull to refresh", anchor.query(), Predicate::Exists)
            .await;
        match element {
            Some(element) => {
                let frame = element.node.frame;
                let gesture = Gesture::Drag {
                    target: Target::from_resolved(&element),
                    from: frame.point_at(0.0, 0.0),
                    to: frame.point_at(0.0, 6.0),
                    press: Duration::ZERO,
                    hold: Duration::ZERO,
                    velocity: Velocity::Default,
                };
                flow.perform(gesture).await
            }
            None => flow,
        }
    }

    /// Type into the focused element.
    pub async fn type_text(self, text: &str) -> Self {
        if self.failed {
            return self;
        }
        self.perform(Gesture::TypeText {
            text: text.to_string(),
        })
        .await
    }

    /// Focus the element and delete its current text.
    pub async fn clear_text(self, element: S::Element) -> Self {
        if self.failed {
            return self;
        }
        let (flow, element) = self
            .prepare("clear text", element.query(), Predicate::Exists)
            .await;
        let Some(element) = element else {
            return flow;
        };
        let Some(value) = element.node.value.clone() else {
            let message = format!("cannot clear {}: it has no text value", element.node.summary());
            return flow.fail_hard(FailureKind::UsageError, message).await;
        };

        let target = Target::from_resolved(&element);
        flow.perform(Gesture::Tap { target })
            .await
            .type_text(&Key::Delete.repeated(value.chars().count()))
            .await
    }

    /// Tap the on-screen keyboard key performing `action`.
    pub async fn keyboard_action(self, action: KeyboardAction) -> Self {
        let query = ElementQuery::root().keyboards().button(action.descriptor());
        self.tap_query(query).await
    }

    /// Enter `value` on the numeric keypad, then optionally confirm.
    pub async fn tap_numeric_keys(self, value: u64, proceed: bool) -> Self {
        if self.failed {
            return self;
        }
        info!(value, proceed, "entering numeric value");
        let mut flow = self;
        for key in keypad_taps(value) {
            let before = flow.lenient_failures;
            flow = flow.tap_query(ElementQuery::root().button(key)).await;
            if flow.failed || flow.lenient_failures > before {
                return flow;
            }
        }
        if proceed {
            flow = flow.tap_query(ElementQuery::root().button(RETURN_KEY)).await;
        }
        flow
    }

    /// Hide the numeric keypad.
    pub async fn dismiss_numeric_keyboard(self) -> Self {
        self.tap_query(ElementQuery::root().button(HIDE_NUMERIC_KEYBOARD))
            .await
    }
}

fn describe(outcome: &WaitOutcome, predicate: Predicate, timeout: Duration) -> String {
    match outcome.element() {
        Some(element) => format!(
            "{} did not {} within {timeout:?}",
            element.node.summary(),
            predicate.description()
        ),
        None => format!(
            "never found an element to {} within {timeout:?}",
            predicate.description()
        ),
    }
}
