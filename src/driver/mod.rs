//! The boundary to the application under test.
//!
//! A [`Driver`] supplies tree snapshots, performs gestures and reports the
//! device idiom. Everything above it (queries, waits, screen flows) is
//! independent of the platform doing the work.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::input::{SwipeDirection, Velocity};
use crate::query::ResolvedElement;
use crate::tree::{Frame, Node, Point};

mod memory;

pub use memory::{GestureHandler, MemoryDriver};

/// Launch-environment key naming the screen the app should open on.
pub const LAUNCH_SCREEN_ENV: &str = "uitesting.launchScreen";

/// The element a gesture is aimed at, as resolved just before performing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Index path from the snapshot root.
    pub path: Vec<usize>,
    /// Accessibility identifier, if any.
    pub identifier: Option<String>,
    /// Visible label, if any.
    pub label: Option<String>,
    /// Screen rectangle at resolution time.
    pub frame: Frame,
}

impl Target {
    /// Build a target from a freshly resolved element.
    pub fn from_resolved(element: &ResolvedElement) -> Self {
        Self {
            path: element.path.clone(),
            identifier: element.node.identifier.clone(),
            label: element.node.label.clone(),
            frame: element.node.frame,
        }
    }

    /// Whether `id` equals the identifier or label of the target.
    pub fn matches_id(&self, id: &str) -> bool {
        self.identifier.as_deref() == Some(id) || self.label.as_deref() == Some(id)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.identifier, &self.label) {
            (Some(id), _) => write!(f, "'{id}'"),
            (None, Some(label)) => write!(f, "'{label}'"),
            (None, None) => write!(f, "{:?}", self.path),
        }
    }
}

/// A single interaction with the application.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Single tap at the target's center.
    Tap { target: Target },
    /// Two taps in quick succession.
    DoubleTap { target: Target },
    /// Touch and hold.
    Press { target: Target, duration: Duration },
    /// Swipe starting on the target.
    Swipe {
        target: Target,
        direction: SwipeDirection,
        velocity: Velocity,
    },
    /// Press at `from`, move to `to`, then hold before lifting.
    Drag {
        target: Target,
        from: Point,
        to: Point,
        press: Duration,
        hold: Duration,
        velocity: Velocity,
    },
    /// Type into whatever element currently has focus.
    TypeText { text: String },
}

impl Gesture {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Tap { .. } => "tap",
            Gesture::DoubleTap { .. } => "double_tap",
            Gesture::Press { .. } => "press",
            Gesture::Swipe { .. } => "swipe",
            Gesture::Drag { .. } => "drag",
            Gesture::TypeText { .. } => "type_text",
        }
    }

    /// The element the gesture is aimed at, if any.
    pub fn target(&self) -> Option<&Target> {
        match self {
            Gesture::Tap { target }
            | Gesture::DoubleTap { target }
            | Gesture::Press { target, .. }
            | Gesture::Swipe { target, .. }
            | Gesture::Drag { target, .. } => Some(target),
            Gesture::TypeText { .. } => None,
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gesture::TypeText { text } => write!(f, "type_text {text:?}"),
            Gesture::Swipe {
                target, direction, ..
            } => write!(f, "swipe {direction} on {target}"),
            other => match other.target() {
                Some(target) => write!(f, "{} {target}", other.name()),
                None => f.write_str(other.name()),
            },
        }
    }
}

/// Device family of the running application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Idiom {
    Phone,
    Pad,
    /// Anything else (desktop, TV, watch...). Carries the platform's own name.
    Other(String),
}

impl fmt::Display for Idiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Idiom::Phone => write!(f, "phone"),
            Idiom::Pad => write!(f, "pad"),
            Idiom::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Environment handed to the application at launch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Launch environment variables.
    pub env: HashMap<String, String>,
    /// Launch arguments.
    pub arguments: Vec<String>,
}

impl LaunchConfig {
    /// Create an empty launch configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Append a launch argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    /// Ask the application to open directly on the named screen.
    pub fn launch_screen(self, name: impl Into<String>) -> Self {
        self.env(LAUNCH_SCREEN_ENV, name)
    }

    /// The screen the application was asked to open on, if any.
    pub fn get_launch_screen(&self) -> Option<&str> {
        self.env.get(LAUNCH_SCREEN_ENV).map(String::as_str)
    }
}

/// Platform automation backend.
///
/// Implementations must be cheap to call repeatedly: the waiter takes a fresh
/// snapshot on every poll.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Launch the application with the given environment.
    async fn launch(&self, config: &LaunchConfig) -> Result<()>;

    /// Capture the current accessibility tree.
    async fn snapshot(&self) -> Result<Node>;

    /// Perform a gesture.
    async fn perform(&self, gesture: Gesture) -> Result<()>;

    /// Device idiom of the running application.
    fn idiom(&self) -> Idiom;

    /// Capture a PNG screenshot.
    ///
    /// `None` means the backend cannot capture pixels; a wireframe rendered
    /// from the snapshot is used instead.
    async fn screenshot(&self) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ElementType;

    #[test]
    fn test_launch_screen_env() {
        let config = LaunchConfig::new().launch_screen("CapitalView");
        assert_eq!(config.get_launch_screen(), Some("CapitalView"));
        assert_eq!(
            config.env.get("uitesting.launchScreen").map(String::as_str),
            Some("CapitalView")
        );
        assert_eq!(LaunchConfig::new().get_launch_screen(), None);
    }

    #[test]
    fn test_target_from_resolved() {
        let element = ResolvedElement {
            path: vec![0, 2],
            node: Node::new(ElementType::Button)
                .label("Back")
                .frame(Frame::new(0.0, 40.0, 80.0, 44.0)),
        };
        let target = Target::from_resolved(&element);
        assert_eq!(target.path, vec![0, 2]);
        assert!(target.matches_id("Back"));
        assert_eq!(target.frame.center(), Point::new(40.0, 62.0));

        let gesture = Gesture::Tap { target };
        assert_eq!(gesture.to_string(), "tap 'Back'");
        assert_eq!(gesture.name(), "tap");
    }

    #[test]
    fn test_idiom_display() {
        assert_eq!(Idiom::Pad.to_string(), "pad");
        assert_eq!(Idiom::Other("tv".into()).to_string(), "tv");
    }

    #[test]
    fn test_default_screenshot_is_unavailable() {
        struct Blind;

        #[async_trait]
        impl Driver for Blind {
            async fn launch(&self, _config: &LaunchConfig) -> Result<()> {
                Ok(())
            }

            async fn snapshot(&self) -> Result<Node> {
                Ok(Node::new(ElementType::Application))
            }

            async fn perform(&self, _gesture: Gesture) -> Result<()> {
                Ok(())
            }

            fn idiom(&self) -> Idiom {
                Idiom::Phone
            }
        }

        let png = tokio_test::block_on(Blind.screenshot()).unwrap();
        assert!(png.is_none());
    }
}
