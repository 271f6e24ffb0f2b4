//! Convenient re-exports for common usage.
//!
//! ```rust
//! use uiwright::prelude::*;
//! ```

pub use crate::config::{ActionFailurePolicy, ArtifactMode, SessionConfig, Timeouts};
pub use crate::driver::{Driver, Gesture, GestureHandler, Idiom, LaunchConfig, MemoryDriver};
pub use crate::error::{Result, UiwrightError};
pub use crate::input::{Key, KeyboardAction, ScrollDirection, SwipeDirection, Velocity};
pub use crate::output::{Screenshot, ScreenshotConfig};
pub use crate::query::{ElementQuery, ResolvedElement, Role};
pub use crate::report::{Failure, FailureKind, Report};
pub use crate::screen::{ElementRepresentable, Flow, Platform, ScreenSpec};
pub use crate::session::Session;
pub use crate::tree::{ElementType, Frame, Node, Point};
pub use crate::wait::{DurationExt, Predicate, WaitOutcome};
