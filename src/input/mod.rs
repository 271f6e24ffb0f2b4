//! Input vocabulary: gesture directions, speeds and keyboard keys.

mod gesture;
mod keys;

pub use gesture::{ScrollDirection, SwipeDirection, Velocity};
pub use keys::{Key, KeyboardAction};
