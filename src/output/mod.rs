//! Screenshot output.

mod image;

pub use image::{Screenshot, ScreenshotConfig};
