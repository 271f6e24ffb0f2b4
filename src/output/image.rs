//! Wireframe rendering of tree snapshots.

use std::path::Path;
use std::sync::OnceLock;

use ab_glyph::{FontVec, PxScale};
use font_kit::{family_name::FamilyName, handle::Handle, source::SystemSource};
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::warn;

use crate::error::{Result, UiwrightError};
use crate::tree::{ElementType, Node};

const MAX_SIDE: f64 = 8192.0;

/// Configuration for screenshot rendering.
#[derive(Debug, Clone)]
pub struct ScreenshotConfig {
    /// Font family name (None = system monospace).
    pub font_name: Option<String>,
    /// Font size in pixels.
    pub font_size: f32,
    /// Pixels per layout point.
    pub scale: f64,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            font_name: None,
            font_size: 12.0,
            scale: 1.0,
        }
    }
}

/// A wireframe picture of a tree snapshot.
///
/// Every element with a non-empty frame is drawn as an outlined box colored by
/// element type, with its label (or identifier) written in the top-left corner
/// when a font is available.
pub struct Screenshot {
    tree: Node,
    config: ScreenshotConfig,
}

impl Screenshot {
    /// Create a new screenshot from a snapshot.
    pub fn new(tree: Node) -> Self {
        Self {
            tree,
            config: ScreenshotConfig::default(),
        }
    }

    /// Create a screenshot with custom configuration.
    pub fn with_config(tree: Node, config: ScreenshotConfig) -> Self {
        Self { tree, config }
    }

    /// Set the font family.
    pub fn font(mut self, name: &str, size: f32) -> Self {
        self.config.font_name = Some(name.to_string());
        self.config.font_size = size;
        self
    }

    /// Set the pixels-per-point scale.
    pub fn scale(mut self, scale: f64) -> Self {
        self.config.scale = scale;
        self
    }

    /// Render to an image buffer.
    pub fn render(&self) -> Result<RgbaImage> {
        render_tree(&self.tree, &self.config)
    }

    /// Save the screenshot to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let image = self.render()?;
        image
            .save(path)
            .map_err(|e| UiwrightError::Image(e.to_string()))?;
        Ok(())
    }

    /// Get the screenshot as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let image = self.render()?;
        let mut bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
        image
            .write_with_encoder(encoder)
            .map_err(|e| UiwrightError::Image(e.to_string()))?;
        Ok(bytes)
    }
}

fn load_font(name: Option<&str>) -> Result<FontVec> {
    let source = SystemSource::new();
    let family = match name {
        Some(name) => FamilyName::Title(name.to_string()),
        None => FamilyName::Monospace,
    };
    let handle = source
        .select_best_match(&[family], &Default::default())
        .map_err(|e| UiwrightError::Font(e.to_string()))?;

    let (font_data, index) = match handle {
        Handle::Path { path, font_index } => (
            std::fs::read(path).map_err(|e| UiwrightError::Font(e.to_string()))?,
            font_index,
        ),
        Handle::Memory { bytes, font_index } => (bytes.to_vec(), font_index),
    };

    FontVec::try_from_vec_and_index(font_data, index)
        .map_err(|e| UiwrightError::Font(e.to_string()))
}

fn default_font() -> Option<&'static FontVec> {
    static FONT: OnceLock<Option<FontVec>> = OnceLock::new();
    FONT.get_or_init(|| match load_font(None) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!(error = %e, "no monospace font available, rendering without labels");
            None
        }
    })
    .as_ref()
}

fn color_for(element_type: ElementType) -> Rgba<u8> {
    match element_type {
        ElementType::Application | ElementType::Window => Rgba([160, 160, 160, 255]),
        ElementType::Other => Rgba([200, 200, 200, 255]),
        ElementType::Button | ElementType::Link | ElementType::Key => Rgba([33, 110, 230, 255]),
        ElementType::StaticText => Rgba([40, 40, 40, 255]),
        ElementType::TextField | ElementType::SearchField => Rgba([20, 150, 70, 255]),
        ElementType::Cell | ElementType::Table | ElementType::CollectionView => {
            Rgba([140, 90, 200, 255])
        }
        ElementType::Switch | ElementType::Toggle | ElementType::SegmentedControl => {
            Rgba([230, 140, 20, 255])
        }
        ElementType::Keyboard => Rgba([90, 90, 120, 255]),
        _ => Rgba([110, 110, 110, 255]),
    }
}

fn canvas_size(tree: &Node, scale: f64) -> (u32, u32) {
    let (width, height) = tree
        .walk()
        .into_iter()
        .fold((0.0f64, 0.0f64), |(w, h), (_, node)| {
            (
                w.max(node.frame.x + node.frame.width),
                h.max(node.frame.y + node.frame.height),
            )
        });
    (
        (width * scale).ceil().clamp(0.0, MAX_SIDE) as u32,
        (height * scale).ceil().clamp(0.0, MAX_SIDE) as u32,
    )
}

/// Render a snapshot to an image.
fn render_tree(tree: &Node, config: &ScreenshotConfig) -> Result<RgbaImage> {
    let (width, height) = canvas_size(tree, config.scale);
    if width == 0 || height == 0 {
        return Err(UiwrightError::Image(
            "snapshot has no element with a visible frame".to_string(),
        ));
    }

    let custom_font = match &config.font_name {
        Some(name) => Some(load_font(Some(name))?),
        None => None,
    };
    let font = custom_font.as_ref().or_else(|| default_font());
    let text_scale = PxScale::from(config.font_size);

    let mut image: RgbaImage = ImageBuffer::new(width, height);
    draw_filled_rect_mut(
        &mut image,
        Rect::at(0, 0).of_size(width, height),
        Rgba([255, 255, 255, 255]),
    );

    // Pre-order: parents first, so children are drawn on top.
    for (_, node) in tree.walk() {
        let frame = node.frame;
        let w = (frame.width * config.scale).round();
        let h = (frame.height * config.scale).round();
        if w < 1.0 || h < 1.0 {
            continue;
        }
        let x = (frame.x * config.scale).round() as i32;
        let y = (frame.y * config.scale).round() as i32;
        let color = color_for(node.element_type);
        draw_hollow_rect_mut(&mut image, Rect::at(x, y).of_size(w as u32, h as u32), color);
        if node.focused && w > 2.0 && h > 2.0 {
            let inner = Rect::at(x + 1, y + 1).of_size(w as u32 - 2, h as u32 - 2);
            draw_hollow_rect_mut(&mut image, inner, color);
        }

        let caption = node.label.as_deref().or(node.identifier.as_deref());
        if let (Some(font), Some(caption)) = (font, caption) {
            draw_text_mut(&mut image, color, x + 2, y + 1, text_scale, font, caption);
        }
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Frame;

    fn screen() -> Node {
        Node::new(ElementType::Application)
            .frame(Frame::new(0.0, 0.0, 40.0, 30.0))
            .child(
                Node::new(ElementType::Button)
                    .frame(Frame::new(5.0, 5.0, 10.0, 10.0)),
            )
    }

    #[test]
    fn test_screenshot_config_default() {
        let config = ScreenshotConfig::default();
        assert_eq!(config.font_size, 12.0);
        assert_eq!(config.scale, 1.0);
        assert!(config.font_name.is_none());
    }

    #[test]
    fn test_canvas_covers_all_frames() {
        let tree = screen().child(Node::new(ElementType::Other).frame(Frame::new(30.0, 20.0, 20.0, 20.0)));
        assert_eq!(canvas_size(&tree, 1.0), (50, 40));
        assert_eq!(canvas_size(&tree, 2.0), (100, 80));
    }

    #[test]
    fn test_render_outlines_elements() {
        let image = Screenshot::new(screen()).render().unwrap();
        assert_eq!(image.dimensions(), (40, 30));
        assert_eq!(*image.get_pixel(5, 5), color_for(ElementType::Button));
        assert_eq!(*image.get_pixel(10, 10), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_empty_tree_is_an_error() {
        let err = Screenshot::new(Node::new(ElementType::Application)).to_png();
        assert!(matches!(err, Err(UiwrightError::Image(_))));
    }
}
