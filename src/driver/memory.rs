//! In-process driver over a live, mutable tree.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{Driver, Gesture, Idiom, LaunchConfig};
use crate::error::{Result, UiwrightError};
use crate::input::Key;
use crate::tree::{ElementType, Node};

/// Simulated application logic for a [`MemoryDriver`].
pub trait GestureHandler: Send {
    /// Called once per launch, before the first snapshot.
    fn on_launch(&mut self, tree: &mut Node, config: &LaunchConfig) {
        let _ = (tree, config);
    }

    /// React to a gesture by mutating the tree.
    ///
    /// Return `true` when the gesture was fully handled; `false` falls through
    /// to the driver's built-in text editing and focus behavior.
    fn on_gesture(&mut self, tree: &mut Node, gesture: &Gesture) -> bool {
        let _ = (tree, gesture);
        false
    }
}

/// A [`Driver`] that keeps the application tree in memory.
///
/// Every performed gesture is logged. Without a handler the driver still
/// focuses text fields on tap and applies typed text to the focused node.
pub struct MemoryDriver {
    tree: Arc<Mutex<Node>>,
    handler: Mutex<Option<Box<dyn GestureHandler>>>,
    gestures: Mutex<Vec<Gesture>>,
    launches: Mutex<Vec<LaunchConfig>>,
    idiom: Idiom,
    screenshot: Option<Vec<u8>>,
}

impl MemoryDriver {
    /// Create a phone-idiom driver over `tree`.
    pub fn new(tree: Node) -> Self {
        Self {
            tree: Arc::new(Mutex::new(tree)),
            handler: Mutex::new(None),
            gestures: Mutex::new(Vec::new()),
            launches: Mutex::new(Vec::new()),
            idiom: Idiom::Phone,
            screenshot: None,
        }
    }

    /// Attach simulated application logic.
    pub fn with_handler(mut self, handler: impl GestureHandler + 'static) -> Self {
        self.handler = Mutex::new(Some(Box::new(handler)));
        self
    }

    /// Set the reported device idiom.
    pub fn with_idiom(mut self, idiom: Idiom) -> Self {
        self.idiom = idiom;
        self
    }

    /// Serve fixed PNG bytes from [`Driver::screenshot`].
    pub fn with_screenshot(mut self, png: Vec<u8>) -> Self {
        self.screenshot = Some(png);
        self
    }

    /// Shared handle to the live tree, for mutations made outside gestures.
    pub fn tree(&self) -> Arc<Mutex<Node>> {
        self.tree.clone()
    }

    /// Replace the whole tree.
    pub async fn set_tree(&self, tree: Node) {
        *self.tree.lock().await = tree;
    }

    /// Gestures performed so far, oldest first.
    pub async fn gestures(&self) -> Vec<Gesture> {
        self.gestures.lock().await.clone()
    }

    /// Launch configurations received so far.
    pub async fn launches(&self) -> Vec<LaunchConfig> {
        self.launches.lock().await.clone()
    }
}

fn accepts_text(element_type: ElementType) -> bool {
    matches!(
        element_type,
        ElementType::TextField | ElementType::SearchField
    )
}

fn apply_builtin(tree: &mut Node, gesture: &Gesture) -> Result<()> {
    match gesture {
        Gesture::Tap { target } => {
            let is_text = tree
                .at_path(&target.path)
                .is_some_and(|node| accepts_text(node.element_type));
            if is_text {
                tree.clear_focus();
                if let Some(node) = tree.at_path_mut(&target.path) {
                    node.focused = true;
                }
            }
            Ok(())
        }
        Gesture::TypeText { text } => {
            let path = tree.focused_path().ok_or_else(|| {
                UiwrightError::Driver("no focused element to type into".to_string())
            })?;
            let Some(node) = tree.at_path_mut(&path) else {
                return Ok(());
            };
            let value = node.value.get_or_insert_with(String::new);
            for c in text.chars() {
                match Key::from_char(c) {
                    Key::Delete => {
                        value.pop();
                    }
                    Key::Return => {}
                    Key::Char(c) => value.push(c),
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn launch(&self, config: &LaunchConfig) -> Result<()> {
        self.launches.lock().await.push(config.clone());
        let mut tree = self.tree.lock().await;
        if let Some(handler) = self.handler.lock().await.as_mut() {
            handler.on_launch(&mut tree, config);
        }
        debug!(screen = ?config.get_launch_screen(), "memory driver launched");
        Ok(())
    }

    async fn snapshot(&self) -> Result<Node> {
        Ok(self.tree.lock().await.clone())
    }

    async fn perform(&self, gesture: Gesture) -> Result<()> {
        debug!(%gesture, "memory driver gesture");
        self.gestures.lock().await.push(gesture.clone());

        let mut tree = self.tree.lock().await;
        let handled = match self.handler.lock().await.as_mut() {
            Some(handler) => handler.on_gesture(&mut tree, &gesture),
            None => false,
        };
        if handled {
            return Ok(());
        }
        apply_builtin(&mut tree, &gesture)
    }

    fn idiom(&self) -> Idiom {
        self.idiom.clone()
    }

    async fn screenshot(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.screenshot.clone())
    }
}
