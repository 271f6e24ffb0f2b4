//! Accessibility tree snapshots.
//!
//! A [`Node`] is a detached copy of the application's UI tree at one moment.
//! Queries are resolved against snapshots; nothing here talks to the driver.

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UiwrightError};

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The on-screen rectangle occupied by an element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Frame {
    /// Create a new frame.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Point at a normalized offset inside (or beyond) the frame.
    ///
    /// `(0, 0)` is the top-left corner and `(1, 1)` the bottom-right corner.
    /// Offsets above 1 land outside the frame.
    pub fn point_at(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + self.width * dx, self.y + self.height * dy)
    }

    /// Center of the frame.
    pub fn center(&self) -> Point {
        self.point_at(0.5, 0.5)
    }

    /// Whether the point lies inside the frame.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Category of a node in the accessibility tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Application,
    Window,
    Other,
    Button,
    Cell,
    CollectionView,
    Dialog,
    Image,
    Link,
    MenuBar,
    MenuBarItem,
    MenuItem,
    NavigationBar,
    Picker,
    SegmentedControl,
    SearchField,
    StaticText,
    Switch,
    ScrollBar,
    ScrollView,
    Tab,
    Table,
    TextField,
    Toggle,
    Toolbar,
    Keyboard,
    Key,
}

impl ElementType {
    /// Snake-case name, as used in snapshots and dumps.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Application => "application",
            ElementType::Window => "window",
            ElementType::Other => "other",
            ElementType::Button => "button",
            ElementType::Cell => "cell",
            ElementType::CollectionView => "collection_view",
            ElementType::Dialog => "dialog",
            ElementType::Image => "image",
            ElementType::Link => "link",
            ElementType::MenuBar => "menu_bar",
            ElementType::MenuBarItem => "menu_bar_item",
            ElementType::MenuItem => "menu_item",
            ElementType::NavigationBar => "navigation_bar",
            ElementType::Picker => "picker",
            ElementType::SegmentedControl => "segmented_control",
            ElementType::SearchField => "search_field",
            ElementType::StaticText => "static_text",
            ElementType::Switch => "switch",
            ElementType::ScrollBar => "scroll_bar",
            ElementType::ScrollView => "scroll_view",
            ElementType::Tab => "tab",
            ElementType::Table => "table",
            ElementType::TextField => "text_field",
            ElementType::Toggle => "toggle",
            ElementType::Toolbar => "toolbar",
            ElementType::Keyboard => "keyboard",
            ElementType::Key => "key",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_true() -> bool {
    true
}

/// A single element of the accessibility tree, with its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Element category.
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Accessibility identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Visible label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Displayed value (text fields, switches).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Whether the element accepts interaction.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether the element has keyboard focus.
    #[serde(default)]
    pub focused: bool,
    /// Whether a tap at the element's center would reach it.
    #[serde(default = "default_true")]
    pub hittable: bool,
    /// Screen rectangle.
    #[serde(default)]
    pub frame: Frame,
    /// Child elements in traversal order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create an enabled, hittable node of the given type.
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            identifier: None,
            label: None,
            value: None,
            enabled: true,
            focused: false,
            hittable: true,
            frame: Frame::default(),
            children: Vec::new(),
        }
    }

    /// Set the accessibility identifier.
    pub fn identifier(mut self, id: impl Into<String>) -> Self {
        self.identifier = Some(id.into());
        self
    }

    /// Set the visible label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the displayed value.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the enabled flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the focused flag.
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set the hittable flag.
    pub fn hittable(mut self, hittable: bool) -> Self {
        self.hittable = hittable;
        self
    }

    /// Set the frame.
    pub fn frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    /// Append a child.
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Whether `id` equals this node's accessibility identifier or visible label.
    pub fn matches_id(&self, id: &str) -> bool {
        self.identifier.as_deref() == Some(id) || self.label.as_deref() == Some(id)
    }

    /// Node at an index path below this one. The empty path is `self`.
    pub fn at_path(&self, path: &[usize]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    /// Mutable node at an index path below this one.
    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Pre-order traversal of this subtree, yielding index paths relative to `self`.
    pub fn walk(&self) -> Vec<(Vec<usize>, &Node)> {
        let mut out = Vec::new();
        let mut stack: Vec<(Vec<usize>, &Node)> = vec![(Vec::new(), self)];
        while let Some((path, node)) = stack.pop() {
            for (index, child) in node.children.iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(index);
                stack.push((child_path, child));
            }
            out.push((path, node));
        }
        out
    }

    /// Deepest node whose frame contains the point.
    ///
    /// Later siblings are drawn on top of earlier ones, so they win ties.
    pub fn hit_test(&self, point: Point) -> Option<Vec<usize>> {
        fn descend(node: &Node, point: Point, path: &mut Vec<usize>) -> bool {
            for (index, child) in node.children.iter().enumerate().rev() {
                path.push(index);
                if descend(child, point, path) {
                    return true;
                }
                path.pop();
            }
            node.frame.contains(point)
        }

        let mut path = Vec::new();
        descend(self, point, &mut path).then_some(path)
    }

    /// Path of the first node that currently has keyboard focus.
    pub fn focused_path(&self) -> Option<Vec<usize>> {
        self.walk()
            .into_iter()
            .find(|(_, node)| node.focused)
            .map(|(path, _)| path)
    }

    /// Clear the focus flag on every node of the subtree.
    pub fn clear_focus(&mut self) {
        self.focused = false;
        for child in &mut self.children {
            child.clear_focus();
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// One-line description used in dumps and failure messages.
    pub fn summary(&self) -> String {
        let mut line = self.element_type.name().to_string();
        if let Some(id) = &self.identifier {
            let _ = write!(line, " id='{id}'");
        }
        if let Some(label) = &self.label {
            let _ = write!(line, " label='{label}'");
        }
        if let Some(value) = &self.value {
            let _ = write!(line, " value='{value}'");
        }
        let f = self.frame;
        let _ = write!(
            line,
            " {{{{{}, {}}}, {{{}, {}}}}}",
            f.x, f.y, f.width, f.height
        );
        if !self.enabled {
            line.push_str(" disabled");
        }
        if self.focused {
            line.push_str(" focused");
        }
        if !self.hittable {
            line.push_str(" not-hittable");
        }
        line
    }

    /// Indented dump of the whole subtree, one node per line.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (path, node) in self.walk() {
            let _ = writeln!(out, "{}{}", "  ".repeat(path.len()), node.summary());
        }
        out
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from JSON or YAML text.
    pub fn from_str_any(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).or_else(|_| {
            serde_yaml::from_str(contents)
                .map_err(|e| UiwrightError::Yaml(format!("snapshot parse error: {e}")))
        })
    }

    /// Load a snapshot file; format follows the extension.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "json" => Ok(serde_json::from_str(&contents)?),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| UiwrightError::Yaml(e.to_string())),
            _ => Self::from_str_any(&contents),
        }
    }
}
