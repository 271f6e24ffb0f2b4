//! Element queries.
//!
//! An [`ElementQuery`] is the lineage of steps leading from the application root
//! to one element. Queries are persistent: extending one returns a new query that
//! shares the parent's steps, so any number of sibling branches can be built from
//! the same parent without observing each other.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UiwrightError};

mod parse;
mod resolve;

pub use resolve::{ResolvedElement, count_matches, resolve, resolve_all};

/// Category selector for one query step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Placeholder for the query root. Never appears as a real step.
    Root,
    Button,
    Cell,
    CollectionView,
    Dialog,
    /// Raw accessibility identifier lookup over `other` elements. Requires an id.
    Identifier,
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
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 25] = [
        Role::Root,
        Role::Button,
        Role::Cell,
        Role::CollectionView,
        Role::Dialog,
        Role::Identifier,
        Role::Image,
        Role::Link,
        Role::MenuBar,
        Role::MenuBarItem,
        Role::MenuItem,
        Role::NavigationBar,
        Role::Picker,
        Role::SegmentedControl,
        Role::SearchField,
        Role::StaticText,
        Role::Switch,
        Role::ScrollBar,
        Role::ScrollView,
        Role::Tab,
        Role::Table,
        Role::TextField,
        Role::Toggle,
        Role::Toolbar,
        Role::Keyboard,
    ];

    /// Snake-case name used by the textual query form.
    pub fn name(self) -> &'static str {
        match self {
            Role::Root => "root",
            Role::Button => "button",
            Role::Cell => "cell",
            Role::CollectionView => "collection_view",
            Role::Dialog => "dialog",
            Role::Identifier => "identifier",
            Role::Image => "image",
            Role::Link => "link",
            Role::MenuBar => "menu_bar",
            Role::MenuBarItem => "menu_bar_item",
            Role::MenuItem => "menu_item",
            Role::NavigationBar => "navigation_bar",
            Role::Picker => "picker",
            Role::SegmentedControl => "segmented_control",
            Role::SearchField => "search_field",
            Role::StaticText => "static_text",
            Role::Switch => "switch",
            Role::ScrollBar => "scroll_bar",
            Role::ScrollView => "scroll_view",
            Role::Tab => "tab",
            Role::Table => "table",
            Role::TextField => "text_field",
            Role::Toggle => "toggle",
            Role::Toolbar => "toolbar",
            Role::Keyboard => "keyboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = UiwrightError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.name() == name)
            .ok_or_else(|| UiwrightError::InvalidQuery(format!("unknown role: {s}")))
    }
}

/// One step of a query: a role, optionally narrowed to a single identifier.
///
/// Without an identifier the step selects every element of the role. With one,
/// it selects elements whose accessibility identifier OR visible label equals it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryStep {
    /// Element category.
    pub role: Role,
    /// Identifier or label to match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl QueryStep {
    /// Create a new step.
    pub fn new(role: Role, identifier: Option<String>) -> Self {
        Self { role, identifier }
    }
}

impl fmt::Display for QueryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identifier {
            Some(id) => {
                let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "{}(\"{}\")", self.role, escaped)
            }
            None => write!(f, "{}", self.role),
        }
    }
}

#[derive(Debug)]
struct Link {
    step: QueryStep,
    parent: Option<Arc<Link>>,
    depth: usize,
}

/// Immutable root-to-leaf path of [`QueryStep`]s.
#[derive(Debug, Clone, Default)]
pub struct ElementQuery {
    leaf: Option<Arc<Link>>,
}

macro_rules! role_builders {
    ($($(#[$doc:meta])* $role:ident => $all:ident, $one:ident;)*) => {
        $(
            $(#[$doc])*
            #[doc = ""]
            #[doc = "Without an id this targets every element of the role."]
            pub fn $all(&self) -> Self {
                self.extend(QueryStep::new(Role::$role, None))
            }

            $(#[$doc])*
            #[doc = ""]
            #[doc = "Matches the accessibility identifier or the visible label."]
            pub fn $one(&self, id: impl Into<String>) -> Self {
                self.extend(QueryStep::new(Role::$role, Some(id.into())))
            }
        )*
    };
}

impl ElementQuery {
    /// The empty query, anchored at the application root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend this query with a validated step.
    ///
    /// `Role::Root` can never be appended and `Role::Identifier` needs an id.
    pub fn step(&self, role: Role, identifier: Option<&str>) -> Result<Self> {
        match (role, identifier) {
            (Role::Root, _) => Err(UiwrightError::Usage(
                "the root role cannot be used as a query step".to_string(),
            )),
            (Role::Identifier, None) => Err(UiwrightError::Usage(
                "an identifier step requires an id".to_string(),
            )),
            (role, id) => Ok(self.extend(QueryStep::new(role, id.map(str::to_string)))),
        }
    }

    fn extend(&self, step: QueryStep) -> Self {
        let depth = self.len() + 1;
        Self {
            leaf: Some(Arc::new(Link {
                step,
                parent: self.leaf.clone(),
                depth,
            })),
        }
    }

    /// Target the `other` element carrying this exact accessibility identifier.
    ///
    /// Labels are not considered. Used to find a screen's root container.
    pub fn identifier(&self, id: impl Into<String>) -> Self {
        self.extend(QueryStep::new(Role::Identifier, Some(id.into())))
    }

    role_builders! {
        /// Target buttons.
        Button => buttons, button;
        /// Target cells.
        Cell => cells, cell;
        /// Target collection views.
        CollectionView => collection_views, collection_view;
        /// Target dialogs.
        Dialog => dialogs, dialog;
        /// Target images.
        Image => images, image;
        /// Target links.
        Link => links, link;
        /// Target menu bars.
        MenuBar => menu_bars, menu_bar;
        /// Target menu bar items.
        MenuBarItem => menu_bar_items, menu_bar_item;
        /// Target menu items.
        MenuItem => menu_items, menu_item;
        /// Target navigation bars.
        NavigationBar => navigation_bars, navigation_bar;
        /// Target pickers.
        Picker => pickers, picker;
        /// Target segmented controls.
        SegmentedControl => segmented_controls, segmented_control;
        /// Target search fields.
        SearchField => search_fields, search_field;
        /// Target static texts (labels).
        StaticText => static_texts, static_text;
        /// Target switches.
        Switch => switches, switch;
        /// Target scroll bars.
        ScrollBar => scroll_bars, scroll_bar;
        /// Target scroll views.
        ScrollView => scroll_views, scroll_view;
        /// Target tabs.
        Tab => tabs, tab;
        /// Target tables.
        Table => tables, table;
        /// Target text fields.
        TextField => text_fields, text_field;
        /// Target toggles.
        Toggle => toggles, toggle;
        /// Target toolbars.
        Toolbar => toolbars, toolbar;
        /// Target keyboards.
        Keyboard => keyboards, keyboard;
    }

    /// Steps from root to leaf.
    pub fn steps(&self) -> Vec<QueryStep> {
        let mut steps = Vec::with_capacity(self.len());
        let mut cursor = self.leaf.as_deref();
        while let Some(link) = cursor {
            steps.push(link.step.clone());
            cursor = link.parent.as_deref();
        }
        steps.reverse();
        steps
    }

    /// The last step, if any.
    pub fn leaf(&self) -> Option<&QueryStep> {
        self.leaf.as_deref().map(|link| &link.step)
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.leaf.as_deref().map_or(0, |link| link.depth)
    }

    /// Whether this is the bare root query.
    pub fn is_empty(&self) -> bool {
        self.leaf.is_none()
    }
}

impl PartialEq for ElementQuery {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.steps() == other.steps()
    }
}

impl Eq for ElementQuery {}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("root");
        }
        for (index, step) in self.steps().iter().enumerate() {
            if index > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for ElementQuery {
    type Err = UiwrightError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse::parse_query(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_empty() {
        let root = ElementQuery::root();
        assert!(root.is_empty());
        assert_eq!(root.len(), 0);
        assert_eq!(root.to_string(), "root");
    }

    #[test]
    fn test_extend_appends_one_step() {
        let query = ElementQuery::root().identifier("Stack").static_text("Name");
        assert_eq!(
            query.steps(),
            vec![
                QueryStep::new(Role::Identifier, Some("Stack".to_string())),
                QueryStep::new(Role::StaticText, Some("Name".to_string())),
            ]
        );
    }

    #[test]
    fn test_sibling_branches_do_not_observe_each_other() {
        let parent = ElementQuery::root().table("Table");
        let first = parent.cells();
        let second = parent.button("Edit");
        let third = parent.cell("Row").static_texts();

        assert_eq!(parent.len(), 1);
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(third.len(), 3);
        assert_eq!(parent.steps(), vec![QueryStep::new(Role::Table, Some("Table".into()))]);
        assert_eq!(second.steps()[0], parent.steps()[0]);
        assert_eq!(second.leaf(), Some(&QueryStep::new(Role::Button, Some("Edit".into()))));
    }

    #[test]
    fn test_step_rejects_identifier_without_id() {
        let root = ElementQuery::root();
        assert!(matches!(
            root.step(Role::Identifier, None),
            Err(UiwrightError::Usage(_))
        ));
        assert!(matches!(
            root.step(Role::Root, Some("x")),
            Err(UiwrightError::Usage(_))
        ));
        assert_eq!(root.step(Role::Button, None).unwrap(), root.buttons());
    }

    #[test]
    fn test_display_escapes_quotes() {
        let query = ElementQuery::root().keyboards().button("Say \"hi\"");
        assert_eq!(query.to_string(), r#"keyboard > button("Say \"hi\"")"#);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("static_text".parse::<Role>().unwrap(), Role::StaticText);
        assert_eq!("Menu_Bar_Item".parse::<Role>().unwrap(), Role::MenuBarItem);
        assert!("widget".parse::<Role>().is_err());
    }
}
