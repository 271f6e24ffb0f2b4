//! Query resolution against a tree snapshot.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::{ElementQuery, QueryStep, Role};
use crate::tree::{ElementType, Node};

/// A node located by a query in one particular snapshot.
///
/// The handle is a detached copy: it describes the element as it was when the
/// snapshot was taken and is never refreshed. Resolve again for fresh state.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedElement {
    /// Index path from the snapshot root.
    pub path: Vec<usize>,
    /// The node as captured in the snapshot.
    pub node: Node,
}

impl Role {
    /// Whether a node of `element_type` belongs to this role.
    ///
    /// `Root` selects nothing; it is skipped during resolution.
    pub fn selects(self, element_type: ElementType) -> bool {
        let wanted = match self {
            Role::Root => return false,
            Role::Button => ElementType::Button,
            Role::Cell => ElementType::Cell,
            Role::CollectionView => ElementType::CollectionView,
            Role::Dialog => ElementType::Dialog,
            Role::Identifier => ElementType::Other,
            Role::Image => ElementType::Image,
            Role::Link => ElementType::Link,
            Role::MenuBar => ElementType::MenuBar,
            Role::MenuBarItem => ElementType::MenuBarItem,
            Role::MenuItem => ElementType::MenuItem,
            Role::NavigationBar => ElementType::NavigationBar,
            Role::Picker => ElementType::Picker,
            Role::SegmentedControl => ElementType::SegmentedControl,
            Role::SearchField => ElementType::SearchField,
            Role::StaticText => ElementType::StaticText,
            Role::Switch => ElementType::Switch,
            Role::ScrollBar => ElementType::ScrollBar,
            Role::ScrollView => ElementType::ScrollView,
            Role::Tab => ElementType::Tab,
            Role::Table => ElementType::Table,
            Role::TextField => ElementType::TextField,
            Role::Toggle => ElementType::Toggle,
            Role::Toolbar => ElementType::Toolbar,
            Role::Keyboard => ElementType::Keyboard,
        };
        wanted == element_type
    }
}

impl QueryStep {
    /// Whether this step selects the node.
    pub fn matches(&self, node: &Node) -> bool {
        if !self.role.selects(node.element_type) {
            return false;
        }
        match (&self.role, &self.identifier) {
            (_, None) => true,
            (Role::Identifier, Some(id)) => node.identifier.as_deref() == Some(id.as_str()),
            (_, Some(id)) => node.matches_id(id),
        }
    }
}

/// Every node matching the query, in traversal order.
pub fn resolve_all<'a>(query: &ElementQuery, root: &'a Node) -> Vec<(Vec<usize>, &'a Node)> {
    let mut frontier: Vec<(Vec<usize>, &'a Node)> = vec![(Vec::new(), root)];

    for step in query.steps() {
        if step.role == Role::Root {
            continue;
        }

        let mut seen = HashSet::new();
        let mut next = Vec::new();
        for (base, node) in frontier.iter().map(|(base, node)| (base, *node)) {
            for (relative, candidate) in node.walk().into_iter().skip(1) {
                if !step.matches(candidate) {
                    continue;
                }
                let mut path = base.clone();
                path.extend(relative);
                if seen.insert(path.clone()) {
                    next.push((path, candidate));
                }
            }
        }

        // Nested frontier nodes can yield matches out of document order.
        next.sort_by(|a, b| a.0.cmp(&b.0));
        frontier = next;
        if frontier.is_empty() {
            break;
        }
    }

    frontier
}

/// First node matching the query, or `None`.
pub fn resolve(query: &ElementQuery, root: &Node) -> Option<ResolvedElement> {
    let matches = resolve_all(query, root);
    flag_ambiguity(query, &matches);

    let resolved = matches.into_iter().next().map(|(path, node)| ResolvedElement {
        path,
        node: node.clone(),
    });
    debug!(%query, found = resolved.is_some(), "resolved query");
    resolved
}

/// Number of nodes matching the query.
pub fn count_matches(query: &ElementQuery, root: &Node) -> usize {
    resolve_all(query, root).len()
}

fn flag_ambiguity(query: &ElementQuery, matches: &[(Vec<usize>, &Node)]) {
    let Some(QueryStep {
        role,
        identifier: Some(id),
    }) = query.leaf()
    else {
        return;
    };
    if *role == Role::Identifier || matches.len() < 2 {
        return;
    }

    let by_identifier = matches
        .iter()
        .find(|(_, node)| node.identifier.as_deref() == Some(id.as_str()));
    let by_label = matches.iter().find(|(_, node)| {
        node.label.as_deref() == Some(id.as_str())
            && node.identifier.as_deref() != Some(id.as_str())
    });

    if let (Some((id_path, _)), Some((label_path, _))) = (by_identifier, by_label) {
        warn!(
            %query,
            identifier_match = ?id_path,
            label_match = ?label_path,
            "'{id}' matches one element by identifier and another by label; using the first in traversal order"
        );
    }
}
