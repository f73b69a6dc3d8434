/// Search over the display tree with match navigation
use crate::i18n::Locale;
use crate::tree::{NodeKind, TreeNode};

/// Ids of nodes whose label or URL contains `query`, in display order
///
/// Matching is case-insensitive on the trimmed query. The root never matches.
pub fn search_tree(root: &TreeNode, query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    let mut matches = Vec::new();
    if needle.is_empty() {
        return matches;
    }

    collect_matches(root, &needle, &mut matches);
    matches
}

fn collect_matches(node: &TreeNode, needle: &str, matches: &mut Vec<String>) {
    let hit = node.kind != NodeKind::Root
        && (node.label.to_lowercase().contains(needle)
            || node.url.as_deref().is_some_and(|url| url.to_lowercase().contains(needle)));

    if hit {
        matches.push(node.id.clone());
    }
    for child in &node.children {
        collect_matches(child, needle, matches);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub matches: Vec<String>,
    pub current: Option<usize>,
}

impl SearchState {
    /// Run `query` against `root`; focus moves to the first match
    pub fn run(&mut self, root: &TreeNode, query: &str) {
        self.query = query.to_string();
        self.current = None;
        self.refresh(root);
    }

    /// Re-run the active query after a rebuild, keeping the focused id when it survived
    pub fn refresh(&mut self, root: &TreeNode) {
        let focused = self.focused().map(str::to_string);
        self.matches = search_tree(root, &self.query);
        self.current = match focused.and_then(|id| self.matches.iter().position(|m| *m == id)) {
            Some(index) => Some(index),
            None if self.matches.is_empty() => None,
            None => Some(0),
        };
    }

    pub fn clear(&mut self) {
        *self = SearchState::default();
    }

    pub fn focused(&self) -> Option<&str> {
        self.current.and_then(|i| self.matches.get(i)).map(String::as_str)
    }

    pub fn is_match(&self, id: &str) -> bool {
        self.matches.iter().any(|m| m == id)
    }

    pub fn next(&mut self) -> Option<&str> {
        if self.matches.is_empty() {
            return None;
        }
        let len = self.matches.len();
        self.current = Some(self.current.map_or(0, |i| (i + 1) % len));
        self.focused()
    }

    pub fn prev(&mut self) -> Option<&str> {
        if self.matches.is_empty() {
            return None;
        }
        let len = self.matches.len();
        self.current = Some(self.current.map_or(len - 1, |i| (i + len - 1) % len));
        self.focused()
    }

    /// "2/5" style position, or the localized no-match text
    pub fn info(&self, locale: &Locale) -> String {
        match self.current {
            Some(index) if !self.matches.is_empty() => {
                let current = (index + 1).to_string();
                let total = self.matches.len().to_string();
                locale.t_with("matchCount", &[("current", &current), ("total", &total)])
            }
            _ => locale.t("noMatch"),
        }
    }
}
