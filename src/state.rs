/// Viewer application state and its transitions
use crate::grouping::{GroupMode, SortKey};
use crate::history_data::HistoryRecord;
use crate::i18n::{Language, Locale};
use crate::operations::{expand_path, expanded_ids, remove_node, restore_expanded, toggle_node};
use crate::search::SearchState;
use crate::storage::Preferences;
use crate::tree::{TreeNode, build_for_mode};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerAction {
    PreferencesLoaded(Preferences),
    /// Fresh records from the history source
    RecordsLoaded(Vec<HistoryRecord>),
    SetGroupMode(GroupMode),
    SetSortKey(SortKey),
    ToggleSortDirection,
    SetLanguage(Language),
    ToggleTheme,
    Toggle(String),
    /// The node's URLs were deleted from history
    NodeDeleted(String),
    Search(String),
    NextMatch,
    PrevMatch,
}

/// Everything the viewer page shows, independent of the DOM
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub records: Vec<HistoryRecord>,
    pub prefs: Preferences,
    pub detected_language: Language,
    /// `None` until the first load completes
    pub tree: Option<TreeNode>,
    pub search: SearchState,
}

impl ViewerState {
    pub fn new(detected_language: Language) -> ViewerState {
        ViewerState {
            records: Vec::new(),
            prefs: Preferences::new(),
            detected_language,
            tree: None,
            search: SearchState::default(),
        }
    }

    pub fn locale(&self) -> Locale {
        Locale::new(self.prefs.language_or(self.detected_language))
    }

    /// Apply one action completely; deletions and rebuilds never interleave
    pub fn apply(&mut self, action: ViewerAction) {
        match action {
            ViewerAction::PreferencesLoaded(prefs) => {
                let mode_changed = prefs.group_by != self.prefs.group_by;
                self.prefs = prefs;
                self.rebuild(!mode_changed);
            }
            ViewerAction::RecordsLoaded(records) => {
                self.records = records;
                self.rebuild(true);
            }
            ViewerAction::SetGroupMode(mode) => {
                if mode != self.prefs.group_by {
                    self.prefs.group_by = mode;
                    self.rebuild(false);
                }
            }
            ViewerAction::SetSortKey(key) => {
                self.prefs.sort_key = key;
                self.rebuild(true);
            }
            ViewerAction::ToggleSortDirection => {
                self.prefs.sort_direction = self.prefs.sort_direction.toggled();
                self.rebuild(true);
            }
            ViewerAction::SetLanguage(language) => {
                self.prefs.language = Some(language);
                self.rebuild(true);
            }
            ViewerAction::ToggleTheme => {
                self.prefs.theme = self.prefs.theme.toggled();
            }
            ViewerAction::Toggle(id) => {
                if let Some(tree) = self.tree.as_mut() {
                    toggle_node(tree, &id);
                }
            }
            ViewerAction::NodeDeleted(id) => {
                if let Some(tree) = self.tree.as_mut() {
                    if remove_node(tree, &id).is_some() {
                        self.search.refresh(tree);
                    }
                }
            }
            ViewerAction::Search(query) if query.trim().is_empty() => {
                self.search.clear();
            }
            ViewerAction::Search(query) => {
                if let Some(tree) = self.tree.as_ref() {
                    self.search.run(tree, &query);
                    self.reveal_focused();
                }
            }
            ViewerAction::NextMatch => {
                self.search.next();
                self.reveal_focused();
            }
            ViewerAction::PrevMatch => {
                self.search.prev();
                self.reveal_focused();
            }
        }
    }

    /// Regroup and rebuild the tree from the current records
    fn rebuild(&mut self, keep_expanded: bool) {
        let Some(previous) = self.tree.as_ref() else {
            if self.records.is_empty() {
                return;
            }
            self.tree = Some(self.build());
            return;
        };

        let expanded = keep_expanded.then(|| expanded_ids(previous));
        let mut tree = self.build();
        if let Some(ids) = expanded {
            restore_expanded(&mut tree, &ids);
        }

        self.search.refresh(&tree);
        self.tree = Some(tree);
        self.reveal_focused();
    }

    /// The tree when it has anything to show; an empty history or one
    /// emptied by deletions both yield `None`
    pub fn visible_tree(&self) -> Option<&TreeNode> {
        self.tree.as_ref().filter(|tree| tree.has_children())
    }

    fn build(&self) -> TreeNode {
        build_for_mode(&self.records, self.prefs.group_by, &self.prefs.sort(), &self.locale())
    }

    fn reveal_focused(&mut self) {
        let focused = self.search.focused().map(str::to_string);
        if let (Some(tree), Some(id)) = (self.tree.as_mut(), focused) {
            expand_path(tree, &id);
        }
    }
}
