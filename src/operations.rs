/// Tree operations: deletion with cascade removal, expand/collapse state

use crate::error::HistoryError;
use crate::history::HistorySource;
use crate::tree::TreeNode;
use futures::future::join_all;
use std::collections::HashSet;

/// Remove a node (leaf or whole subtree) and every ancestor left empty by it
///
/// Cascades up to, but never including, the root. Group labels are
/// re-aggregated afterwards. Returns the detached node, or `None` when the id
/// is unknown or names the root.
pub fn remove_node(root: &mut TreeNode, id: &str) -> Option<TreeNode> {
    if root.id == id {
        return None;
    }

    let removed = detach(root, id)?;
    root.refresh_counts();
    Some(removed)
}

fn detach(node: &mut TreeNode, id: &str) -> Option<TreeNode> {
    if let Some(pos) = node.children.iter().position(|child| child.id == id) {
        return Some(node.children.remove(pos));
    }

    for index in 0..node.children.len() {
        if let Some(removed) = detach(&mut node.children[index], id) {
            let child = &node.children[index];
            if !child.is_leaf && child.children.is_empty() {
                node.children.remove(index);
            }
            return Some(removed);
        }
    }

    None
}

/// Every leaf URL under `node`, first occurrence order, without duplicates
pub fn collect_leaf_urls(node: &TreeNode) -> Vec<String> {
    let mut seen = HashSet::new();
    node.leaves()
        .into_iter()
        .filter_map(|leaf| leaf.url.clone())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Delete every URL under `node` from history
///
/// All calls are issued and awaited together. Every URL is attempted even if
/// some fail; any failure yields `PartialDelete` listing the rejected URLs.
/// The tree itself is not touched here.
pub async fn delete_subtree<S: HistorySource>(source: &S, node: &TreeNode) -> Result<usize, HistoryError> {
    let urls = collect_leaf_urls(node);
    let results = join_all(urls.iter().map(|url| source.delete_url(url))).await;

    let failed: Vec<String> = urls
        .iter()
        .zip(results)
        .filter_map(|(url, result)| {
            result.err().map(|e| {
                log::warn!("{}", e);
                url.clone()
            })
        })
        .collect();

    if failed.is_empty() {
        log::info!("Deleted {} URLs under {}", urls.len(), node.id);
        Ok(urls.len())
    } else {
        Err(HistoryError::PartialDelete {
            attempted: urls.len(),
            failed,
        })
    }
}

/// Flip a group's collapsed flag; leaves and unknown ids are ignored
pub fn toggle_node(root: &mut TreeNode, id: &str) -> bool {
    match root.find_mut(id) {
        Some(node) if !node.is_leaf => {
            node.collapsed = !node.collapsed;
            true
        }
        _ => false,
    }
}

pub fn set_collapsed(root: &mut TreeNode, id: &str, collapsed: bool) -> bool {
    match root.find_mut(id) {
        Some(node) if !node.is_leaf => {
            node.collapsed = collapsed;
            true
        }
        _ => false,
    }
}

/// Ids of all expanded groups
pub fn expanded_ids(root: &TreeNode) -> HashSet<String> {
    let mut ids = HashSet::new();
    collect_expanded(root, &mut ids);
    ids
}

fn collect_expanded(node: &TreeNode, ids: &mut HashSet<String>) {
    if node.is_leaf {
        return;
    }
    if !node.collapsed {
        ids.insert(node.id.clone());
    }
    for child in &node.children {
        collect_expanded(child, ids);
    }
}

/// Expand every group whose id was expanded before a rebuild
pub fn restore_expanded(root: &mut TreeNode, ids: &HashSet<String>) {
    if !root.is_leaf && ids.contains(&root.id) {
        root.collapsed = false;
    }
    for child in &mut root.children {
        restore_expanded(child, ids);
    }
}

/// Expand all ancestors of `id` so it becomes visible
pub fn expand_path(root: &mut TreeNode, id: &str) -> bool {
    let Some(path) = root.path_to(id) else {
        return false;
    };

    for ancestor in &path[..path.len() - 1] {
        set_collapsed(root, ancestor, false);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::{GroupMode, SortOptions};
    use crate::history::mock::MockHistory;
    use crate::history_data::HistoryRecord;
    use crate::i18n::Locale;
    use crate::tree::{ROOT_ID, build_for_mode};
    use futures::executor::block_on;

    fn create_test_record(id: &str, url: &str, title: &str) -> HistoryRecord {
        HistoryRecord::new(id, url, title, 1_709_640_000_000.0, 1)
    }

    fn sample_records() -> Vec<HistoryRecord> {
        vec![
            create_test_record("1", "https://a.bilibili.com/x", "X"),
            create_test_record("2", "https://www.bilibili.com/y", "Y"),
            create_test_record("3", "https://www.bilibili.com/z", "Z"),
            create_test_record("4", "https://github.com/rust-lang", "Rust"),
            create_test_record("5", "https://github.com/rust-lang", "Rust (again)"),
        ]
    }

    fn domain_tree(records: &[HistoryRecord]) -> TreeNode {
        build_for_mode(records, GroupMode::Domain, &SortOptions::default(), &Locale::default())
    }

    #[test]
    fn test_remove_leaf_updates_counts() {
        let mut root = domain_tree(&sample_records());

        let removed = remove_node(&mut root, "2").unwrap();

        assert_eq!(removed.id, "2");
        assert_eq!(root.find("www.bilibili.com").unwrap().label, "www.bilibili.com (1)");
        assert_eq!(root.find("bilibili.com").unwrap().label, "bilibili.com (2)");
    }

    #[test]
    fn test_remove_only_leaf_cascades_one_level() {
        let mut root = domain_tree(&sample_records());

        remove_node(&mut root, "1").unwrap();

        assert!(root.find("a.bilibili.com").is_none());
        let bilibili = root.find("bilibili.com").unwrap();
        assert_eq!(bilibili.label, "bilibili.com (2)");
        assert_eq!(bilibili.children.len(), 1);
    }

    #[test]
    fn test_cascade_reaches_domain_root() {
        let records = vec![
            create_test_record("1", "https://a.bilibili.com/x", "X"),
            create_test_record("4", "https://github.com/rust-lang", "Rust"),
        ];
        let mut root = domain_tree(&records);

        remove_node(&mut root, "1").unwrap();

        assert!(root.find("a.bilibili.com").is_none());
        assert!(root.find("bilibili.com").is_none());
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.id, ROOT_ID);
    }

    #[test]
    fn test_cascade_through_date_levels() {
        let records = vec![
            HistoryRecord::new("1", "https://a.com", "A", 1_709_640_000_000.0, 1),
            HistoryRecord::new("2", "https://b.com", "B", 1_600_000_000_000.0, 1),
        ];
        let mut root = build_for_mode(&records, GroupMode::Date, &SortOptions::default(), &Locale::default());
        let years_before = root.children.len();

        remove_node(&mut root, "2").unwrap();

        // domain, day, month and year nodes all went away
        assert_eq!(root.children.len(), years_before - 1);
        assert_eq!(root.leaf_count(), 1);
        assert!(root.find("2").is_none());
    }

    #[test]
    fn test_remove_subtree_and_root_guard() {
        let mut root = domain_tree(&sample_records());

        let removed = remove_node(&mut root, "bilibili.com").unwrap();
        assert_eq!(removed.leaf_count(), 3);
        assert_eq!(root.children.len(), 1);

        assert!(remove_node(&mut root, ROOT_ID).is_none());
        assert!(remove_node(&mut root, "missing").is_none());
    }

    #[test]
    fn test_remove_last_group_leaves_bare_root() {
        let mut root = domain_tree(&[create_test_record("1", "https://a.com", "A")]);

        remove_node(&mut root, "1").unwrap();

        assert!(root.children.is_empty());
        assert_eq!(root.id, ROOT_ID);
    }

    #[test]
    fn test_collect_leaf_urls_deduplicates() {
        let root = domain_tree(&sample_records());

        let urls = collect_leaf_urls(root.find("github.com").unwrap());
        assert_eq!(urls, vec!["https://github.com/rust-lang".to_string()]);

        let all = collect_leaf_urls(&root);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_delete_subtree_success() {
        let source = MockHistory::with_records(sample_records());
        let root = domain_tree(&sample_records());

        let deleted = block_on(delete_subtree(&source, root.find("bilibili.com").unwrap())).unwrap();

        assert_eq!(deleted, 3);
        assert_eq!(source.records.borrow().len(), 2);
    }

    #[test]
    fn test_delete_subtree_partial_failure_attempts_everything() {
        let mut source = MockHistory::with_records(sample_records());
        source.failing.insert("https://www.bilibili.com/y".to_string());
        let root = domain_tree(&sample_records());

        let result = block_on(delete_subtree(&source, root.find("bilibili.com").unwrap()));

        assert_eq!(
            result,
            Err(HistoryError::PartialDelete {
                attempted: 3,
                failed: vec!["https://www.bilibili.com/y".to_string()],
            })
        );
        assert_eq!(source.delete_calls.borrow().len(), 3);
        // the other two really are gone
        assert_eq!(source.records.borrow().len(), 3);
    }

    #[test]
    fn test_toggle_and_expanded_restore() {
        let mut root = domain_tree(&sample_records());

        assert!(toggle_node(&mut root, "bilibili.com"));
        assert!(toggle_node(&mut root, "www.bilibili.com"));
        assert!(!toggle_node(&mut root, "2"));
        assert!(!toggle_node(&mut root, "missing"));

        let expanded = expanded_ids(&root);
        assert!(expanded.contains(ROOT_ID));
        assert!(expanded.contains("bilibili.com"));
        assert!(expanded.contains("www.bilibili.com"));
        assert_eq!(expanded.len(), 3);

        let mut rebuilt = domain_tree(&sample_records()[1..]);
        restore_expanded(&mut rebuilt, &expanded);

        assert!(!rebuilt.find("bilibili.com").unwrap().collapsed);
        assert!(!rebuilt.find("www.bilibili.com").unwrap().collapsed);
        assert!(rebuilt.find("github.com").unwrap().collapsed);
    }

    #[test]
    fn test_expand_path() {
        let mut root = domain_tree(&sample_records());

        assert!(expand_path(&mut root, "3"));

        assert!(!root.find("bilibili.com").unwrap().collapsed);
        assert!(!root.find("www.bilibili.com").unwrap().collapsed);
        assert!(root.find("a.bilibili.com").unwrap().collapsed);
        assert!(!expand_path(&mut root, "missing"));
    }
}
