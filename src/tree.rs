/// Labeled tree built from grouped history, ready for hierarchical rendering
use crate::grouping::{
    DateGroups, DomainGroups, GroupMode, GroupedHistory, SortOptions, group_records,
    most_recent_first, sorted_day_hosts,
};
use crate::history_data::HistoryRecord;
use crate::i18n::Locale;
use serde::Serialize;

/// Id of the single root node
pub const ROOT_ID: &str = "root";

/// Id of the group holding records without a hostname; never a valid hostname
pub const OTHER_GROUP_ID: &str = "group:other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Root,
    DomainRoot,
    Subdomain,
    DateYear,
    DateMonth,
    DateDay,
    DateDomain,
    Leaf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    /// Display text; group labels carry their leaf count
    pub label: String,
    /// Label without the count suffix
    #[serde(skip)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    pub is_leaf: bool,
    pub collapsed: bool,
    pub kind: NodeKind,
}

impl TreeNode {
    fn root(title: &str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            id: ROOT_ID.to_string(),
            label: title.to_string(),
            name: title.to_string(),
            url: None,
            children,
            is_leaf: false,
            collapsed: false,
            kind: NodeKind::Root,
        }
    }

    fn group(id: String, name: &str, kind: NodeKind, children: Vec<TreeNode>) -> TreeNode {
        let mut node = TreeNode {
            id,
            label: String::new(),
            name: name.to_string(),
            url: None,
            children,
            is_leaf: false,
            collapsed: true,
            kind,
        };
        node.relabel();
        node
    }

    fn leaf(record: &HistoryRecord) -> TreeNode {
        let title = record.display_title();
        TreeNode {
            id: record.id.clone(),
            label: title.to_string(),
            name: title.to_string(),
            url: Some(record.url.clone()),
            children: Vec::new(),
            is_leaf: true,
            collapsed: false,
            kind: NodeKind::Leaf,
        }
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf {
            1
        } else {
            self.children.iter().map(TreeNode::leaf_count).sum()
        }
    }

    fn relabel(&mut self) {
        if !self.is_leaf && self.kind != NodeKind::Root {
            self.label = format!("{} ({})", self.name, self.leaf_count());
        }
    }

    /// Recompute every group label bottom-up; returns this subtree's leaf count
    pub fn refresh_counts(&mut self) -> usize {
        if self.is_leaf {
            return 1;
        }

        let count: usize = self.children.iter_mut().map(TreeNode::refresh_counts).sum();
        if self.kind != NodeKind::Root {
            self.label = format!("{} ({})", self.name, count);
        }
        count
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Ids from this node down to `id`, both ends included
    pub fn path_to(&self, id: &str) -> Option<Vec<String>> {
        if self.id == id {
            return Some(vec![self.id.clone()]);
        }

        self.children.iter().find_map(|child| {
            child.path_to(id).map(|mut path| {
                path.insert(0, self.id.clone());
                path
            })
        })
    }

    /// Leaf nodes in display order
    pub fn leaves(&self) -> Vec<&TreeNode> {
        if self.is_leaf {
            return vec![self];
        }
        self.children.iter().flat_map(TreeNode::leaves).collect()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Localized strings the builder needs
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLabels {
    pub title: String,
    pub other: String,
}

impl TreeLabels {
    pub fn from_locale(locale: &Locale) -> TreeLabels {
        TreeLabels {
            title: locale.t("title"),
            other: locale.t("other"),
        }
    }
}

/// Build the display tree for grouped history
///
/// The root is expanded, every other group starts collapsed. Sort options
/// only affect domain mode; date mode is always most recent first.
pub fn build_tree(grouped: &GroupedHistory, sort: &SortOptions, labels: &TreeLabels) -> TreeNode {
    let children = match grouped {
        GroupedHistory::Domain(groups) => build_domain_children(groups, sort, labels),
        GroupedHistory::Date(groups) => build_date_children(groups, labels),
    };

    TreeNode::root(&labels.title, children)
}

fn build_domain_children(groups: &DomainGroups, sort: &SortOptions, labels: &TreeLabels) -> Vec<TreeNode> {
    groups
        .sorted(sort)
        .into_iter()
        .map(|group| {
            let is_other = groups
                .other
                .as_ref()
                .is_some_and(|other| std::ptr::eq(other, group));
            let root_name = if is_other { labels.other.as_str() } else { group.root_domain.as_str() };

            let mut children = Vec::new();
            for (subdomain, records) in group.sorted_subdomains(sort) {
                let leaves: Vec<TreeNode> = records.into_iter().map(TreeNode::leaf).collect();

                if subdomain == group.root_domain && !is_other {
                    children.extend(leaves);
                } else {
                    let id = if is_other {
                        format!("{}/{}", OTHER_GROUP_ID, subdomain)
                    } else {
                        subdomain.to_string()
                    };
                    children.push(TreeNode::group(id, subdomain, NodeKind::Subdomain, leaves));
                }
            }

            let id = if is_other { OTHER_GROUP_ID } else { root_name };
            TreeNode::group(id.to_string(), root_name, NodeKind::DomainRoot, children)
        })
        .collect()
}

fn build_date_children(groups: &DateGroups, labels: &TreeLabels) -> Vec<TreeNode> {
    groups
        .years
        .iter()
        .rev()
        .map(|(year, months)| {
            let month_nodes = months
                .iter()
                .rev()
                .map(|(month, days)| {
                    let month_key = format!("{}-{:02}", year, month);
                    let day_nodes = days
                        .iter()
                        .rev()
                        .map(|(day, hosts)| {
                            let day_key = format!("{}-{:02}", month_key, day);
                            let host_nodes = sorted_day_hosts(hosts)
                                .into_iter()
                                .map(|(host, records)| {
                                    let (key, name) = match host {
                                        Some(host) => (host, host),
                                        None => (OTHER_GROUP_ID, labels.other.as_str()),
                                    };
                                    let leaves = most_recent_first(records).into_iter().map(TreeNode::leaf).collect();
                                    TreeNode::group(format!("date:{}/{}", day_key, key), name, NodeKind::DateDomain, leaves)
                                })
                                .collect();
                            TreeNode::group(format!("date:{}", day_key), &day_key, NodeKind::DateDay, host_nodes)
                        })
                        .collect();
                    TreeNode::group(format!("date:{}", month_key), &month_key, NodeKind::DateMonth, day_nodes)
                })
                .collect();
            TreeNode::group(format!("date:{}", year), &year.to_string(), NodeKind::DateYear, month_nodes)
        })
        .collect()
}

/// Group records for `mode` and build the tree in one step
pub fn build_for_mode(records: &[HistoryRecord], mode: GroupMode, sort: &SortOptions, locale: &Locale) -> TreeNode {
    let grouped = group_records(records, mode);
    let root = build_tree(&grouped, sort, &TreeLabels::from_locale(locale));

    log::info!(
        "Built {} tree: {} records, {} top-level groups",
        grouped.mode().as_str(),
        grouped.total_count(),
        root.children.len()
    );

    root
}
