/// Tree rendering for the history viewer

use crate::history::favicon_url;
use crate::search::SearchState;
use crate::tree::{NodeKind, TreeNode};
use patternfly_yew::prelude::*;
use yew::prelude::*;

/// Per-render context shared by every row of the tree
pub struct TreeView<'a> {
    pub extension_id: &'a str,
    pub search: &'a SearchState,
    /// Group id -> collapse toggle
    pub on_toggle: Callback<String>,
    /// Leaf URL -> open in a new tab
    pub on_activate: Callback<String>,
    /// Node id -> delete request
    pub on_delete: Callback<String>,
}

/// DOM id of a node's row, used to scroll search matches into view
pub fn node_dom_id(id: &str) -> String {
    format!("node-{}", id)
}

pub fn render_tree(root: &TreeNode, view: &TreeView) -> Html {
    html! {
        <ul class="history-tree">
            {render_node(root, view)}
        </ul>
    }
}

fn kind_class(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Root => "node-root",
        NodeKind::DomainRoot => "node-domain",
        NodeKind::Subdomain => "node-subdomain",
        NodeKind::DateYear => "node-year",
        NodeKind::DateMonth => "node-month",
        NodeKind::DateDay => "node-day",
        NodeKind::DateDomain => "node-day-domain",
        NodeKind::Leaf => "node-leaf",
    }
}

fn render_node(node: &TreeNode, view: &TreeView) -> Html {
    let is_match = view.search.is_match(&node.id);
    let is_focused = view.search.focused() == Some(node.id.as_str());
    let icon = favicon_url(view.extension_id, node);

    let on_label_click = if node.is_leaf {
        let url = node.url.clone().unwrap_or_default();
        view.on_activate.reform(move |_: MouseEvent| url.clone())
    } else {
        let id = node.id.clone();
        view.on_toggle.reform(move |_: MouseEvent| id.clone())
    };

    let on_toggle_click = {
        let id = node.id.clone();
        view.on_toggle.reform(move |_: MouseEvent| id.clone())
    };

    let on_delete_click = {
        let id = node.id.clone();
        view.on_delete.reform(move |e: MouseEvent| {
            e.stop_propagation();
            id.clone()
        })
    };

    let row_class = classes!(
        "tree-row",
        kind_class(node.kind),
        is_match.then_some("search-highlight"),
        is_focused.then_some("search-focus"),
    );

    html! {
        <li key={node.id.clone()} class="tree-node">
            <div id={node_dom_id(&node.id)} class={row_class}>
                if let Some(src) = icon {
                    <img class="favicon" src={src} alt="" width="16" height="16" />
                }
                <span class="tree-label" title={node.label.clone()} onclick={on_label_click}>
                    {&node.label}
                </span>
                if node.has_children() {
                    <Button onclick={on_toggle_click} variant={ButtonVariant::Plain}>
                        {if node.collapsed { "+" } else { "-" }}
                    </Button>
                }
                if node.kind != NodeKind::Root {
                    <Button onclick={on_delete_click} variant={ButtonVariant::Plain}>
                        {"×"}
                    </Button>
                }
            </div>
            if node.has_children() && !node.collapsed {
                <ul class="tree-children">
                    {for node.children.iter().map(|child| render_node(child, view))}
                </ul>
            }
        </li>
    }
}
