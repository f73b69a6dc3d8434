/// Bridge to the extension host: history search and delete, tabs, favicons
use crate::error::HistoryError;
use crate::history_data::{HistoryQuery, HistoryRecord, RawHistoryItem, ingest};
use crate::tree::{NodeKind, TreeNode};
use url::form_urlencoded;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/history_view.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn searchHistory(query: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn deleteHistoryUrl(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn openTab(url: &str) -> Result<(), JsValue>;

    fn extensionId() -> String;
}

/// Source of truth for history records
#[allow(async_fn_in_trait)]
pub trait HistorySource {
    async fn search(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, HistoryError>;

    async fn delete_url(&self, url: &str) -> Result<(), HistoryError>;
}

/// `chrome.history` through the JS bridge
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeHistory;

impl HistorySource for ChromeHistory {
    async fn search(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, HistoryError> {
        let query_js = serde_wasm_bindgen::to_value(query)
            .map_err(|e| HistoryError::Decode(format!("{:?}", e)))?;

        let items_js = searchHistory(query_js)
            .await
            .map_err(|e| HistoryError::Fetch(format!("{:?}", e)))?;

        let items: Vec<RawHistoryItem> = serde_wasm_bindgen::from_value(items_js)
            .map_err(|e| HistoryError::Decode(format!("Failed to parse history items: {:?}", e)))?;

        Ok(ingest(items))
    }

    async fn delete_url(&self, url: &str) -> Result<(), HistoryError> {
        deleteHistoryUrl(url).await.map_err(|e| HistoryError::Delete {
            url: url.to_string(),
            reason: format!("{:?}", e),
        })
    }
}

/// Load every record up to `now` (milliseconds since the epoch)
pub async fn fetch_all<S: HistorySource>(source: &S, now: f64) -> Result<Vec<HistoryRecord>, HistoryError> {
    let records = source.search(&HistoryQuery::everything_until(now)).await?;
    log::info!("Loaded {} history records", records.len());
    Ok(records)
}

pub async fn open_in_new_tab(url: &str) -> Result<(), HistoryError> {
    openTab(url)
        .await
        .map_err(|e| HistoryError::Fetch(format!("Failed to open {}: {:?}", url, e)))
}

pub fn extension_id() -> String {
    extensionId()
}

/// Icon for a node, served by the extension's `_favicon` endpoint
///
/// Leaves use their page URL, host groups their hostname. Date buckets and
/// the "other" groups have no icon.
pub fn favicon_url(extension_id: &str, node: &TreeNode) -> Option<String> {
    let base = format!("chrome-extension://{}", extension_id);

    let page_url = match node.kind {
        NodeKind::Root => return Some(format!("{}/icons/icon48.png", base)),
        NodeKind::Leaf => node.url.clone()?,
        NodeKind::DomainRoot | NodeKind::Subdomain | NodeKind::DateDomain => {
            let host = node.name.as_str();
            if !host.contains('.') && !host.contains("://") {
                return None;
            }
            if host.contains("://") {
                host.to_string()
            } else {
                format!("https://{}", host)
            }
        }
        NodeKind::DateYear | NodeKind::DateMonth | NodeKind::DateDay => return None,
    };

    let encoded: String = form_urlencoded::byte_serialize(page_url.as_bytes()).collect();
    Some(format!("{}/_favicon/?pageUrl={}&size=16", base, encoded))
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// In-memory history; URLs in `failing` reject deletion
    #[derive(Default)]
    pub struct MockHistory {
        pub records: RefCell<Vec<HistoryRecord>>,
        pub failing: HashSet<String>,
        pub delete_calls: RefCell<Vec<String>>,
        pub fail_search: bool,
    }

    impl MockHistory {
        pub fn with_records(records: Vec<HistoryRecord>) -> MockHistory {
            MockHistory {
                records: RefCell::new(records),
                ..Default::default()
            }
        }
    }

    impl HistorySource for MockHistory {
        async fn search(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, HistoryError> {
            if self.fail_search {
                return Err(HistoryError::Fetch("unavailable".to_string()));
            }
            Ok(self
                .records
                .borrow()
                .iter()
                .filter(|r| r.last_visit_time >= query.start_time && r.last_visit_time <= query.end_time)
                .take(query.max_results as usize)
                .cloned()
                .collect())
        }

        async fn delete_url(&self, url: &str) -> Result<(), HistoryError> {
            self.delete_calls.borrow_mut().push(url.to_string());
            if self.failing.contains(url) {
                return Err(HistoryError::Delete {
                    url: url.to_string(),
                    reason: "rejected".to_string(),
                });
            }
            self.records.borrow_mut().retain(|r| r.url != url);
            Ok(())
        }
    }
}
