/// History Mind Map - browser history as a collapsible tree
/// Built with Rust + WASM + Yew

mod domain;
mod error;
mod grouping;
mod history;
mod history_data;
mod i18n;
mod operations;
mod search;
mod state;
mod storage;
mod tree;
pub mod ui;

use error::HistoryError;
use grouping::{GroupMode, SortDirection, SortKey, SortOptions};
use history_data::{RawHistoryItem, ingest};
use i18n::{Language, Locale};
use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export core domain functions for JavaScript access
#[wasm_bindgen]
pub fn registrable_domain(hostname: &str) -> String {
    domain::registrable_domain(hostname)
}

/// Build the display tree for raw `chrome.history` items
///
/// Unknown option strings fall back to their defaults.
#[wasm_bindgen]
pub fn build_history_tree(
    records: JsValue,
    mode: &str,
    sort_key: &str,
    sort_direction: &str,
    language: &str,
) -> Result<JsValue, JsValue> {
    let items: Vec<RawHistoryItem> = serde_wasm_bindgen::from_value(records)
        .map_err(|e| JsValue::from_str(&HistoryError::Decode(format!("{:?}", e)).to_string()))?;

    let sort = SortOptions::new(
        SortKey::parse(sort_key).unwrap_or_default(),
        SortDirection::parse(sort_direction).unwrap_or_default(),
    );
    let locale = Locale::new(Language::parse(language).unwrap_or_default());
    let tree = tree::build_for_mode(&ingest(items), GroupMode::parse(mode).unwrap_or_default(), &sort, &locale);

    serde_wasm_bindgen::to_value(&tree).map_err(|e| JsValue::from_str(&format!("{:?}", e)))
}

// Start the Yew app for the history viewer page
#[wasm_bindgen]
pub fn start_history_viewer() -> Result<(), JsValue> {
    let container = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("container"));

    let Some(container) = container else {
        let err = HistoryError::RendererUnavailable("#container element not found".to_string());
        log::error!("{}", err);
        return Err(JsValue::from_str(&err.to_string()));
    };

    yew::Renderer::<ui::viewer::HistoryViewer>::with_root(container).render();
    Ok(())
}
