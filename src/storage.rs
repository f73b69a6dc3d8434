/// Persisted UI preferences in chrome.storage.local

use crate::error::HistoryError;
use crate::grouping::{GroupMode, SortDirection, SortKey, SortOptions};
use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Storage key holding the serialized [`Preferences`]
pub const PREFERENCES_KEY: &str = "history_mind_map_prefs";

#[wasm_bindgen(module = "/history_view.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

/// Everything the page remembers between visits
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub group_by: GroupMode,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub theme: Theme,
    /// `None` follows the browser language
    pub language: Option<Language>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(&self) -> SortOptions {
        SortOptions::new(self.sort_key, self.sort_direction)
    }

    pub fn language_or(&self, detected: Language) -> Language {
        self.language.unwrap_or(detected)
    }
}

/// Read preferences; a missing entry yields defaults
pub async fn load_preferences() -> Result<Preferences, HistoryError> {
    let prefs_js = getStorage(PREFERENCES_KEY)
        .await
        .map_err(|e| HistoryError::Storage(format!("Failed to get storage: {:?}", e)))?;

    if prefs_js.is_null() || prefs_js.is_undefined() {
        Ok(Preferences::new())
    } else {
        serde_wasm_bindgen::from_value(prefs_js)
            .map_err(|e| HistoryError::Decode(format!("Failed to parse preferences: {:?}", e)))
    }
}

pub async fn save_preferences(prefs: &Preferences) -> Result<(), HistoryError> {
    let prefs_js = serde_wasm_bindgen::to_value(prefs)
        .map_err(|e| HistoryError::Decode(format!("Failed to serialize preferences: {:?}", e)))?;

    setStorage(PREFERENCES_KEY, prefs_js)
        .await
        .map_err(|e| HistoryError::Storage(format!("Failed to save storage: {:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_new() {
        let prefs = Preferences::new();

        assert_eq!(prefs.group_by, GroupMode::Domain);
        assert_eq!(prefs.sort(), SortOptions::default());
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.language, None);
    }

    #[test]
    fn test_partial_object_uses_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"groupBy": "date"}"#).unwrap();

        assert_eq!(prefs.group_by, GroupMode::Date);
        assert_eq!(prefs.sort_key, SortKey::Name);
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn test_serialization() {
        let prefs = Preferences {
            group_by: GroupMode::Date,
            sort_key: SortKey::Count,
            sort_direction: SortDirection::Desc,
            theme: Theme::Dark,
            language: Some(Language::Ja),
        };

        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json["groupBy"], "date");
        assert_eq!(json["sortKey"], "count");
        assert_eq!(json["sortDirection"], "desc");
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["language"], "ja");

        let deserialized: Preferences = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, prefs);
    }

    #[test]
    fn test_language_or_detected() {
        let mut prefs = Preferences::new();
        assert_eq!(prefs.language_or(Language::Zh), Language::Zh);

        prefs.language = Some(Language::En);
        assert_eq!(prefs.language_or(Language::Zh), Language::En);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert!(Theme::Light.toggled().is_dark());
    }
}
