/// Data structures for browsing history records
use serde::{Deserialize, Serialize};

/// Upper bound on records requested from the history API in one search
pub const DEFAULT_MAX_RESULTS: u32 = 100_000;

/// A visited page as reported by the history API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    /// Milliseconds since the Unix epoch
    pub last_visit_time: f64,
    pub visit_count: u32,
}

impl HistoryRecord {
    pub fn new(id: &str, url: &str, title: &str, last_visit_time: f64, visit_count: u32) -> HistoryRecord {
        HistoryRecord {
            id: id.to_string(),
            url: url.to_string(),
            title: normalize_title(Some(title.to_string())),
            last_visit_time,
            visit_count,
        }
    }

    /// Title when present, otherwise the URL
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}

/// History item exactly as the host hands it over; every field may be missing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawHistoryItem {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub last_visit_time: Option<f64>,
    pub visit_count: Option<u32>,
}

impl RawHistoryItem {
    /// Validate into a record; items without a URL are rejected
    pub fn into_record(self) -> Option<HistoryRecord> {
        let url = self.url.filter(|url| !url.trim().is_empty())?;
        let id = self.id.unwrap_or_else(|| url.clone());

        Some(HistoryRecord {
            id,
            url,
            title: normalize_title(self.title),
            last_visit_time: self.last_visit_time.unwrap_or(0.0),
            visit_count: self.visit_count.unwrap_or(0),
        })
    }
}

/// Validate a batch of raw items, dropping the unusable ones
pub fn ingest(items: Vec<RawHistoryItem>) -> Vec<HistoryRecord> {
    let total = items.len();
    let records: Vec<HistoryRecord> = items.into_iter().filter_map(RawHistoryItem::into_record).collect();

    if records.len() < total {
        log::warn!("Dropped {} history items without a URL", total - records.len());
    }

    records
}

fn normalize_title(title: Option<String>) -> Option<String> {
    title.filter(|t| !t.trim().is_empty())
}

/// Filter passed to the history API's search call
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub text: String,
    pub max_results: u32,
    pub start_time: f64,
    pub end_time: f64,
}

impl HistoryQuery {
    /// Everything from the beginning of history up to `end_time`
    pub fn everything_until(end_time: f64) -> HistoryQuery {
        HistoryQuery {
            text: String::new(),
            max_results: DEFAULT_MAX_RESULTS,
            start_time: 0.0,
            end_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_record_creation() {
        let record = HistoryRecord::new("7", "https://google.com", "Google", 1698508200000.0, 3);

        assert_eq!(record.id, "7");
        assert_eq!(record.url, "https://google.com");
        assert_eq!(record.title.as_deref(), Some("Google"));
        assert_eq!(record.visit_count, 3);
    }

    #[test]
    fn test_display_title_falls_back_to_url() {
        let untitled = HistoryRecord::new("1", "https://example.com/a", "  ", 0.0, 1);
        assert_eq!(untitled.title, None);
        assert_eq!(untitled.display_title(), "https://example.com/a");

        let titled = HistoryRecord::new("2", "https://example.com/b", "B", 0.0, 1);
        assert_eq!(titled.display_title(), "B");
    }

    #[test]
    fn test_deserialize_host_shape() {
        let json = r#"[
            {"id": "12", "url": "https://www.bilibili.com/y", "title": "Y", "lastVisitTime": 1700000000000.5, "visitCount": 4, "typedCount": 0},
            {"id": "13", "url": "https://a.bilibili.com/x", "lastVisitTime": 1700000000001.0},
            {"id": "14", "title": "no url"},
            {"id": "15", "url": ""}
        ]"#;

        let items: Vec<RawHistoryItem> = serde_json::from_str(json).unwrap();
        let records = ingest(items);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "12");
        assert_eq!(records[0].visit_count, 4);
        assert_eq!(records[0].last_visit_time, 1700000000000.5);
        assert_eq!(records[1].title, None);
        assert_eq!(records[1].visit_count, 0);
    }

    #[test]
    fn test_missing_id_uses_url() {
        let item = RawHistoryItem {
            url: Some("https://example.com".to_string()),
            ..Default::default()
        };

        assert_eq!(item.into_record().unwrap().id, "https://example.com");
    }

    #[test]
    fn test_query_serialization() {
        let query = HistoryQuery::everything_until(1000.0);
        let json = serde_json::to_value(&query).unwrap();

        assert_eq!(json["text"], "");
        assert_eq!(json["maxResults"], 100000);
        assert_eq!(json["startTime"], 0.0);
        assert_eq!(json["endTime"], 1000.0);
    }
}
