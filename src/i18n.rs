/// Localized UI strings
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    #[default]
    En,
    Ja,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Zh, Language::En, Language::Ja];

    /// Pick a language from a browser tag such as "zh-CN"; unknown tags fall back to English
    pub fn detect(tag: &str) -> Language {
        let primary = tag.trim().to_lowercase();
        let primary = primary.split(['-', '_']).next().unwrap_or_default();
        Language::parse(primary).unwrap_or_default()
    }

    pub fn parse(code: &str) -> Option<Language> {
        match code {
            "zh" => Some(Language::Zh),
            "en" => Some(Language::En),
            "ja" => Some(Language::Ja),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
            Language::Ja => "ja",
        }
    }

    /// Name of the language in itself, for the language picker
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Zh => "中文",
            Language::En => "English",
            Language::Ja => "日本語",
        }
    }
}

fn lookup(language: Language, key: &str) -> Option<&'static str> {
    match language {
        Language::Zh => zh(key),
        Language::En => en(key),
        Language::Ja => ja(key),
    }
}

fn zh(key: &str) -> Option<&'static str> {
    Some(match key {
        "title" => "浏览历史",
        "groupByDomain" => "按域名分组",
        "groupByDate" => "按日期分组",
        "sortByName" => "按名称排序",
        "sortByCount" => "按数量排序",
        "sortAsc" => "升序",
        "sortDesc" => "降序",
        "toggleTheme" => "切换主题",
        "language" => "语言",
        "searchPlaceholder" => "搜索标题或网址...",
        "searchButton" => "搜索",
        "prevMatch" => "上一个",
        "nextMatch" => "下一个",
        "noMatch" => "无匹配",
        "matchCount" => "{current}/{total}",
        "confirmDelete" => "确定要删除这条历史记录吗？",
        "deleteError" => "删除历史记录失败",
        "loadError" => "加载出错：{error}",
        "loading" => "正在加载历史记录...",
        "other" => "其他",
        "empty" => "没有历史记录",
        _ => return None,
    })
}

fn en(key: &str) -> Option<&'static str> {
    Some(match key {
        "title" => "Browser History",
        "groupByDomain" => "Group by Domain",
        "groupByDate" => "Group by Date",
        "sortByName" => "Sort by Name",
        "sortByCount" => "Sort by Count",
        "sortAsc" => "Ascending",
        "sortDesc" => "Descending",
        "toggleTheme" => "Toggle Theme",
        "language" => "Language",
        "searchPlaceholder" => "Search titles or URLs...",
        "searchButton" => "Search",
        "prevMatch" => "Previous",
        "nextMatch" => "Next",
        "noMatch" => "No Match",
        "matchCount" => "{current}/{total}",
        "confirmDelete" => "Are you sure you want to delete this history record?",
        "deleteError" => "Failed to delete history record",
        "loadError" => "Loading error: {error}",
        "loading" => "Loading history...",
        "other" => "Others",
        "empty" => "No history records",
        _ => return None,
    })
}

fn ja(key: &str) -> Option<&'static str> {
    Some(match key {
        "title" => "ブラウザ履歴",
        "groupByDomain" => "ドメインでグループ化",
        "groupByDate" => "日付でグループ化",
        "sortByName" => "名前順",
        "sortByCount" => "件数順",
        "toggleTheme" => "テーマ切替",
        "language" => "言語",
        "searchPlaceholder" => "タイトルまたはURLを検索...",
        "searchButton" => "検索",
        "prevMatch" => "前へ",
        "nextMatch" => "次へ",
        "noMatch" => "一致なし",
        "matchCount" => "{current}/{total}",
        "confirmDelete" => "この履歴を削除してもよろしいですか？",
        "deleteError" => "履歴の削除に失敗しました",
        "loadError" => "読み込みエラー：{error}",
        "loading" => "履歴を読み込み中...",
        "other" => "その他",
        "empty" => "履歴がありません",
        _ => return None,
    })
}

/// String lookup for one language, falling back to English and then to the key itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Locale {
    pub language: Language,
}

impl Locale {
    pub fn new(language: Language) -> Locale {
        Locale { language }
    }

    pub fn t(&self, key: &str) -> String {
        lookup(self.language, key)
            .or_else(|| lookup(Language::En, key))
            .unwrap_or(key)
            .to_string()
    }

    /// Look up `key` and substitute `{name}` placeholders
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        params.iter().fold(self.t(key), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
    }
}
