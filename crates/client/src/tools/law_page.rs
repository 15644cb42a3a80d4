use serde::{Deserialize, Serialize};

pub const SCRAPE_LAW_PAGE: &str = "scrape_law_page";

/// Arguments for `scrape_law_page`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeLawPageArgs {
    pub url: String,
    pub keyword: String,
    /// Selector to wait for before scraping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headless_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_type: Option<BrowserType>,
    /// Characters of context kept around each keyword hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
    /// Hits closer than this many characters are merged into one snippet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_threshold: Option<u32>,
}

impl ScrapeLawPageArgs {
    pub fn new(url: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            keyword: keyword.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    Chromium,
    Firefox,
    Webkit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeLawPageResult {
    pub source_url: String,
    pub search_keyword: String,
    pub total_keyword_occurrences_in_snippets: u64,
    pub total_context_entries: u64,
    pub results: Vec<LawContextEntry>,
}

/// One keyword hit with its position in the statute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawContextEntry {
    pub id: String,
    pub source_url: String,
    #[serde(default)]
    pub hierarchy: LawHierarchy,
    pub context_snippet: String,
    pub keyword_for_this_snippet: String,
    pub keyword_occurrence_in_snippet: u64,
    pub full_sentence_or_block: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawHierarchy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_number: Option<String>,
}
