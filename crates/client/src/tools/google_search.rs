use serde::{Deserialize, Serialize};

pub const GOOGLE_SEARCH: &str = "google_search";

/// Arguments for `google_search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleSearchArgs {
    pub query: String,
    /// Result pages to process; the server defaults to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_pages: Option<u32>,
    /// Maximum parallel browser tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<u32>,
    /// Page load timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headless_mode: Option<bool>,
}

impl GoogleSearchArgs {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleSearchResult {
    pub metadata: SearchMetadata,
    pub search_results: Vec<SearchResultItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub source_type: String,
    pub query_used: String,
    pub description: String,
    pub timestamp: String,
    pub total_urls_processed: u64,
    pub valid_results_count: u64,
}

/// One scraped search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub url: String,
    pub title: String,
    pub content_preview: Option<String>,
    pub full_content_length: u64,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    pub source_category: SourceCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    AiSummarySource,
    OrganicSearchResult,
}
