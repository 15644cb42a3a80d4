use serde::{Deserialize, Serialize};

pub const GET_GOOGLE_AI_SUMMARY: &str = "get_google_ai_summary";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetGoogleAiSummaryArgs {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headless_mode: Option<bool>,
    /// Seconds to wait for the summary panel to render.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_seconds: Option<u32>,
}

impl GetGoogleAiSummaryArgs {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetGoogleAiSummaryResult {
    pub query: String,
    pub execution_datetime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary_results_count: Option<u64>,
    #[serde(default)]
    pub ai_summary_results: Vec<SummaryItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search_results_count: Option<u64>,
    #[serde(default)]
    pub google_search_results: Vec<SummaryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryItem {
    pub title: String,
    pub url: String,
    pub source_type: SummarySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    AiSummary,
    OrganicSearch,
}
