use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CRAWL_WEBSITE: &str = "crawl_website";

/// Arguments for `crawl_website`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlWebsiteArgs {
    pub url: String,
    /// CSS selector for the links to follow.
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_stealth: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headless_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_robots_txt: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Delay between requests, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay: Option<f64>,
    /// Follow links off the starting domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_samedomain: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_content_only: Option<bool>,
}

impl CrawlWebsiteArgs {
    pub fn new(url: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selector: selector.into(),
            ..Self::default()
        }
    }
}

/// Crawl output. The crawler's report shape varies between versions, so
/// nearly everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlWebsiteResult {
    #[serde(rename = "startUrl", default, skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(rename = "phoneNumbers", default, skip_serializing_if = "Option::is_none")]
    pub phone_numbers: Option<Vec<String>>,
    #[serde(rename = "crawledData", default, skip_serializing_if = "Option::is_none")]
    pub crawled_data: Option<Vec<CrawledPage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<CrawlError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_crawled_urls_unique: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_unique_emails_found: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_unique_phones_found: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_summary: Option<CrawlSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_by_domain: Option<BTreeMap<String, Vec<Value>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawledPage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlError {
    pub url: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub start_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_samedomain_check: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_processed_entries_across_all_domains: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_base_urls_processed_or_disallowed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent_for_robots_check: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn args_keep_required_fields() {
        let args = CrawlWebsiteArgs {
            max_depth: Some(2),
            no_samedomain: Some(false),
            ..CrawlWebsiteArgs::new("https://example.com", "a[href]")
        };
        assert_eq!(
            serde_json::to_value(&args).unwrap(),
            json!({
                "url": "https://example.com",
                "selector": "a[href]",
                "max_depth": 2,
                "no_samedomain": false
            })
        );
    }

    #[test]
    fn parses_summary_style_report() {
        let result: CrawlWebsiteResult = serde_json::from_value(json!({
            "all_crawled_urls_unique": ["https://example.com", "https://example.com/about"],
            "all_unique_emails_found": ["info@example.com"],
            "crawl_summary": {
                "start_url": "https://example.com",
                "max_depth": 1,
                "unique_base_urls_processed_or_disallowed": 1
            },
            "results_by_domain": {"example.com": [{"url": "https://example.com"}]},
            "_meta": {"elapsed": 1.5}
        }))
        .unwrap();

        assert_eq!(result.all_crawled_urls_unique.as_ref().map(Vec::len), Some(2));
        assert_eq!(
            result.crawl_summary.as_ref().map(|s| s.start_url.as_str()),
            Some("https://example.com")
        );
        assert_eq!(result.meta, Some(json!({"elapsed": 1.5})));
        assert!(result.start_url.is_none());
    }

    #[test]
    fn parses_page_style_report() {
        let result: CrawlWebsiteResult = serde_json::from_value(json!({
            "startUrl": "https://example.com",
            "timestamp": "2025-05-01T10:00:00Z",
            "phoneNumbers": ["+81 3 1234 5678"],
            "crawledData": [{"url": "https://example.com", "title": "Home"}],
            "errors": [{"url": "https://example.com/x", "message": "404"}]
        }))
        .unwrap();

        let pages = result.crawled_data.unwrap();
        assert_eq!(pages[0].title.as_deref(), Some("Home"));
        assert!(pages[0].links.is_empty());
        assert_eq!(result.errors.unwrap()[0].message, "404");
        assert_eq!(result.phone_numbers.unwrap().len(), 1);
    }
}
