//! Typed wrappers for the scraping tools served by the companion server.

mod ai_summary;
mod crawl;
mod google_search;
mod law_page;

pub use ai_summary::{
    GET_GOOGLE_AI_SUMMARY, GetGoogleAiSummaryArgs, GetGoogleAiSummaryResult, SummaryItem,
    SummarySource,
};
pub use crawl::{
    CRAWL_WEBSITE, CrawlError, CrawlSummary, CrawlWebsiteArgs, CrawlWebsiteResult, CrawledPage,
};
pub use google_search::{
    GOOGLE_SEARCH, GoogleSearchArgs, GoogleSearchResult, SearchMetadata, SearchResultItem,
    SourceCategory,
};
pub use law_page::{
    BrowserType, LawContextEntry, LawHierarchy, SCRAPE_LAW_PAGE, ScrapeLawPageArgs,
    ScrapeLawPageResult,
};

use mcp::Transport;

use crate::client::McpClient;
use crate::config::RequestOptions;
use crate::error::Result;

impl<T: Transport> McpClient<T> {
    /// Fetch Google's AI overview for a query along with the cited sources.
    pub async fn get_google_ai_summary(
        &self,
        args: &GetGoogleAiSummaryArgs,
        options: RequestOptions,
    ) -> Result<GetGoogleAiSummaryResult> {
        self.call_tool(GET_GOOGLE_AI_SUMMARY, args, options).await
    }

    pub async fn crawl_website(
        &self,
        args: &CrawlWebsiteArgs,
        options: RequestOptions,
    ) -> Result<CrawlWebsiteResult> {
        self.call_tool(CRAWL_WEBSITE, args, options).await
    }

    /// Find keyword hits on a statute page, located by chapter and article.
    pub async fn scrape_law_page(
        &self,
        args: &ScrapeLawPageArgs,
        options: RequestOptions,
    ) -> Result<ScrapeLawPageResult> {
        self.call_tool(SCRAPE_LAW_PAGE, args, options).await
    }

    pub async fn google_search(
        &self,
        args: &GoogleSearchArgs,
        options: RequestOptions,
    ) -> Result<GoogleSearchResult> {
        self.call_tool(GOOGLE_SEARCH, args, options).await
    }
}
