use crate::config::ScrapeConfig;
use crate::error::{Result, ScoutError};
use crate::scrapers::scroll::{
    collect_listing, CrawlOutcome, ListingPage, ListingSelectors, PositionalProbe,
};
use crate::scrapers::types::{CrawlRequest, Target};
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

const SCROLL_SCRIPT: &str =
    "window.scrollTo(0, document.body.scrollHeight); document.body.scrollHeight";

/// Browser-based listing crawler using headless Chrome.
///
/// The Chrome process lives as long as the crawler and is killed when it is
/// dropped, whichever way the crawl ends.
pub struct ListingCrawler {
    browser: Browser,
    config: ScrapeConfig,
}

impl ListingCrawler {
    /// Launch Chrome
    pub fn launch(config: ScrapeConfig) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .idle_browser_timeout(config.browser_idle_timeout())
            .build()
            .map_err(|e| ScoutError::Browser(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(options).map_err(ScoutError::browser)?;

        Ok(Self { browser, config })
    }

    /// Scroll the listing page of `target` and collect post links
    pub fn crawl(&self, target: &Target, request: &CrawlRequest) -> Result<CrawlOutcome> {
        let url = target.listing_url(&self.config.base_url);
        let selectors = ListingSelectors::from_config(&self.config.selectors)?;
        let probe = PositionalProbe::new(self.config.probe.clone());

        info!("Opening listing page {}", url);
        let page = ChromeListingPage::open(&self.browser, &url, &self.config)?;

        collect_listing(&page, &probe, &selectors, request, &self.config.scroll)
    }
}

/// One Chrome tab showing a listing page. The tab is closed on drop.
struct ChromeListingPage {
    tab: Arc<Tab>,
}

impl ChromeListingPage {
    fn open(browser: &Browser, url: &str, config: &ScrapeConfig) -> Result<Self> {
        let page = Self {
            tab: browser.new_tab().map_err(ScoutError::browser)?,
        };

        page.tab.set_default_timeout(config.request_timeout());
        page.tab
            .set_user_agent(&config.user_agent, None, None)
            .map_err(ScoutError::browser)?;

        page.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| ScoutError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(page)
    }

    fn evaluate(&self, script: &str) -> Result<Option<Value>> {
        let result = self.tab.evaluate(script, false).map_err(ScoutError::browser)?;
        Ok(result.value)
    }
}

impl ListingPage for ChromeListingPage {
    fn scroll_to_bottom(&self) -> Result<u64> {
        self.evaluate(SCROLL_SCRIPT)?
            .and_then(|v| v.as_f64())
            .map(|height| height as u64)
            .ok_or_else(|| ScoutError::Browser("page height unavailable".to_string()))
    }

    fn text_at(&self, xpath: &str) -> Result<Option<String>> {
        // JSON string literals are valid JS string literals
        let literal = serde_json::to_string(xpath)
            .map_err(|e| ScoutError::Browser(format!("Unencodable xpath: {}", e)))?;
        let script = format!(
            r#"(() => {{
                const node = document.evaluate({literal}, document, null,
                    XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
                return node ? node.textContent : null;
            }})()"#
        );

        Ok(match self.evaluate(&script)? {
            Some(Value::String(text)) => Some(text.trim().to_string()),
            _ => None,
        })
    }

    fn content(&self) -> Result<String> {
        self.tab.get_content().map_err(ScoutError::browser)
    }
}

impl Drop for ChromeListingPage {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(false) {
            debug!("Could not close listing tab: {}", e);
        }
    }
}
