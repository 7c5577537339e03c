//! Infinite-scroll crawl loop.
//!
//! The loop only talks to the page through [`ListingPage`], and decides when
//! listings are old enough through a [`RecencyProbe`]. The Chrome-backed page
//! lives in `browser.rs`; the positional probe below is the only piece that
//! knows where timestamps sit in the rendered listing.

use std::thread;

use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::config::{ProbeConfig, ScrollConfig, Selectors};
use crate::error::{Result, ScoutError};
use crate::scrapers::parse_selector;
use crate::scrapers::types::CrawlRequest;

/// A rendered listing page that can be scrolled
pub trait ListingPage {
    /// Scroll to the bottom and return the document height afterwards
    fn scroll_to_bottom(&self) -> Result<u64>;

    /// Text of the first node matching `xpath`, `None` if it is not rendered
    fn text_at(&self, xpath: &str) -> Result<Option<String>>;

    /// Current HTML of the whole document
    fn content(&self) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Label(String),
    NotFound,
}

/// Reads the relative timestamp of the newest loaded listing item
pub trait RecencyProbe {
    fn probe(&self, page: &dyn ListingPage, pages_loaded: usize) -> Result<Probe>;
}

/// Probes the item at a fixed offset into the listing, assuming a constant
/// number of items per loaded page.
#[derive(Debug, Clone)]
pub struct PositionalProbe {
    config: ProbeConfig,
}

impl PositionalProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// 1-based position of the probed anchor after `pages_loaded` scrolls
    pub fn index_for(&self, pages_loaded: usize) -> usize {
        self.config.items_per_page * pages_loaded.saturating_sub(1) + self.config.offset
    }

    pub fn xpath_for(&self, pages_loaded: usize) -> String {
        self.config
            .xpath_template
            .replace("{index}", &self.index_for(pages_loaded).to_string())
    }
}

impl RecencyProbe for PositionalProbe {
    fn probe(&self, page: &dyn ListingPage, pages_loaded: usize) -> Result<Probe> {
        let xpath = self.xpath_for(pages_loaded);
        Ok(match page.text_at(&xpath)? {
            Some(label) => Probe::Label(label),
            None => Probe::NotFound,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Height stopped changing, the listing has nothing more to load
    Exhausted,
    BudgetReached,
    /// A probed label contained the recency marker
    MarkerReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSummary {
    pub iterations: usize,
    pub stop: StopReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Relative post paths in discovery order
    pub links: Vec<String>,
    pub iterations: usize,
    pub stop: StopReason,
}

/// Compiled selectors for the listing page
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    container_css: String,
    container: Selector,
    anchor: Selector,
}

impl ListingSelectors {
    pub fn from_config(selectors: &Selectors) -> Result<Self> {
        Ok(Self {
            container_css: selectors.listing_container.clone(),
            container: parse_selector(&selectors.listing_container)?,
            anchor: parse_selector(&selectors.listing_anchor)?,
        })
    }
}

/// Scroll until the listing is exhausted, the page budget is spent, or the
/// probe reports a label containing the recency marker.
///
/// Every scroll counts against the budget, including ones after which the
/// probed item has not rendered yet. An empty marker never matches.
pub fn scroll_until_recent(
    page: &dyn ListingPage,
    probe: &dyn RecencyProbe,
    request: &CrawlRequest,
    pacing: &ScrollConfig,
) -> Result<ScrollSummary> {
    let max_pages = request.max_pages;
    if max_pages == 0 {
        return Ok(ScrollSummary {
            iterations: 0,
            stop: StopReason::BudgetReached,
        });
    }

    let mut pages = 0;
    let mut height = page.scroll_to_bottom()?;

    loop {
        let last_height = height;
        height = page.scroll_to_bottom()?;
        thread::sleep(pacing.scroll_pause.sample());
        pages += 1;

        if height == last_height {
            info!("Page {}/{}: height stuck at {}, listing exhausted", pages, max_pages, height);
            return Ok(ScrollSummary {
                iterations: pages,
                stop: StopReason::Exhausted,
            });
        }

        if pages >= max_pages {
            info!("Page budget of {} spent", max_pages);
            return Ok(ScrollSummary {
                iterations: pages,
                stop: StopReason::BudgetReached,
            });
        }

        match probe.probe(page, pages) {
            Ok(Probe::Label(label)) => {
                info!("Page {}/{}: {}", pages, max_pages, label);
                if !request.recency_marker.is_empty() && label.contains(&request.recency_marker) {
                    info!("Reached posts marked '{}'", request.recency_marker);
                    return Ok(ScrollSummary {
                        iterations: pages,
                        stop: StopReason::MarkerReached,
                    });
                }
            }
            Ok(Probe::NotFound) => {
                warn!("Page {}/{}: probed post not rendered yet, waiting...", pages, max_pages);
                thread::sleep(pacing.retry_pause.sample());
            }
            Err(e) => {
                warn!("Page {}/{}: probe failed: {}", pages, max_pages, e);
            }
        }
    }
}

/// Pull every post link out of the listing container.
pub fn extract_links(html: &str, selectors: &ListingSelectors) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let container = document
        .select(&selectors.container)
        .next()
        .ok_or_else(|| ScoutError::ListingContainerMissing(selectors.container_css.clone()))?;

    let links: Vec<String> = container
        .select(&selectors.anchor)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
        .collect();

    debug!("Found {} post links in listing", links.len());
    Ok(links)
}

/// Full listing crawl over an already opened page.
pub fn collect_listing(
    page: &dyn ListingPage,
    probe: &dyn RecencyProbe,
    selectors: &ListingSelectors,
    request: &CrawlRequest,
    pacing: &ScrollConfig,
) -> Result<CrawlOutcome> {
    let summary = scroll_until_recent(page, probe, request, pacing)?;

    thread::sleep(pacing.settle());
    let html = page.content()?;
    let links = extract_links(&html, selectors)?;

    Ok(CrawlOutcome {
        links,
        iterations: summary.iterations,
        stop: summary.stop,
    })
}
