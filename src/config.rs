//! Scraper configuration.
//!
//! Everything the crawler and harvester need is carried in one immutable
//! [`ScrapeConfig`] value. It can be loaded from a TOML file; any key that is
//! missing falls back to the defaults below.

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Marketplace root, without trailing slash
    pub base_url: String,
    pub user_agent: String,
    /// Timeout for detail page requests and browser navigation (default: 30)
    pub request_timeout_secs: u64,
    pub headless: bool,
    /// Chrome is torn down after this long without DevTools traffic (default: 120)
    pub browser_idle_timeout_secs: u64,
    pub scroll: ScrollConfig,
    pub probe: ProbeConfig,
    pub selectors: Selectors,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://divar.ir".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            request_timeout_secs: 30,
            headless: true,
            browser_idle_timeout_secs: 120,
            scroll: ScrollConfig::default(),
            probe: ProbeConfig::default(),
            selectors: Selectors::default(),
        }
    }
}

impl ScrapeConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;
        toml::from_str(&content)
            .map_err(|e| ScoutError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn browser_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.browser_idle_timeout_secs)
    }
}

/// Randomized pause bounds in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    #[cfg(test)]
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Pick a duration uniformly within the bounds.
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }
}

/// Pacing of the infinite-scroll loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Pause after every scroll, keeps the crawl under anti-automation radar
    pub scroll_pause: DelayRange,
    /// Longer pause when the probed listing item has not rendered yet
    pub retry_pause: DelayRange,
    /// Pause before the final page content is read
    pub settle_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            scroll_pause: DelayRange::new(3_000, 6_000),
            retry_pause: DelayRange::new(6_000, 10_000),
            settle_ms: 3_000,
        }
    }
}

impl ScrollConfig {
    /// No pauses at all
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            scroll_pause: DelayRange::none(),
            retry_pause: DelayRange::none(),
            settle_ms: 0,
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Where to look for the timestamp label of the most recently loaded item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// XPath with an `{index}` placeholder for the anchor position
    pub xpath_template: String,
    pub items_per_page: usize,
    pub offset: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            xpath_template: "/html/body/div[1]/div[2]/main/div[1]/div[2]/a[{index}]/div[1]/div[3]"
                .to_string(),
            items_per_page: 24,
            offset: 48,
        }
    }
}

/// CSS selectors for the listing and detail pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub listing_container: String,
    pub listing_anchor: String,
    pub publish_time: String,
    pub section: String,
    pub field_item: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            listing_container: "div.browse-post-list".to_string(),
            listing_anchor: "a.col-xs-12".to_string(),
            publish_time: "span.post-header__publish-time".to_string(),
            section: "div.section".to_string(),
            field_item: "div.post-fields-item".to_string(),
        }
    }
}
