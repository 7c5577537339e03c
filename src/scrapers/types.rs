use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// City and category to scrape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub city: String,
    pub category: String,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            city: "isfahan".to_string(),
            category: "real-estate".to_string(),
        }
    }
}

impl Target {
    pub fn new(city: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            category: category.into(),
        }
    }

    /// Infinite-scroll listing page for this city and category
    pub fn listing_url(&self, base_url: &str) -> String {
        format!(
            "{}/s/{}/{}",
            base_url.trim_end_matches('/'),
            self.city,
            self.category
        )
    }

    /// `<city>--<category>--<stamp>`
    pub fn file_stem(&self, stamp: &str) -> String {
        format!("{}--{}--{}", self.city, self.category, stamp)
    }

    /// Listing URL file for one crawl day
    pub fn urls_path(&self, data_dir: &Path, stamp: &str) -> PathBuf {
        data_dir.join(format!("{}.url", self.file_stem(stamp)))
    }

    /// Result store paired with [`Target::urls_path`]
    pub fn results_path(&self, data_dir: &Path, stamp: &str) -> PathBuf {
        data_dir.join(format!("{}.json", self.file_stem(stamp)))
    }
}

/// Parameters of one listing crawl
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Upper bound on scroll iterations
    pub max_pages: usize,
    /// Stop once a probed timestamp label contains this text
    pub recency_marker: String,
}

impl Default for CrawlRequest {
    fn default() -> Self {
        Self {
            max_pages: 1,
            recency_marker: "دیروز".to_string(),
        }
    }
}

/// Half-open `[from, to)` slice of the listing URL file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointRange {
    pub from: usize,
    /// `None` runs to the end of the list
    pub to: Option<usize>,
}

impl CheckpointRange {
    pub fn new(from: usize, to: Option<usize>) -> Self {
        Self { from, to }
    }

    /// Requested end index, defaulting to `len`
    pub fn end(&self, len: usize) -> usize {
        self.to.unwrap_or(len)
    }

    /// Bounds clamped to a list of `len` items, never inverted
    pub fn clamp(&self, len: usize) -> (usize, usize) {
        let end = self.end(len).min(len);
        let start = self.from.min(end);
        (start, end)
    }
}
