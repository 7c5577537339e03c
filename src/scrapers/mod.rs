pub mod browser;
pub mod divar;
pub mod scroll;
pub mod traits;
pub mod types;

pub use browser::ListingCrawler;
pub use divar::DivarScraper;
pub use traits::{Extraction, PostExtractor};

use crate::error::{Result, ScoutError};
use scraper::{ElementRef, Selector};

pub(crate) fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScoutError::Selector(format!("{}: {:?}", css, e)))
}

/// Concatenated descendant text, trimmed
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
