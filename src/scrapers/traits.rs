use crate::error::ScoutError;
use crate::models::PostRecord;
use async_trait::async_trait;

/// What came out of one detail page
#[derive(Debug)]
pub enum Extraction {
    Record(PostRecord),
    /// Nothing to extract, e.g. the ad was taken down
    Skipped(String),
    /// Extraction went wrong; the record is discarded
    Fatal(ScoutError),
}

/// Common trait for detail page sources.
/// The harvester only depends on this, so tests can feed it canned records.
#[async_trait]
pub trait PostExtractor: Send + Sync {
    /// Fetch and parse the post behind one relative listing path
    async fn extract(&self, post_path: &str) -> Extraction;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}
