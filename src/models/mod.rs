use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One scraped ad.
///
/// The fixed keys are derived by the extractor; everything else is copied
/// verbatim from the label/value list on the detail page, so keys differ
/// between records and consumers must tolerate missing ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Trailing path segment of the post URL
    pub post_id: String,
    /// Day of scrape, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_date: Option<String>,
    /// Publish time as rendered by the marketplace ("2 hours ago", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    /// Label -> value; `None` when the label had no resolvable value
    #[serde(flatten)]
    pub fields: BTreeMap<String, Option<String>>,
}

impl PostRecord {
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            ..Default::default()
        }
    }
}
