use crate::config::{ScrapeConfig, Selectors};
use crate::error::{Result, ScoutError};
use crate::models::PostRecord;
use crate::scrapers::traits::{Extraction, PostExtractor};
use crate::scrapers::{parse_selector, text_of};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use tracing::{debug, warn};

/// Keys the extractor owns; page labels with these names are dropped
const RESERVED_KEYS: [&str; 5] = [
    "post_id",
    "get_date",
    "post_date",
    "main_category",
    "sub_category",
];

/// Compiled selectors for a detail page
#[derive(Debug, Clone)]
pub struct DetailSelectors {
    publish_time: Selector,
    section: Selector,
    field_item: Selector,
    label: Selector,
    value: Selector,
    link: Selector,
}

impl DetailSelectors {
    pub fn from_config(selectors: &Selectors) -> Result<Self> {
        Ok(Self {
            publish_time: parse_selector(&selectors.publish_time)?,
            section: parse_selector(&selectors.section)?,
            field_item: parse_selector(&selectors.field_item)?,
            label: parse_selector("span")?,
            value: parse_selector("div")?,
            link: parse_selector("a")?,
        })
    }
}

/// `post_id` is the last path segment of the listing link
pub fn post_id_from_path(post_path: &str) -> &str {
    post_path.trim().rsplit('/').next().unwrap_or_default()
}

/// Parse one detail page into a [`PostRecord`].
///
/// Absent structure is tolerated: without a publish-time label the record
/// stops at `post_id` and `get_date`, without sections it has no categories,
/// without a fields container it has no extra fields. Structure that is
/// present but unusable is an error and the record is discarded.
pub fn parse_post(
    html: &str,
    post_path: &str,
    today: NaiveDate,
    selectors: &DetailSelectors,
) -> Result<PostRecord> {
    let mut record = PostRecord::new(post_id_from_path(post_path));
    let document = Html::parse_document(html);

    record.get_date = Some(today.format("%Y-%m-%d").to_string());

    let Some(publish_time) = document.select(&selectors.publish_time).next() else {
        debug!("No publish time on {}, keeping bare record", post_path);
        return Ok(record);
    };
    record.post_date = Some(text_of(publish_time));

    let sections: Vec<_> = document.select(&selectors.section).collect();
    match sections.as_slice() {
        [] => {}
        [_] => {
            return Err(ScoutError::Parse(format!(
                "{}: a single category section, expected main and sub",
                post_path
            )))
        }
        [.., main, sub] => {
            record.main_category = Some(text_of(*main));
            record.sub_category = Some(text_of(*sub));
        }
    }

    for item in document.select(&selectors.field_item) {
        let Some(label) = item.select(&selectors.label).next() else {
            continue;
        };
        let label = text_of(label);
        if RESERVED_KEYS.contains(&label.as_str()) {
            debug!("Dropping field shadowing a derived key: {}", label);
            continue;
        }

        let value = item
            .select(&selectors.value)
            .next()
            .or_else(|| item.select(&selectors.link).next())
            .map(text_of);

        record.fields.insert(label, value);
    }

    Ok(record)
}

/// Detail page scraper for divar.ir
pub struct DivarScraper {
    client: Client,
    base_url: String,
    selectors: DetailSelectors,
}

impl DivarScraper {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            selectors: DetailSelectors::from_config(&config.selectors)?,
        })
    }

    pub fn post_url(&self, post_path: &str) -> String {
        format!("{}{}", self.base_url, post_path)
    }

    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => return Ok(None),
            status if !status.is_success() => {
                warn!("divar returned status {} for {}", status, url);
            }
            _ => {}
        }

        let html = response.error_for_status()?.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(Some(html))
    }
}

#[async_trait]
impl PostExtractor for DivarScraper {
    async fn extract(&self, post_path: &str) -> Extraction {
        let post_path = post_path.trim();
        if post_path.is_empty() {
            return Extraction::Skipped("blank listing path".to_string());
        }

        let url = self.post_url(post_path);
        debug!("Fetching post {}", url);

        let html = match self.fetch(&url).await {
            Ok(Some(html)) => html,
            Ok(None) => return Extraction::Skipped(format!("{} is no longer available", url)),
            Err(e) => return Extraction::Fatal(e),
        };

        match parse_post(&html, post_path, Local::now().date_naive(), &self.selectors) {
            Ok(record) => Extraction::Record(record),
            Err(e) => Extraction::Fatal(e),
        }
    }

    fn source_name(&self) -> &'static str {
        "Divar"
    }
}
