//! Checkpointed batch harvesting of detail pages.
//!
//! A run walks a `[from, to)` slice of the listing URL file, extracts each
//! post and appends the records to the result store loaded at start. The
//! store is rewritten whole at the end of the run, and optionally every
//! `checkpoint_every` URLs. Resuming is up to the caller: pass the next range.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::scrapers::types::CheckpointRange;
use crate::scrapers::{Extraction, PostExtractor};
use crate::store;

#[derive(Debug, Clone, Default)]
pub struct HarvestOptions {
    /// Rewrite the store after this many processed URLs; `None` writes once at the end
    pub checkpoint_every: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub total_urls: usize,
    /// `to` of the requested range, as given
    pub last_index: usize,
    pub processed: usize,
    pub appended: usize,
    pub skipped: usize,
    pub failed: usize,
    /// The range reached the end of the URL list
    pub reached_end: bool,
    /// Records in the store after the run
    pub stored: usize,
}

pub struct Harvester<E> {
    extractor: E,
    options: HarvestOptions,
}

impl<E: PostExtractor> Harvester<E> {
    pub fn new(extractor: E, options: HarvestOptions) -> Self {
        Self { extractor, options }
    }

    pub async fn run(
        &self,
        urls_path: &Path,
        store_path: &Path,
        range: CheckpointRange,
    ) -> Result<HarvestReport> {
        info!(
            "Harvesting {} into {} via {}",
            urls_path.display(),
            store_path.display(),
            self.extractor.source_name()
        );

        let urls = store::read_post_urls(urls_path).await?;
        let mut records = store::load_results(store_path).await?;
        info!("Loaded {} URLs and {} stored records", urls.len(), records.len());

        let (start, end) = range.clamp(urls.len());
        let mut report = HarvestReport {
            total_urls: urls.len(),
            last_index: range.end(urls.len()),
            ..Default::default()
        };

        for (index, url) in urls[start..end].iter().enumerate().map(|(i, u)| (start + i, u)) {
            debug!("[{}] {}", index, url);

            match self.extractor.extract(url).await {
                Extraction::Record(record) => {
                    records.push(record);
                    report.appended += 1;
                }
                Extraction::Skipped(reason) => {
                    debug!("[{}] skipped: {}", index, reason);
                    report.skipped += 1;
                }
                Extraction::Fatal(e) => {
                    warn!("[{}] dropped {}: {}", index, url, e);
                    report.failed += 1;
                }
            }
            report.processed += 1;

            if let Some(every) = self.options.checkpoint_every.filter(|n| *n > 0) {
                if report.processed % every == 0 && index + 1 < end {
                    store::save_results(store_path, &records).await?;
                    info!("💾 Checkpoint at index {} ({} records)", index + 1, records.len());
                }
            }
        }

        store::save_results(store_path, &records).await?;
        report.stored = records.len();

        info!("Last index: {}", report.last_index);
        if report.last_index >= urls.len() {
            report.reached_end = true;
            info!("End of URLs reached.");
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoutError;
    use crate::models::PostRecord;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Paths ending in `/gone` are skipped, `/bad` fail, the rest yield a record
    struct CannedExtractor;

    #[async_trait]
    impl PostExtractor for CannedExtractor {
        async fn extract(&self, post_path: &str) -> Extraction {
            if post_path.ends_with("/gone") {
                Extraction::Skipped("gone".to_string())
            } else if post_path.ends_with("/bad") {
                Extraction::Fatal(ScoutError::Parse("bad".to_string()))
            } else {
                let mut record = PostRecord::new(post_path.rsplit('/').next().unwrap());
                record.fields.insert("path".to_string(), Some(post_path.to_string()));
                Extraction::Record(record)
            }
        }

        fn source_name(&self) -> &'static str {
            "Canned"
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("/v/post/{}", i)).collect()
    }

    async fn setup(dir: &TempDir, urls: &[String]) -> (std::path::PathBuf, std::path::PathBuf) {
        let urls_path = dir.path().join("list.url");
        let store_path = dir.path().join("list.json");
        store::write_post_urls(&urls_path, urls).await.unwrap();
        (urls_path, store_path)
    }

    fn harvester() -> Harvester<CannedExtractor> {
        Harvester::new(CannedExtractor, HarvestOptions::default())
    }

    fn ids(records: &[PostRecord]) -> Vec<String> {
        let mut ids: Vec<String> = records.iter().map(|r| r.post_id.clone()).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_resumed_ranges_match_single_run() {
        let split_dir = TempDir::new().unwrap();
        let (urls_path, split_store) = setup(&split_dir, &urls(6)).await;
        let h = harvester();
        h.run(&urls_path, &split_store, CheckpointRange::new(0, Some(3)))
            .await
            .unwrap();
        h.run(&urls_path, &split_store, CheckpointRange::new(3, Some(6)))
            .await
            .unwrap();

        let whole_dir = TempDir::new().unwrap();
        let (urls_path, whole_store) = setup(&whole_dir, &urls(6)).await;
        harvester()
            .run(&urls_path, &whole_store, CheckpointRange::new(0, Some(6)))
            .await
            .unwrap();

        let split = store::load_results(&split_store).await.unwrap();
        let whole = store::load_results(&whole_store).await.unwrap();
        assert_eq!(split.len(), 6);
        assert_eq!(ids(&split), ids(&whole));
    }

    #[tokio::test]
    async fn test_end_of_urls_reported() {
        let dir = TempDir::new().unwrap();
        let (urls_path, store_path) = setup(&dir, &urls(5)).await;
        let h = harvester();

        let partial = h
            .run(&urls_path, &store_path, CheckpointRange::new(0, Some(2)))
            .await
            .unwrap();
        assert!(!partial.reached_end);
        assert_eq!(partial.last_index, 2);

        let exact = h
            .run(&urls_path, &store_path, CheckpointRange::new(2, Some(5)))
            .await
            .unwrap();
        assert!(exact.reached_end);
        assert_eq!(exact.stored, 5);
    }

    #[tokio::test]
    async fn test_open_and_oversized_ranges() {
        let dir = TempDir::new().unwrap();
        let (urls_path, store_path) = setup(&dir, &urls(4)).await;
        let h = harvester();

        let open = h
            .run(&urls_path, &store_path, CheckpointRange::new(1, None))
            .await
            .unwrap();
        assert_eq!(open.processed, 3);
        assert_eq!(open.last_index, 4);
        assert!(open.reached_end);

        let beyond = h
            .run(&urls_path, &store_path, CheckpointRange::new(10, Some(20)))
            .await
            .unwrap();
        assert_eq!(beyond.processed, 0);
        assert_eq!(beyond.last_index, 20);
        assert!(beyond.reached_end);
        assert_eq!(beyond.stored, 3);
    }

    #[tokio::test]
    async fn test_skipped_and_failed_posts_are_not_stored() {
        let dir = TempDir::new().unwrap();
        let list = vec![
            "/v/post/a".to_string(),
            "/v/post/gone".to_string(),
            "/v/post/bad".to_string(),
            "/v/post/b".to_string(),
        ];
        let (urls_path, store_path) = setup(&dir, &list).await;

        let report = harvester()
            .run(&urls_path, &store_path, CheckpointRange::new(0, None))
            .await
            .unwrap();

        assert_eq!(report.processed, 4);
        assert_eq!(report.appended, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        let stored = store::load_results(&store_path).await.unwrap();
        assert_eq!(ids(&stored), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_existing_records_are_kept_and_duplicates_allowed() {
        let dir = TempDir::new().unwrap();
        let (urls_path, store_path) = setup(&dir, &urls(2)).await;
        store::save_results(&store_path, &[PostRecord::new("legacy")])
            .await
            .unwrap();

        let h = harvester();
        h.run(&urls_path, &store_path, CheckpointRange::new(0, None))
            .await
            .unwrap();
        let report = h
            .run(&urls_path, &store_path, CheckpointRange::new(0, Some(1)))
            .await
            .unwrap();

        assert_eq!(report.stored, 4);
        let stored = store::load_results(&store_path).await.unwrap();
        assert_eq!(stored[0].post_id, "legacy");
        assert_eq!(ids(&stored), vec!["0", "0", "1", "legacy"]);
    }

    /// Records how many records the store file holds each time a post is extracted
    struct StoreWatcher {
        store_path: std::path::PathBuf,
        seen: std::sync::Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl PostExtractor for StoreWatcher {
        async fn extract(&self, post_path: &str) -> Extraction {
            let on_disk = std::fs::read_to_string(&self.store_path)
                .map(|s| serde_json::from_str::<Vec<PostRecord>>(&s).unwrap().len())
                .unwrap_or(0);
            self.seen.lock().unwrap().push(on_disk);
            Extraction::Record(PostRecord::new(post_path))
        }

        fn source_name(&self) -> &'static str {
            "Watcher"
        }
    }

    async fn watch(checkpoint_every: Option<usize>) -> (Vec<usize>, HarvestReport) {
        let dir = TempDir::new().unwrap();
        let (urls_path, store_path) = setup(&dir, &urls(5)).await;
        let h = Harvester::new(
            StoreWatcher {
                store_path: store_path.clone(),
                seen: Default::default(),
            },
            HarvestOptions { checkpoint_every },
        );

        let report = h
            .run(&urls_path, &store_path, CheckpointRange::new(0, None))
            .await
            .unwrap();
        let seen = h.extractor.seen.lock().unwrap().clone();
        (seen, report)
    }

    #[tokio::test]
    async fn test_whole_run_granularity_by_default() {
        let (seen, report) = watch(None).await;
        assert_eq!(seen, vec![0, 0, 0, 0, 0]);
        assert_eq!(report.stored, 5);
    }

    #[tokio::test]
    async fn test_checkpoints_persist_progress() {
        let (seen, report) = watch(Some(2)).await;
        assert_eq!(seen, vec![0, 0, 2, 2, 4]);
        assert_eq!(report.stored, 5);
    }

    #[tokio::test]
    async fn test_missing_url_file_aborts_without_touching_store() {
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("list.json");

        let err = harvester()
            .run(
                &dir.path().join("missing.url"),
                &store_path,
                CheckpointRange::new(0, None),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ScoutError::Io { .. }));
        assert!(!store_path.exists());
    }
}
