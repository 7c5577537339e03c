mod calendar;
mod cli;
mod config;
mod error;
mod harvest;
mod models;
mod scrapers;
mod store;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use cli::{Cli, Commands};
use config::ScrapeConfig;
use harvest::{HarvestOptions, Harvester};
use scrapers::types::{CheckpointRange, CrawlRequest, Target};
use scrapers::{DivarScraper, ListingCrawler};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ScrapeConfig::from_file(path)?,
        None => ScrapeConfig::default(),
    };
    let target = Target::new(cli.city.clone(), cli.category.clone());
    let stamp = cli
        .stamp
        .clone()
        .unwrap_or_else(|| calendar::jalali_stamp(Local::now().date_naive()));
    let urls_path = target.urls_path(&cli.data_dir, &stamp);

    info!("🏠 Divar Scout - {} / {}", target.city, target.category);

    match cli.command {
        Commands::Crawl {
            max_pages,
            until,
            no_save,
        } => {
            let request = CrawlRequest {
                max_pages,
                recency_marker: until,
            };

            // headless_chrome blocks; keep it off the async workers
            let crawl_target = target.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                ListingCrawler::launch(config)?.crawl(&crawl_target, &request)
            })
            .await
            .context("Crawler thread panicked")??;

            info!(
                "✅ Collected {} links in {} iterations ({:?})",
                outcome.links.len(),
                outcome.iterations,
                outcome.stop
            );

            if no_save {
                for link in &outcome.links {
                    println!("{}", link);
                }
            } else {
                store::write_post_urls(&urls_path, &outcome.links).await?;
                info!("💾 Saved links to {}", urls_path.display());
            }
        }
        Commands::Harvest {
            from,
            to,
            checkpoint_every,
        } => {
            let store_path = target.results_path(&cli.data_dir, &stamp);
            let harvester = Harvester::new(
                DivarScraper::new(&config)?,
                HarvestOptions { checkpoint_every },
            );

            let report = harvester
                .run(&urls_path, &store_path, CheckpointRange::new(from, to))
                .await?;

            println!("*** Last index: {} of {}", report.last_index, report.total_urls);
            println!(
                "    {} processed, {} stored, {} skipped, {} failed ({} records in {})",
                report.processed,
                report.appended,
                report.skipped,
                report.failed,
                report.stored,
                store_path.display()
            );
            if report.reached_end {
                println!("***** End of URLs reached. *****");
            }
        }
    }

    Ok(())
}
