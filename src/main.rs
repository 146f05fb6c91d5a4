use anyhow::{bail, Context, Result};
use chrono::{Local, Timelike};
use std::path::Path;
use tracing::{info, warn, Level};

use drom_scout::config::{default_headers, ScrapeConfig};
use drom_scout::models::ListingRecord;
use drom_scout::scrapers::{PageFetcher, PageParser};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config = ScrapeConfig::default();
    let fetcher = PageFetcher::new(default_headers()).context("building page fetcher")?;
    let parser = PageParser::new().context("building page parser")?;

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .context("creating output folder")?;

    for &region in &config.regions {
        if let Err(err) = scrape_region(&config, &fetcher, &parser, region).await {
            warn!(region, %err, "region failed");
        }
    }

    Ok(())
}

async fn scrape_region(
    config: &ScrapeConfig,
    fetcher: &PageFetcher,
    parser: &PageParser,
    region: u32,
) -> Result<()> {
    info!(region, "starting region");

    let mut records = Vec::new();
    let mut unavailable = 0usize;
    let mut bad_pages = 0usize;
    let mut skipped_listings = 0usize;

    for page in 1..=config.pages_per_region {
        let url = config.page_url(region, page);
        let Some(document) = fetcher.fetch(&url).await else {
            unavailable += 1;
            continue;
        };

        let fetched_at = Local::now().naive_local();
        match parser.parse(&document, fetched_at) {
            Ok(parsed) => {
                skipped_listings += parsed.skipped;
                records.extend(parsed.records);
            }
            Err(err) => {
                warn!(region, page, %err, "page failed");
                bad_pages += 1;
            }
        }
    }

    if records.is_empty() {
        bail!("no records extracted for region {region}");
    }

    info!(
        region,
        records = records.len(),
        unavailable,
        bad_pages,
        skipped_listings,
        "region done"
    );

    let dir = config.region_dir(region);
    tokio::fs::create_dir_all(&dir)
        .await
        .context("creating region folder")?;

    let now = Local::now();
    let failures = unavailable + bad_pages;
    let file_name = if failures > 0 {
        format!(
            "drom_region{}_{}_{:02}_{:02}errors.csv",
            region,
            now.date_naive(),
            now.hour(),
            failures
        )
    } else {
        format!(
            "drom_region{}_{}_{:02}.csv",
            region,
            now.date_naive(),
            now.hour()
        )
    };

    let path = dir.join(file_name);
    write_csv(&path, &records)?;
    info!(path = %path.display(), "saved region output");
    Ok(())
}

fn write_csv(path: &Path, records: &[ListingRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating csv file")?;
    for record in records {
        writer.serialize(record).context("writing record")?;
    }
    writer.flush().context("flushing csv file")?;
    Ok(())
}
