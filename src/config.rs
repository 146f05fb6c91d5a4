use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Region numbers that have no listing coverage and always come back empty.
const EMPTY_REGIONS: &[RangeInclusive<u32>] = &[80..=85, 87..=88, 90..=100];

/// Run configuration for the scrape: which regions, how deep, and where
/// the per-region CSV files land.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub regions: Vec<u32>,
    pub pages_per_region: u32,
    pub output_dir: PathBuf,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://auto.drom.ru".to_string(),
            regions: (1..=102)
                .filter(|region| !EMPTY_REGIONS.iter().any(|range| range.contains(region)))
                .collect(),
            pages_per_region: 100,
            output_dir: PathBuf::from("drom"),
        }
    }
}

impl ScrapeConfig {
    pub fn page_url(&self, region: u32, page: u32) -> String {
        format!("{}/region{}/all/page{}", self.base_url, region, page)
    }

    pub fn region_dir(&self, region: u32) -> PathBuf {
        self.output_dir.join(format!("region{region}"))
    }
}

/// Default browser-like header set for listing pages.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers
}
