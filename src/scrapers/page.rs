use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::error::ScrapeError;
use crate::models::ListingRecord;
use crate::scrapers::listing::{ListingExtractor, ListingFragments};

/// Pages render at most 20 listings; the first JSON-LD block describes
/// the page itself, not a listing.
const METADATA_CAP: usize = 20;

const CONTAINER: &str = "div.css-0.e1m0rp605";
const METADATA: &str = r#"script[type="application/ld+json"]"#;
const ANCHOR: &str = r#"a[data-ftid="bulls-list_bull"]"#;
const PRICE: &str = "span.css-46itwz.e162wx9x0";
const DATE_LOCATION: &str = "div.css-1x4jcds.eotelyr0";
const DETAILS: &str = "span.css-1l9tp44.e162wx9x0";

/// Everything one page yielded: the extracted records plus the count of
/// listings dropped on extraction failure.
#[derive(Debug, Default)]
pub struct ParsedPage {
    pub records: Vec<ListingRecord>,
    pub skipped: usize,
}

/// Walks one page document, pairs each listing anchor with its metadata
/// block, and hands the scoped fragments to the extractor.
///
/// Rendered fragments are queried relative to each anchor node, so DOM
/// variance inside one listing cannot shift another listing's fields.
/// The metadata sequence is the only positional pairing left, and its
/// length is validated against the anchor count instead of silently
/// truncating.
pub struct PageParser {
    extractor: ListingExtractor,
    container: Selector,
    metadata: Selector,
    anchor: Selector,
    price: Selector,
    date_location: Selector,
    date: Selector,
    location: Selector,
    details: Selector,
}

impl PageParser {
    pub fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            extractor: ListingExtractor::new(),
            container: selector(CONTAINER)?,
            metadata: selector(METADATA)?,
            anchor: selector(ANCHOR)?,
            price: selector(PRICE)?,
            date_location: selector(DATE_LOCATION)?,
            date: selector("div")?,
            location: selector("span")?,
            details: selector(DETAILS)?,
        })
    }

    pub fn parse(
        &self,
        document: &str,
        fetched_at: NaiveDateTime,
    ) -> Result<ParsedPage, ScrapeError> {
        let doc = Html::parse_document(document);

        let Some(container) = doc.select(&self.container).next() else {
            warn!("listing container missing, treating page as empty");
            return Ok(ParsedPage::default());
        };

        let metadata: Vec<String> = doc
            .select(&self.metadata)
            .skip(1)
            .take(METADATA_CAP)
            .map(|script| script.inner_html())
            .collect();
        let anchors: Vec<ElementRef<'_>> = container.select(&self.anchor).collect();

        if metadata.len() != anchors.len() {
            return Err(ScrapeError::Misaligned {
                metadata: metadata.len(),
                listings: anchors.len(),
            });
        }

        let mut page = ParsedPage::default();
        for (metadata, anchor) in metadata.into_iter().zip(anchors) {
            let fragments = self.collect_fragments(metadata, anchor);
            match self.extractor.extract(&fragments, fetched_at) {
                Ok(record) => page.records.push(record),
                Err(err) => {
                    warn!(
                        link = fragments.link.as_deref().unwrap_or("<unknown>"),
                        %err,
                        "dropping listing"
                    );
                    page.skipped += 1;
                }
            }
        }
        Ok(page)
    }

    fn collect_fragments(&self, metadata: String, anchor: ElementRef<'_>) -> ListingFragments {
        let date_location = anchor.select(&self.date_location).next();
        ListingFragments {
            metadata,
            header: anchor.text().collect(),
            details: anchor
                .select(&self.details)
                .map(|span| span.text().collect())
                .collect(),
            price: anchor
                .select(&self.price)
                .next()
                .map(|span| span.text().collect()),
            date: date_location
                .and_then(|block| block.select(&self.date).next())
                .map(|div| div.text().collect()),
            location: date_location
                .and_then(|block| block.select(&self.location).next())
                .map(|span| span.text().collect()),
            link: anchor.value().attr("href").map(str::to_string),
        }
    }
}

fn selector(css: &'static str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css))
}
