//! Scraper for paginated vehicle-classified listing pages.
//!
//! The extraction pipeline is fetch → parse page → extract listings:
//! [`PageFetcher`] retrieves a page with bounded retry, [`PageParser`]
//! pairs each listing anchor with its embedded metadata block, and
//! [`ListingExtractor`] cross-references the two into one flat
//! [`ListingRecord`], normalizing relative publication dates through
//! [`DateNormalizer`]. The binary drives this per region and writes one
//! CSV per region.

pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;

pub use error::{DateParseError, ExtractionError, ScrapeError};
pub use models::ListingRecord;
pub use scrapers::{DateNormalizer, ListingExtractor, PageFetcher, PageParser, ParsedPage};
