use thiserror::Error;

/// Failures that take down a whole page or the scraper setup.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid selector `{0}`")]
    Selector(&'static str),

    #[error("page fragments misaligned: {metadata} metadata blocks for {listings} listing anchors")]
    Misaligned { metadata: usize, listings: usize },

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures scoped to a single listing. The listing is dropped and
/// counted; the rest of the page keeps going.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("listing is missing its {0} fragment")]
    MissingFragment(&'static str),

    #[error("listing metadata block is not valid JSON: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("unparsable mileage fragment `{0}`")]
    Mileage(String),

    #[error(transparent)]
    Date(#[from] DateParseError),
}

/// A publication-date phrase that matches none of the recognized shapes.
/// Deliberately loud: an unknown phrase means the vocabulary needs an
/// update, not a silent fallback to "today".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("unrecognized date phrase `{0}`")]
    UnrecognizedPhrase(String),

    #[error("unknown month name `{0}`")]
    UnknownMonth(String),

    #[error("date `{0}` does not exist on the calendar")]
    InvalidDate(String),
}
