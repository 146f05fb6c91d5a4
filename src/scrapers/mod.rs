pub mod dates;
pub mod fetch;
pub mod listing;
pub mod page;

pub use dates::DateNormalizer;
pub use fetch::PageFetcher;
pub use listing::{ListingExtractor, ListingFragments};
pub use page::{PageParser, ParsedPage};
