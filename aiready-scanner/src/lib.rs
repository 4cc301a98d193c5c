pub mod analyzer;
pub mod document;
pub mod error;
pub mod fetcher;
pub mod result;

pub use analyzer::{Breakdown, Category, PageAnalysis, analyze, analyze_document};
pub use document::{DocumentQuery, ParsedDocument, TagAttributes};
pub use error::ScanError;
pub use fetcher::PageFetcher;
pub use result::FetchedPage;
