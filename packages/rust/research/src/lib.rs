//! Competitive research and outline generation for KeywordForge.
//!
//! For each keyword group the pipeline asks this crate for a content
//! outline: a web search finds top-ranking pages, the extractor pulls
//! their structure, and the generator assembles a section plan around the
//! group's primary keyword. Every failure path degrades to a fallback
//! outline instead of erroring.

mod extractor;
mod outline;
mod search;

pub use extractor::{ContentExtractor, PageContent, PageHeading};
pub use outline::{fallback_outline, OutlineGenerator};
pub use search::{HttpSearchProvider, SearchProvider, SearchResult};
