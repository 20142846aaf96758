//! Reading scraper output files.
//!
//! Scrapers either dump one JSON array of page objects or append one object
//! per line. Keys other than `name`, `url`, `content` and `createdAt` (such
//! as `title` or `depth`) are ignored.

use serde_json::Deserializer;
use unicontent::CandidateRecord;

pub fn parse_entries(text: &str) -> serde_json::Result<Vec<CandidateRecord>> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text);
    }

    Deserializer::from_str(text)
        .into_iter::<CandidateRecord>()
        .collect()
}
