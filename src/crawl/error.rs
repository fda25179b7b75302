// src/crawl/error.rs

use crate::parser::ExtractError;
use thiserror::Error;

// Outcome of a single crawl job that did not finish normally.
//
// `DepthExceeded` is expected at the edge of every crawl and is never
// collected by the worker pool; the other variants are.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{url} is at depth {depth}, past the maximum of {max_depth}")]
    DepthExceeded {
        url: String,
        depth: usize,
        max_depth: usize,
    },
    #[error("failed to extract links from {url}: {source}")]
    Extract {
        url: String,
        #[source]
        source: ExtractError,
    },
    #[error("crawl of {url} was cancelled")]
    Cancelled { url: String },
}

impl CrawlError {
    pub fn url(&self) -> &str {
        match self {
            CrawlError::InvalidUrl { url, .. }
            | CrawlError::DepthExceeded { url, .. }
            | CrawlError::Extract { url, .. }
            | CrawlError::Cancelled { url } => url,
        }
    }

    pub fn is_depth_exceeded(&self) -> bool {
        matches!(self, CrawlError::DepthExceeded { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CrawlError::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_helpers() {
        let cancelled = CrawlError::Cancelled {
            url: "https://example.com/".to_string(),
        };
        assert!(cancelled.is_cancelled());
        assert!(!cancelled.is_depth_exceeded());
        assert_eq!(cancelled.url(), "https://example.com/");

        let too_deep = CrawlError::DepthExceeded {
            url: "https://example.com/deep".to_string(),
            depth: 3,
            max_depth: 2,
        };
        assert!(too_deep.is_depth_exceeded());
        assert!(!too_deep.is_cancelled());
    }
}
