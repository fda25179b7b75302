// src/parser/mod.rs
// =============================================================================
// The link extractor: fetch a page, then pull its links out.
//
// Submodules:
// - http: the `Fetch` capability and the reqwest-backed `HttpFetcher`
// - html: markup walking, URL resolution and the same-host filter
//
// `LinkExtractor` ties the two together. A fetch failure or a page URL that
// cannot act as a base is fatal for that one call; link-level problems never
// are (they are filtered out in `html`).
// =============================================================================

mod html;
mod http;

#[cfg(test)]
pub mod fake;

pub use html::{parse_links, ExtractedLinks};
pub use http::{Fetch, FetchError, HttpFetcher};

use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to parse base url {url}: {source}")]
    InvalidBase {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to fetch web page: {0}")]
    Fetch(#[from] FetchError),
}

#[derive(Clone)]
pub struct LinkExtractor {
    fetcher: Arc<dyn Fetch>,
}

impl LinkExtractor {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher }
    }

    // Fetches `page_url` and returns its navigable and resource links.
    pub async fn extract_links(&self, page_url: &str) -> Result<ExtractedLinks, ExtractError> {
        let base = Url::parse(page_url).map_err(|source| ExtractError::InvalidBase {
            url: page_url.to_string(),
            source,
        })?;

        let response = self.fetcher.get(page_url).await?;
        trace!(
            url = %page_url,
            status = response.status.as_u16(),
            content_type = ?response.headers.get(CONTENT_TYPE),
            "page received"
        );
        let links = parse_links(&response.body, &base);
        debug!(
            url = %page_url,
            navigable = links.navigable.len(),
            resources = links.resources.len(),
            "extracted links"
        );
        Ok(links)
    }
}

impl std::fmt::Debug for LinkExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkExtractor").finish_non_exhaustive()
    }
}
