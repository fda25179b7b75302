// src/parser/http.rs
// =============================================================================
// The fetch capability used by the link extractor.
//
// Key functionality:
// - A small `Fetch` trait so the extractor never talks to reqwest directly
// - `HttpFetcher`, the reqwest-backed implementation used by the binary
// - Non-2xx responses are NOT errors here; the body is handed back as-is
//
// Only transport failures (DNS, connect, timeout, redirect loop, body read)
// come back as `FetchError`.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("sitescout/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;
const MAX_IDLE_PER_HOST: usize = 100;
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Error)]
pub enum FetchError {
    /// reqwest could not complete the request or read the body
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Any other transport-level failure
    #[error("could not fetch {url}: {reason}")]
    Transport { url: String, reason: String },
}

// A fetched page: status line, headers and the full body as text
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

// Anything that can GET a URL.
//
// Cancellation is not threaded through here: once a request is in flight it
// runs until it completes or hits the client's own timeout.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

// The default fetcher. Cloning is cheap, the client shares its pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .pool_idle_timeout(IDLE_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let wrap = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(wrap)?;
        let status = response.status();
        let headers = response.headers().clone();
        debug!(%url, status = status.as_u16(), "fetched page");

        let body = response.text().await.map_err(wrap)?;
        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_returns_body_and_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><a href=\"/next\">next</a></body></html>")
            .create_async()
            .await;

        let response = fetcher()
            .get(&format!("{}/page", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers["content-type"], "text/html");
        assert!(response.body.contains("/next"));
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("<html><a href=\"/home\">home</a></html>")
            .create_async()
            .await;

        let response = fetcher()
            .get(&format!("{}/missing", server.url()))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(response.body.contains("/home"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_fetch_error() {
        // Port 1 is reserved and nothing listens there in CI containers
        let err = fetcher().get("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
        assert!(err.to_string().contains("127.0.0.1:1"));
    }
}
