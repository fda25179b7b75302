// src/parser/fake.rs
// In-memory fetcher for tests. Counts every request so tests can assert how
// many times a URL was fetched.

use super::http::FetchResponse;
use super::{Fetch, FetchError};
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    failures: HashSet<String>,
    hits: DashMap<String, usize>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failures.insert(url.to_string());
        self
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.get(url).map(|count| *count).unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.iter().map(|entry| *entry.value()).sum()
    }
}

#[async_trait]
impl Fetch for FakeFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        *self.hits.entry(url.to_string()).or_insert(0) += 1;
        tokio::task::yield_now().await;

        if self.failures.contains(url) {
            return Err(FetchError::Transport {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            });
        }

        // Unknown pages behave like an empty 404 body
        let (status, body) = match self.pages.get(url) {
            Some(body) => (StatusCode::OK, body.clone()),
            None => (StatusCode::NOT_FOUND, String::new()),
        };
        Ok(FetchResponse {
            status,
            headers: HeaderMap::new(),
            body,
        })
    }
}
