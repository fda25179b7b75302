// src/crawl/registry.rs
// =============================================================================
// The seen-URL registry: dedup set and crawl result in one map.
//
// Entry lifecycle:
// - claim():    URL inserted with no children yet (`None`), before any fetch
// - finalize(): children written once the page has been processed
// - entries are never removed during a run
//
// The claim is a single insert-if-absent on the shard that owns the key, so
// two workers racing on the same URL cannot both win it.
// =============================================================================

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SeenRegistry {
    entries: DashMap<String, Option<Vec<String>>>,
}

impl SeenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns true if this call inserted the URL, false if it was already seen.
    pub fn claim(&self, url: &str) -> bool {
        match self.entries.entry(url.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(None);
                true
            }
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn finalize(&self, url: &str, children: Vec<String>) {
        self.entries.insert(url.to_string(), Some(children));
    }

    // Point-in-time copy. URLs that are still in progress, or were cut off
    // by the depth limit, map to an empty list.
    pub fn snapshot(&self) -> HashMap<String, Vec<String>> {
        self.entries
            .iter()
            .map(|entry| {
                let children = entry.value().clone().unwrap_or_default();
                (entry.key().clone(), children)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_claim_wins() {
        let registry = SeenRegistry::new();
        assert!(registry.claim("https://example.com/"));
        assert!(!registry.claim("https://example.com/"));
        assert!(registry.contains("https://example.com/"));
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_finalize_replaces_placeholder() {
        let registry = SeenRegistry::new();
        registry.claim("https://example.com/");
        assert_eq!(registry.snapshot()["https://example.com/"], Vec::<String>::new());

        registry.finalize("https://example.com/", vec!["https://example.com/a".to_string()]);
        assert_eq!(
            registry.snapshot()["https://example.com/"],
            vec!["https://example.com/a".to_string()]
        );
        // A finalized entry still counts as claimed
        assert!(!registry.claim("https://example.com/"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_one_winner() {
        let registry = Arc::new(SeenRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.claim("https://example.com/contested")
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
