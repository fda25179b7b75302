// src/sitemap/mod.rs
// =============================================================================
// Turns the crawl result into a nested XML sitemap.
//
// Steps:
// 1. build_tree(): walk the URL -> children map depth-first from the seed
// 2. render():     serialize the tree under <urlset xmlns="...">
// 3. write_to_file()
//
// A URL is expanded the first time the walk reaches it. Later references to
// the same URL still show up, but as leaves, so cycles end the walk.
// =============================================================================

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_XMLNS: &str = "https://www.sitemaps.org/schemas/sitemap/0.9/";
const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("failed to serialize sitemap: {0}")]
    Serialize(String),
    #[error("failed to write sitemap to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapConfig {
    pub xmlns: String,
    pub indent: usize,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            xmlns: DEFAULT_XMLNS.to_string(),
            indent: 1,
        }
    }
}

// One <url> element and the <url> elements nested in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlNode {
    pub loc: String,
    #[serde(rename = "url", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<UrlNode>,
}

impl UrlNode {
    fn leaf(loc: &str) -> Self {
        Self {
            loc: loc.to_string(),
            children: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(UrlNode::count).sum::<usize>()
    }
}

#[derive(Serialize)]
#[serde(rename = "urlset")]
struct UrlSet<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'a str,
    url: &'a UrlNode,
}

// Builds the sitemap tree rooted at `root`.
//
// Nodes live in a flat arena while the stack is processed, then get
// assembled bottom-up. Neither pass recurses.
pub fn build_tree(data: &HashMap<String, Vec<String>>, root: &str) -> UrlNode {
    struct Slot {
        loc: String,
        children: Vec<usize>,
    }

    let mut arena = vec![Slot {
        loc: root.to_string(),
        children: Vec::new(),
    }];
    let mut visited: HashSet<String> = HashSet::with_capacity(data.len());
    let mut stack = vec![0usize];

    while let Some(index) = stack.pop() {
        let loc = arena[index].loc.clone();
        if !visited.insert(loc.clone()) {
            continue;
        }
        let Some(children) = data.get(&loc) else {
            continue;
        };
        for child in children {
            let child_index = arena.len();
            arena.push(Slot {
                loc: child.clone(),
                children: Vec::new(),
            });
            arena[index].children.push(child_index);
            stack.push(child_index);
        }
    }

    // A child is always pushed after its parent, so walking the arena
    // backwards finishes every child before the parent asks for it
    let mut built: Vec<Option<UrlNode>> = vec![None; arena.len()];
    for index in (0..arena.len()).rev() {
        let children = arena[index]
            .children
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[index] = Some(UrlNode {
            loc: arena[index].loc.clone(),
            children,
        });
    }
    built
        .first_mut()
        .and_then(Option::take)
        .unwrap_or_else(|| UrlNode::leaf(root))
}

// Serializes the tree with an XML declaration and `config.indent` spaces
// per nesting level.
pub fn render(config: &SitemapConfig, tree: &UrlNode) -> Result<String, SitemapError> {
    let urlset = UrlSet {
        xmlns: &config.xmlns,
        url: tree,
    };

    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', config.indent);
    urlset
        .serialize(serializer)
        .map_err(|e| SitemapError::Serialize(e.to_string()))?;

    Ok(format!("{XML_HEADER}\n{body}\n"))
}

pub fn write_to_file(path: &Path, xml: &str) -> Result<(), SitemapError> {
    std::fs::write(path, xml).map_err(|source| SitemapError::Io {
        path: path.display().to_string(),
        source,
    })
}
