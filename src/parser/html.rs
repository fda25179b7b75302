// src/parser/html.rs
// =============================================================================
// This module pulls candidate links out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (built on html5ever)
// - Lets us walk every element in document order
//
// Element dispatch:
// - <a>, <link>, <base>                  -> href -> navigable candidate
// - <img>, <image>, <script>, <source>,
//   <embed>, <iframe>                     -> src  -> resource candidate
// - everything else is ignored
//
// Every candidate is resolved against the page URL and kept only when it is
// https and on exactly the same host as the page. Anything else, including
// values that do not parse as a URL, is dropped without a word.
// =============================================================================

use scraper::Html;
use url::Url;

const SECURE_SCHEME: &str = "https";

// Links found on one page, in the order they appear in the markup.
// Duplicates are kept; deduplication happens in the crawl engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedLinks {
    pub navigable: Vec<Url>,
    pub resources: Vec<Url>,
}

// Which list an element's link belongs to, and where to read it from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkSlot {
    Navigable,
    Resource,
}

impl LinkSlot {
    fn for_element(name: &str) -> Option<(Self, &'static str)> {
        match name {
            "a" | "link" | "base" => Some((LinkSlot::Navigable, "href")),
            "img" | "image" | "script" | "source" | "embed" | "iframe" => {
                Some((LinkSlot::Resource, "src"))
            }
            _ => None,
        }
    }
}

// Parses `html` and collects every same-host https link, resolved against
// `base`.
pub fn parse_links(html: &str, base: &Url) -> ExtractedLinks {
    let document = Html::parse_document(html);
    let mut links = ExtractedLinks::default();

    // descendants() is a pre-order walk, i.e. the order tags open in the source
    for node in document.root_element().descendants() {
        let Some(element) = node.value().as_element() else {
            continue;
        };
        let Some((slot, attribute)) = LinkSlot::for_element(element.name()) else {
            continue;
        };
        let Some(raw) = element.attr(attribute) else {
            continue;
        };
        // Bad or off-site links just fall out here
        if let Some(url) = resolve_link(base, raw) {
            match slot {
                LinkSlot::Navigable => links.navigable.push(url),
                LinkSlot::Resource => links.resources.push(url),
            }
        }
    }

    links
}

// Resolves an attribute value against the page URL.
//
// Returns None when the value is malformed, not https, or points at a
// different host than `base`. The fragment is removed so `/page#a` and
// `/page#b` are the same crawl target.
fn resolve_link(base: &Url, raw: &str) -> Option<Url> {
    // join() handles absolute, root-relative and path-relative values alike
    let mut url = base.join(raw.trim()).ok()?;

    // Only secure links on the page's own host are worth following
    if url.scheme() != SECURE_SCHEME {
        return None;
    }
    if url.host_str() != base.host_str() {
        return None;
    }

    url.set_fragment(None);
    Some(url)
}
