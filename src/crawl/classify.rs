// src/crawl/classify.rs
// =============================================================================
// Decides whether a discovered URL is a page worth crawling or a leaf asset.
//
// Rules, applied to the last path segment's extension:
// - no extension                          -> navigable
// - server-page extension (.php, .asp,
//   .aspx, .jsp, .erb)                     -> navigable
// - script extensions (.js, .mjs)         -> static, even if typed text/*
// - any extension whose MIME type is text -> navigable (.html, .htm, .css ...)
// - anything else, including unknown      -> static
//
// Pure function over the URL; safe to call from any worker.
// =============================================================================

use mime_guess::mime;
use url::Url;

// Extensions served as HTML by application servers. mime_guess either does
// not know them or maps them to something that is not text.
const SERVER_PAGE_EXTENSIONS: [&str; 5] = ["php", "asp", "aspx", "jsp", "erb"];

// Newer MIME tables type JavaScript as text/javascript
const SCRIPT_EXTENSIONS: [&str; 2] = ["js", "mjs"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Navigable,
    Static,
}

pub fn classify(url: &Url) -> LinkKind {
    let Some(extension) = extension(url) else {
        return LinkKind::Navigable;
    };
    if is_text_extension(&extension) {
        LinkKind::Navigable
    } else {
        LinkKind::Static
    }
}

// Extension of the last path segment, lowercased and without the dot.
fn extension(url: &Url) -> Option<String> {
    let file_name = url.path_segments()?.last()?;
    let (_, extension) = file_name.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

fn is_text_extension(extension: &str) -> bool {
    if SERVER_PAGE_EXTENSIONS.contains(&extension) {
        return true;
    }
    if SCRIPT_EXTENSIONS.contains(&extension) {
        return false;
    }
    mime_guess::from_ext(extension)
        .first()
        .is_some_and(|guess| guess.type_() == mime::TEXT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(url: &str) -> LinkKind {
        classify(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_server_pages_are_navigable() {
        for ext in ["php", "asp", "aspx", "jsp", "erb", "PHP"] {
            let url = format!("https://example.com/index.{ext}");
            assert_eq!(kind(&url), LinkKind::Navigable, "{url}");
        }
    }

    #[test]
    fn test_no_extension_is_navigable() {
        assert_eq!(kind("https://example.com/path/to/file"), LinkKind::Navigable);
        assert_eq!(kind("https://example.com/"), LinkKind::Navigable);
        assert_eq!(kind("https://example.com"), LinkKind::Navigable);
    }

    #[test]
    fn test_html_is_navigable() {
        assert_eq!(kind("https://example.com/file.htm"), LinkKind::Navigable);
        assert_eq!(kind("https://example.com/file.html?x=1"), LinkKind::Navigable);
    }

    #[test]
    fn test_media_and_scripts_are_static() {
        for url in [
            "https://example.com/photo.jpg",
            "https://example.com/logo.png",
            "https://example.com/app.js",
            "https://example.com/report.pdf",
            "https://example.com/clip.mp4",
        ] {
            assert_eq!(kind(url), LinkKind::Static, "{url}");
        }
    }

    #[test]
    fn test_extension_only_looks_at_last_segment() {
        assert_eq!(kind("https://example.com/v1.2/about"), LinkKind::Navigable);
        assert_eq!(kind("https://example.com/docs.d/pic.gif"), LinkKind::Static);
    }

    #[test]
    fn test_unknown_extension_is_static() {
        assert_eq!(kind("https://example.com/archive.qqzz"), LinkKind::Static);
    }
}
