// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI is a plain struct and every flag is a
// field with an #[arg(...)] attribute. The struct also knows how to turn
// itself into the engine and sitemap settings.
// =============================================================================

use crate::crawl::CrawlerConfig;
use crate::sitemap::{SitemapConfig, DEFAULT_XMLNS};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "sitescout",
    version,
    about = "Crawl a website from a seed URL and write an XML sitemap",
    long_about = "sitescout follows every same-host https link it can find, starting from a seed \
                  URL, using a pool of concurrent workers. Pages and assets it discovers are \
                  written out as a nested XML sitemap."
)]
pub struct Cli {
    /// Seed URL to start crawling from (must be https)
    ///
    /// Example: sitescout https://example.com --depth 3
    pub site_url: String,

    /// Where to write the sitemap
    #[arg(short, long, default_value = "sitemap.xml")]
    pub output: PathBuf,

    /// How often to check whether the crawl has finished, in milliseconds
    #[arg(long, default_value_t = 200)]
    pub check_interval_ms: u64,

    /// Per-request HTTP timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 100)]
    pub worker_count: usize,

    /// Maximum number of jobs the queue holds before spilling to overflow
    #[arg(long, default_value_t = 100)]
    pub queue_size: usize,

    /// Maximum link depth to fetch (0 = only the seed page)
    #[arg(long, default_value_t = 100)]
    pub depth: usize,

    /// Spaces per nesting level in the sitemap
    #[arg(long, default_value_t = 1)]
    pub indent: usize,

    /// Sitemap XML namespace
    #[arg(long, default_value = DEFAULT_XMLNS)]
    pub xml_ns: String,

    /// Print a JSON report of the run to stdout
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging (RUST_LOG overrides this)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig {
            worker_count: self.worker_count,
            queue_size: self.queue_size,
            max_depth: self.depth,
        }
    }

    pub fn sitemap_config(&self) -> SitemapConfig {
        SitemapConfig {
            xmlns: self.xml_ns.clone(),
            indent: self.indent,
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
