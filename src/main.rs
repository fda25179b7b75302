// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Start the crawler's worker pool and seed it with the site URL
// 3. Poll until there is no work left, then stop and join the workers
// 4. Build the sitemap from everything that was discovered and write it
// 5. Exit with proper code (0 = clean crawl, 1 = some pages failed, 2 = error)
//
// Ctrl-C cancels the crawl; pages already in flight finish and whatever
// was discovered so far is still written out.
// =============================================================================

mod cli;      // src/cli.rs - command-line parsing
mod crawl;    // src/crawl/ - worker pool, queue, registry
mod parser;   // src/parser/ - fetching pages and extracting links
mod sitemap;  // src/sitemap/ - tree building and XML output

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::Cli;
use crawl::{CrawlError, Crawler, CrawlerConfig};
use parser::{HttpFetcher, LinkExtractor};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so --json output on stdout stays parseable
fn init_logging(verbose: bool) {
    let default_directive = if verbose { "sitescout=debug" } else { "sitescout=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Summary printed with --json
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    seed: &'a str,
    config: &'a CrawlerConfig,
    elapsed_ms: u128,
    pages: usize,
    sitemap: String,
    errors: Vec<String>,
    urls: &'a HashMap<String, Vec<String>>,
}

async fn run(cli: Cli) -> Result<i32> {
    let seed = parse_seed(&cli.site_url)?;
    let config = cli.crawler_config();

    // Human-readable progress only when stdout is not carrying JSON
    let say = |message: String| {
        if !cli.json {
            println!("{}", message);
        }
    };

    let fetcher = HttpFetcher::new(cli.http_timeout()).context("failed to build HTTP client")?;
    let crawler = Crawler::new(config, LinkExtractor::new(Arc::new(fetcher)))
        .context("invalid crawler settings")?;

    let cancel = CancellationToken::new();
    watch_for_interrupt(cancel.clone());

    say(format!("🕷️  Starting crawler with {} workers", crawler.config().worker_count));
    crawler.start(cancel.clone());

    say(format!("🔍 Crawling website: {}", seed));
    let started = Instant::now();
    if let Err(e) = seed_outcome(crawler.crawl(&cancel, seed.as_str(), 0).await) {
        crawler.stop();
        crawler.wait().await;
        return Err(e).context("failed to crawl the seed page");
    }

    crawler.run_until_idle(cli.check_interval()).await;
    let errors = crawler.wait().await;
    let elapsed = started.elapsed();

    let seen = crawler.seen_urls();
    info!(
        pages = seen.len(),
        failures = errors.len(),
        ?elapsed,
        state = ?crawler.state(),
        "crawl finished"
    );
    say(format!("📄 Found {} url(s) in {:.2?}", seen.len(), elapsed));
    if cancel.is_cancelled() {
        say("⚠️  Crawl was interrupted, the sitemap is partial".to_string());
    }

    let tree = sitemap::build_tree(&seen, seed.as_str());
    let xml = sitemap::render(&cli.sitemap_config(), &tree)?;
    sitemap::write_to_file(&cli.output, &xml)?;
    say(format!(
        "✅ Sitemap with {} entries written to {}",
        tree.count(),
        cli.output.display()
    ));

    if cli.json {
        let report = RunReport {
            seed: seed.as_str(),
            config: crawler.config(),
            elapsed_ms: elapsed.as_millis(),
            pages: seen.len(),
            sitemap: cli.output.display().to_string(),
            errors: errors.iter().map(ToString::to_string).collect(),
            urls: &seen,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_errors(&errors);
    }

    Ok(if errors.is_empty() { 0 } else { 1 })
}

// The crawl only ever follows https links on the seed's own host, so the
// seed has to be one of those too.
fn parse_seed(raw: &str) -> Result<Url> {
    let seed = Url::parse(raw.trim()).with_context(|| format!("invalid seed URL '{}'", raw))?;
    if seed.scheme() != "https" {
        bail!("seed URL must use https, got '{}'", seed.scheme());
    }
    if seed.host_str().is_none() {
        bail!("seed URL has no host: {}", raw);
    }
    Ok(seed)
}

// Ctrl-C while the seed is in flight is not a failure: the seed's entry is
// already recorded, so the run carries on and writes a partial sitemap.
// Anything else going wrong with the seed ends the run.
fn seed_outcome(result: Result<(), CrawlError>) -> Result<(), CrawlError> {
    match result {
        Err(e) if e.is_cancelled() => {
            warn!(url = %e.url(), "interrupted while crawling the seed page");
            Ok(())
        }
        other => other,
    }
}

fn watch_for_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing pages already in flight");
            cancel.cancel();
        }
    });
}

fn print_errors(errors: &[CrawlError]) {
    if errors.is_empty() {
        return;
    }
    println!("\n❌ {} page(s) could not be crawled:", errors.len());
    for error in errors {
        println!("   {}", error);
    }
}
