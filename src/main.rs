//! Linkscope main entry point
//!
//! Command-line interface over the [`Auditor`] operations. Every command
//! prints its result as JSON on stdout; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use linkscope::config::{load_config_with_hash, Config};
use linkscope::url::page_id;
use linkscope::Auditor;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Linkscope: site traversal and link-graph analysis
///
/// Crawls a site within a page budget, checks links for breakage, maps
/// redirect chains, and suggests internal links from the site's link graph.
#[derive(Parser, Debug)]
#[command(name = "linkscope")]
#[command(version)]
#[command(about = "Site traversal and link-graph analysis", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site from a seed URL, staying on the seed's origin
    Crawl {
        /// Seed URL
        url: String,

        /// Maximum number of pages to collect
        #[arg(long)]
        max_pages: Option<usize>,

        /// Include raw page bodies in the output
        #[arg(long)]
        include_bodies: bool,
    },

    /// Check a list of URLs concurrently
    Validate {
        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,

        /// Maximum number of checks in flight
        #[arg(long)]
        max_concurrent: Option<usize>,
    },

    /// Fetch one page and check every link on it
    CheckPage {
        /// Page URL
        url: String,
    },

    /// Follow a URL's redirect chain hop by hop
    Redirects {
        /// Start URL
        url: String,

        /// Maximum number of requests to make
        #[arg(long)]
        max_hops: Option<usize>,
    },

    /// Suggest internal links for a set of pages
    Suggest(SuggestArgs),

    /// Crawl a site and suggest internal links for every page found
    Optimize {
        /// Seed URL
        url: String,

        /// Maximum number of pages to collect
        #[arg(long)]
        max_pages: Option<usize>,

        /// Suggestions per page
        #[arg(long)]
        top_n: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct SuggestArgs {
    /// Page id or page URL (repeatable)
    #[arg(long = "page", value_name = "PAGE")]
    pages: Vec<String>,

    /// Existing link between two pages, as `a,b` (repeatable)
    #[arg(long = "edge", value_name = "A,B", value_parser = parse_edge)]
    edges: Vec<(String, String)>,

    /// Take the page list from the internal links of this URL instead
    #[arg(long, value_name = "URL", conflicts_with = "pages")]
    from_url: Option<String>,

    /// Maximum number of pages taken from --from-url
    #[arg(long, requires = "from_url")]
    max_links: Option<usize>,

    /// Suggestions per page
    #[arg(long)]
    top_n: Option<usize>,
}

fn parse_edge(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once(',') {
        Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
            Ok((a.trim().to_string(), b.trim().to_string()))
        }
        _ => Err(format!("expected `a,b`, got {:?}", raw)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_settings(cli.config.as_deref())?;
    if let Command::Validate {
        max_concurrent: Some(max_concurrent),
        ..
    } = &cli.command
    {
        config.validator.max_concurrent = *max_concurrent;
    }

    let auditor = Auditor::new(config).context("Invalid configuration")?;

    match cli.command {
        Command::Crawl {
            url,
            max_pages,
            include_bodies,
        } => {
            let mut report = auditor
                .crawl(&url, max_pages)
                .await
                .with_context(|| format!("Crawl of {} failed", url))?;
            if !include_bodies {
                for page in report.pages.values_mut() {
                    page.body.clear();
                }
            }
            print_json(&report, cli.pretty)?;
        }
        Command::Validate { urls, .. } => {
            let report = auditor.validate_links(urls).await;
            print_json(&report, cli.pretty)?;
        }
        Command::CheckPage { url } => {
            let report = auditor
                .check_page(&url)
                .await
                .with_context(|| format!("Could not check links on {}", url))?;
            print_json(&report, cli.pretty)?;
        }
        Command::Redirects { url, max_hops } => {
            let report = auditor
                .resolve_redirects(&url, max_hops)
                .await
                .with_context(|| format!("Could not resolve redirects for {}", url))?;
            print_json(&report, cli.pretty)?;
        }
        Command::Suggest(args) => {
            let pages = match &args.from_url {
                Some(url) => auditor
                    .internal_pages(url, args.max_links)
                    .await
                    .with_context(|| format!("Could not read internal links from {}", url))?,
                None => args.pages.iter().map(|p| page_id(p)).collect(),
            };
            if pages.is_empty() {
                bail!("No pages to suggest links for; pass --page or --from-url");
            }
            let edges: Vec<(String, String)> = args
                .edges
                .iter()
                .map(|(a, b)| (page_id(a), page_id(b)))
                .collect();
            let report = auditor.suggest_links(&pages, &edges, args.top_n);
            print_json(&report, cli.pretty)?;
        }
        Command::Optimize {
            url,
            max_pages,
            top_n,
        } => {
            let result = auditor
                .optimize_site(&url, max_pages, top_n)
                .await
                .with_context(|| format!("Could not optimize {}", url))?;
            print_json(&result, cli.pretty)?;
        }
    }

    Ok(())
}

/// Loads the configuration file if one was given
fn load_settings(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkscope=info,warn"),
            1 => EnvFilter::new("linkscope=debug,info"),
            2 => EnvFilter::new("linkscope=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
