use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use af_config::{load_config, CliOverrides};
use af_ingest::{
    init_logging, read_url_list, BatchResult, HttpFetcher, IngestItem, IngestOptions,
    IngestOrchestrator,
};
use af_core::DATE_FORMAT;
use af_sources::{AdapterDispatcher, ExtractContext, ExtractionPreview, SelectionTrace, SourceAdapter};
use af_storage::FileSystemStore;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "artifactor", author, version, about = "Turns web articles into Jekyll posts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch, extract and render every URL in a list
    Ingest(IngestArgs),
    /// Render an article JSON fixture without extraction
    Scaffold {
        #[arg(long)]
        fixture: PathBuf,
        /// Site directory; the post lands in `<out>/_posts`
        #[arg(long, default_value = "site")]
        out: PathBuf,
    },
    /// List adapters, or show which one would handle a URL
    Adapters {
        #[arg(long)]
        url: Option<String>,
        /// Also try extracting this HTML with every adapter that matches
        #[arg(long, requires = "url")]
        html: Option<PathBuf>,
        #[arg(long, requires = "html")]
        fallback_date: Option<String>,
    },
}

#[derive(clap::Args, Debug, Default)]
struct IngestArgs {
    /// File with one URL per line
    #[arg(long)]
    urls: PathBuf,
    /// Site directory (posts go to `<out>/_posts`)
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    posts_dir: Option<PathBuf>,
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    #[arg(long)]
    user_agent: Option<String>,
    /// Process only the first N URLs
    #[arg(long)]
    limit: Option<usize>,
    #[arg(long)]
    dry_run: bool,
    /// Use this HTML for every URL instead of fetching
    #[arg(long)]
    html_fixture: Option<PathBuf>,
    /// Never touch the network
    #[arg(long)]
    offline: bool,
    /// Use this adapter for every URL
    #[arg(long)]
    adapter: Option<String>,
    /// YYYY-MM-DD date for pages that have none
    #[arg(long, conflicts_with = "require_date")]
    fallback_date: Option<String>,
    /// Fail pages without a publication date even if the config has a fallback
    #[arg(long)]
    require_date: bool,
    /// Print adapter selection for each URL to stderr
    #[arg(long)]
    explain: bool,
    /// Config file, instead of discovering artifactor.yml
    #[arg(long)]
    config: Option<PathBuf>,
}

impl IngestArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            site_dir: self.out.clone(),
            posts_dir: self.posts_dir.clone(),
            timeout_secs: self.timeout,
            user_agent: self.user_agent.clone(),
            offline: self.offline,
            force_adapter: self.adapter.clone(),
            fallback_date: self.fallback_date.clone(),
            require_date: self.require_date,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest(args) => ingest(args).await,
        Commands::Scaffold { fixture, out } => scaffold(&fixture, &out).await,
        Commands::Adapters {
            url,
            html,
            fallback_date,
        } => adapters(url.as_deref(), html.as_deref(), fallback_date.as_deref()),
    }
}

async fn ingest(args: IngestArgs) -> Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let loaded = load_config(args.config.as_deref(), &cwd)?;
    let config = loaded.config.merge(&args.overrides())?;

    let mut options = IngestOptions::from_config(&config);
    options.limit = args.limit;
    options.dry_run = args.dry_run;
    options.explain = args.explain;
    if let Some(path) = &args.html_fixture {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Error reading HTML fixture {}", path.display()))?;
        options.html_fixture = Some(html);
    }

    let urls = read_url_list(&args.urls)
        .with_context(|| format!("Error reading URLs file {}", args.urls.display()))?;
    if urls.is_empty() {
        bail!("No URLs found in {}", args.urls.display());
    }

    if options.dry_run {
        println!("[DRY RUN MODE - No files will be written]");
    }
    if let Some(path) = &args.html_fixture {
        println!("OFFLINE MODE: using {} for all URLs", path.display());
    }
    println!("Found {} URL(s) to process", urls.len());
    if let Some(limit) = options.limit {
        if limit < urls.len() {
            println!("Processing first {} URL(s)", limit);
        }
    }
    println!();

    let posts_dir = config.posts_dir();
    info!("Writing posts to {}", posts_dir.display());
    let store = Arc::new(FileSystemStore::new(posts_dir));
    let mut orchestrator = IngestOrchestrator::new(AdapterDispatcher::builtin(), store);
    if config.input.allow_network && options.html_fixture.is_none() {
        let fetcher = HttpFetcher::new(
            Duration::from_secs(config.input.timeout_secs),
            &config.input.user_agent,
        )?;
        orchestrator = orchestrator.with_fetcher(Arc::new(fetcher));
    }

    let items: Vec<IngestItem> = urls.into_iter().map(IngestItem::live).collect();
    let result = orchestrator.run(&items, &options).await?;
    print_report(&result);

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn print_report(result: &BatchResult) {
    for item in &result.items {
        println!("{}", item.status_line());
    }
    if result.cancelled {
        println!("Cancelled before all URLs were processed");
    }
    println!();
    println!("Summary: {}", result.summary());
}

async fn scaffold(fixture: &Path, out: &Path) -> Result<ExitCode> {
    let store = FileSystemStore::new(out.join("_posts"));
    let location = af_render::scaffold(fixture, &store)
        .await
        .with_context(|| format!("Error scaffolding {}", fixture.display()))?;
    println!("Generated post: {}", location);
    Ok(ExitCode::SUCCESS)
}

fn adapters(url: Option<&str>, html: Option<&Path>, fallback_date: Option<&str>) -> Result<ExitCode> {
    let dispatcher = AdapterDispatcher::builtin();
    match url {
        None => {
            for adapter in dispatcher.adapters() {
                let metadata = adapter.metadata();
                println!(
                    "{:<10} priority={:<3} {:<22} {}",
                    metadata.name,
                    metadata.priority,
                    metadata.match_patterns.join(", "),
                    metadata.description
                );
            }
        }
        Some(url) => {
            let traces = match html {
                Some(path) => {
                    let page = std::fs::read_to_string(path)
                        .with_context(|| format!("Error reading HTML file {}", path.display()))?;
                    let ctx = match fallback_date {
                        Some(raw) => ExtractContext::with_fallback_date(
                            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                                .with_context(|| format!("Invalid fallback date {}", raw))?,
                        ),
                        None => ExtractContext::default(),
                    };
                    dispatcher.explain_with(url, &page, &ctx)
                }
                None => dispatcher.explain(url),
            };
            println!("Adapter selection for {}", url);
            for trace in traces {
                println!("{}", trace_line(&trace));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn trace_line(trace: &SelectionTrace) -> String {
    let mut line = format!(
        "{} {:<10} priority={:<3} can_handle={}",
        if trace.selected { "→" } else { " " },
        trace.name,
        trace.priority,
        trace.can_handle
    );
    match &trace.extraction {
        Some(ExtractionPreview::Extracted { title, date }) => {
            line.push_str(&format!(" ✓ {:?} ({})", title, date));
        }
        Some(ExtractionPreview::Failed(e)) => line.push_str(&format!(" ✗ {}", e)),
        None => {}
    }
    line
}
