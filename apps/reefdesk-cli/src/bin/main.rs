use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use reefdesk_core::config::{resolve_with_base, Config, Settings};
use reefdesk_core::{CategoryFilter, CollectionSource, StaticSession};
use reefdesk_fetch::{decode_page, HttpCollectionSource, LoadState, Panel, PanelStatus, StaticSource};
use reefdesk_view::{builtin_profiles, profile, ResultView, ViewProfile};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "reefdesk", version, about = "Browse the dive resort's list views from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a collection and show one page of it
    Browse(BrowseArgs),
    /// List the available view profiles
    Profiles,
}

#[derive(clap::Args, Debug)]
struct BrowseArgs {
    /// View profile, e.g. dive-sites or bookings
    #[arg(short, long, default_value = "dive-sites")]
    profile: String,
    #[arg(short, long, default_value = "")]
    search: String,
    /// Category value, or "all"
    #[arg(short, long, default_value = "all")]
    category: String,
    /// Sort mode; defaults to the profile's
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    page: i64,
    #[arg(long)]
    page_size: Option<usize>,
    /// Read the collection from a JSON file instead of the API
    #[arg(short, long, value_name = "FILE")]
    file: Option<String>,
    /// Extra query parameter for the backend, e.g. status=approved
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,
    #[arg(long, env = "REEFDESK_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Extra attempts after a failed fetch
    #[arg(long, default_value_t = 0)]
    retries: u32,
    #[arg(long)]
    json: bool,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let settings = config.settings()?;
    init_tracing(&settings.log.level);

    match cli.command {
        Command::Profiles => {
            for p in builtin_profiles() {
                let page_size = settings.page_size_for(p.name).unwrap_or(p.page_size);
                let modes: Vec<&str> = p.sorts.modes().collect();
                let categories: Vec<&str> = p.categories.iter().collect();
                println!("{:<16} {} (/{})", p.name, p.title, p.endpoint);
                println!("{:<16} sorts: {} (default {})", "", modes.join(", "), p.default_sort);
                println!("{:<16} categories: {}", "", categories.join(", "));
                println!("{:<16} page size: {page_size}", "");
            }
        }
        Command::Browse(args) => browse(&settings, args).await?,
    }
    Ok(())
}

async fn browse(settings: &Settings, args: BrowseArgs) -> anyhow::Result<()> {
    let mut view_profile = profile(&args.profile)?;
    let page_size = match args.page_size {
        Some(n) => Some(NonZeroUsize::new(n).context("--page-size must be positive")?),
        None => settings.page_size_for(view_profile.name),
    };
    if let Some(page_size) = page_size {
        view_profile = view_profile.with_page_size(page_size);
    }

    if let Some(file) = &args.file {
        let path = resolve_with_base(&std::env::current_dir()?, file);
        let source = file_source(&path, view_profile.endpoint)?;
        render(Panel::new(&view_profile, source).with_params(args.params.clone()), &view_profile, &args).await
    } else {
        let session = match &args.token {
            Some(token) => StaticSession::with_token(token.clone()),
            None => StaticSession::anonymous(),
        };
        let source = HttpCollectionSource::new(&settings.api, Arc::new(session))?;
        debug!(base_url = %source.base_url(), "fetching from api");
        render(Panel::new(&view_profile, source).with_params(args.params.clone()), &view_profile, &args).await
    }
}

fn file_source(path: &Path, endpoint: &str) -> anyhow::Result<StaticSource> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let body: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let page = decode_page(body, endpoint)?;
    Ok(StaticSource::new().with(endpoint, page.rows))
}

async fn render<S: CollectionSource>(
    mut panel: Panel<S>,
    view_profile: &ViewProfile,
    args: &BrowseArgs,
) -> anyhow::Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Loading {}...", view_profile.title));
    panel.load().await;
    for attempt in 1..=args.retries {
        if !matches!(panel.status(), PanelStatus::Failed(_)) {
            break;
        }
        warn!(attempt, "retrying failed fetch");
        pb.set_message(format!("Retrying {} ({attempt}/{})...", view_profile.title, args.retries));
        panel.retry().await;
    }
    pb.finish_and_clear();

    if let LoadState::Ready { truncated: true, count, .. } = panel.loader().state() {
        eprintln!("warning: only the first {count} {} were loaded; raise api.max_pages to see more", view_profile.title);
    }

    let category = CategoryFilter::parse(&args.category);
    if let CategoryFilter::Only(key) = &category {
        if !view_profile.categories.contains(key) {
            warn!(category = %key, profile = view_profile.name, "category is not one this view knows about");
        }
    }

    let controller = panel.controller_mut();
    if let Some(mode) = &args.sort {
        let _ = controller.set_sort_mode(mode.as_str());
    }
    let _ = controller.set_category_filter(category);
    let _ = controller.set_search_term(args.search.as_str());
    let _ = controller.set_page(args.page);

    match panel.status() {
        PanelStatus::Failed(err) => bail!("could not load {}: {err}", view_profile.title),
        PanelStatus::Idle | PanelStatus::Loading => bail!("{} is still loading", view_profile.title),
        PanelStatus::NoResults if args.json => print_json(view_profile, &panel.controller().view())?,
        PanelStatus::NoResults => println!("No {} match the current search and filter.", view_profile.title),
        PanelStatus::Results(view) if args.json => print_json(view_profile, &view)?,
        PanelStatus::Results(view) => print_table(view_profile, &panel.controller().query().sort_mode, &view),
    }
    Ok(())
}

fn print_json(view_profile: &ViewProfile, view: &ResultView<'_>) -> anyhow::Result<()> {
    let out = serde_json::json!({
        "profile": view_profile.name,
        "page": view.page(),
        "total_pages": view.total_pages(),
        "total_count": view.total_count(),
        "summary": view.summary(),
        "items": view.page_items(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_table(view_profile: &ViewProfile, sort_mode: &str, view: &ResultView<'_>) {
    println!(
        "{}: page {}/{} ({} results, sorted by {sort_mode})",
        view_profile.title,
        view.page(),
        view.total_pages(),
        view.total_count()
    );
    let offset = view.window().start;
    for (i, record) in view.page_items().iter().enumerate() {
        let category = record.category.as_deref().unwrap_or("-");
        let star = if record.featured { " *" } else { "" };
        println!("{:>4}. {} [{category}]{star}", offset + i + 1, record.display_name);
    }
    let counts: Vec<String> =
        view.summary().by_category.iter().map(|c| format!("{}: {}", c.key, c.count)).collect();
    println!("featured: {} | {}", view.summary().featured, counts.join(", "));
    if view.has_next() {
        println!("next: --page {}", view.page() + 1);
    }
}
