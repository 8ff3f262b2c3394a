use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use feed_client::{FeedSource, HttpFeedSource, QuakeMapService, StaticFeedSource};
use pipeline::{build_legend, render_page, MapProfile, TierTable, TileAccessToken};
use shared::domain::{BoundaryLoading, MalformedPolicy, Variant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quakemap", about = "Render the past month of earthquakes on a map")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    #[arg(long, global = true, default_value = "enhanced")]
    variant: Variant,
    /// TOML tier table replacing the built-in thresholds.
    #[arg(long, global = true)]
    tiers: Option<PathBuf>,
    /// Tile provider token; falls back to `API_KEY`, then `APP__TILE_ACCESS_TOKEN`.
    #[arg(long, global = true)]
    access_token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the feeds once and write the map.
    Render {
        #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        earthquake_url: Option<String>,
        /// Read the earthquake feed from a local GeoJSON file instead.
        #[arg(long, conflicts_with = "earthquake_url")]
        earthquake_file: Option<PathBuf>,
        #[arg(long, default_value = "skip")]
        malformed_policy: MalformedPolicy,
        #[arg(long, default_value = "joined")]
        boundary_loading: BoundaryLoading,
    },
    /// Print the tier a magnitude falls into.
    Classify {
        #[arg(allow_negative_numbers = true)]
        magnitude: f64,
    },
    /// Print the legend entries.
    Legend,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Html,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            format,
            output,
            earthquake_url,
            earthquake_file,
            malformed_policy,
            boundary_loading,
        } => {
            let token = access_token(&cli.global)?;
            let profile =
                render_profile(&cli.global, earthquake_url, malformed_policy, boundary_loading)?;

            let source: Arc<dyn FeedSource> = match earthquake_file {
                Some(path) => Arc::new(local_source(&path, &profile)?),
                None => Arc::new(HttpFeedSource::new()),
            };
            let service = QuakeMapService::new(source, profile, token);
            let rendered = render(&service, format).await?;
            match output {
                Some(path) => {
                    fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), "map written");
                }
                None => println!("{rendered}"),
            }
        }
        Command::Classify { magnitude } => {
            let tiers = tier_table(&cli.global)?;
            println!("{}", describe_tier(&tiers, magnitude));
        }
        Command::Legend => {
            for entry in build_legend(&tier_table(&cli.global)?) {
                println!("{:<12} {}", entry.color, entry.label);
            }
        }
    }

    Ok(())
}

fn tier_table(global: &GlobalArgs) -> Result<TierTable> {
    match &global.tiers {
        Some(path) => TierTable::load(path).context("failed to load tier table"),
        None => Ok(TierTable::for_variant(global.variant)),
    }
}

/// The written page is opened without the server behind it, so deferred
/// boundaries are fetched from the upstream feed instead of `/api/boundaries`.
fn render_profile(
    global: &GlobalArgs,
    earthquake_url: Option<String>,
    malformed_policy: MalformedPolicy,
    boundary_loading: BoundaryLoading,
) -> Result<MapProfile> {
    let mut profile = MapProfile::for_variant(global.variant)
        .with_tiers(tier_table(global)?)
        .with_boundary_loading(boundary_loading)
        .with_upstream_page_source();
    profile.malformed_policy = malformed_policy;
    if let Some(url) = earthquake_url {
        profile.earthquake_feed_url = url;
    }
    Ok(profile)
}

fn access_token(global: &GlobalArgs) -> Result<TileAccessToken> {
    TileAccessToken::first_of([
        global.access_token.clone(),
        env::var("API_KEY").ok(),
        env::var("APP__TILE_ACCESS_TOKEN").ok(),
    ])
    .context("render needs a tile provider access token")
}

/// Serves the earthquake feed from disk. Plate boundaries are not
/// registered, so the enhanced variant renders them as a notice.
fn local_source(path: &Path, profile: &MapProfile) -> Result<StaticFeedSource> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not JSON", path.display()))?;
    Ok(StaticFeedSource::new().with_document(profile.earthquake_feed_url.clone(), document))
}

async fn render(service: &QuakeMapService, format: OutputFormat) -> Result<String> {
    let document = service.compose().await;
    for notice in &document.notices {
        warn!(%notice, "map rendered with missing data");
    }
    Ok(match format {
        OutputFormat::Html => render_page(&document)?,
        OutputFormat::Json => serde_json::to_string_pretty(&document)?,
    })
}

fn describe_tier(tiers: &TierTable, magnitude: f64) -> String {
    let tier = tiers.classify(magnitude);
    format!(
        "T{} {} radius={}m",
        tier.index,
        tier.color,
        tiers.radius_for(magnitude)
    )
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
