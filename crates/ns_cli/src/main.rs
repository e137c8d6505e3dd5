use anyhow::Context;
use clap::{Parser, Subcommand};
use ns_core::Locator;
use ns_location::{
    location_options, FixedPosition, LocationResolver, PlatformGeolocation, ResolveMode, UnsupportedPlatform,
    POPULAR_LOCATIONS,
};
use ns_session::SessionStore;
use ns_sources::{handle_command, init_logging, ArticleService, Config, NewsAggregator, NewsCommands};
use ns_web::ServerState;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // a bare number means seconds
        if !current_number.is_empty() {
            let secs = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(secs)
                .ok_or_else(|| "Duration is too large".to_string())?;
            has_unit = true;
        }

        if !has_unit || total_seconds == 0 {
            return Err("Duration must be a positive number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Location-aware news aggregation", long_about = None)]
struct Cli {
    /// Storage backend for first-party articles
    #[arg(long, default_value = "memory")]
    storage: String,
    /// JSON file of articles to seed the store with
    #[arg(long)]
    seed: Option<PathBuf>,
    /// News API key (overrides NEWS_API_KEY)
    #[arg(long)]
    news_api_key: Option<String>,
    /// Forward geocoding key (overrides OPENCAGE_API_KEY)
    #[arg(long)]
    geocoding_key: Option<String>,
    /// Default number of articles per feed (overrides NEWS_PAGE_SIZE)
    #[arg(long)]
    page_size: Option<usize>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Feed(NewsCommands),
    /// Resolve a location
    Locate {
        #[command(subcommand)]
        mode: Option<LocateCommands>,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
        /// Reload the feed periodically (e.g. 15m, 1h, 1h30m)
        #[arg(long)]
        refresh: Option<HumanDuration>,
    },
}

#[derive(Subcommand, Debug, Clone)]
enum LocateCommands {
    /// Approximate location from the public IP
    Ip,
    /// Geocode a place name
    Custom { text: String },
    /// Reverse geocode known coordinates
    Device {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// List location choices and popular places
    Popular,
}

async fn locate(resolver: &LocationResolver, mode: LocateCommands) -> anyhow::Result<()> {
    let mode = match mode {
        LocateCommands::Ip => ResolveMode::Ip,
        LocateCommands::Custom { text } => ResolveMode::Custom(text),
        LocateCommands::Device { .. } => ResolveMode::Device,
        LocateCommands::Popular => {
            for option in location_options() {
                println!("{:<8} {}", option.value.as_str(), option.label);
            }
            println!();
            for place in POPULAR_LOCATIONS {
                println!("{} ({}): {}", place.country, place.country_code, place.cities.join(", "));
            }
            return Ok(());
        }
    };

    let location = resolver
        .resolve(&mode)
        .await
        .with_context(|| format!("Failed to resolve {:?}", mode))?;
    println!("📍 {}", if location.formatted.is_empty() { "Unknown Location" } else { location.formatted.as_str() });
    println!("   {:.4}, {:.4}", location.latitude, location.longitude);
    if let Some(code) = location.country_code() {
        println!("   country: {} ({})", location.country, code);
    }
    Ok(())
}

async fn build_services(
    storage: &str,
    seed: Option<&Path>,
    config: &Config,
) -> anyhow::Result<(Arc<NewsAggregator>, Arc<ArticleService>)> {
    let storage = ns_storage::create_storage(storage, seed)
        .await
        .context("Failed to initialize storage")?;
    let aggregator = Arc::new(NewsAggregator::from_config(storage.clone(), config));
    Ok((aggregator, Arc::new(ArticleService::new(storage))))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::from_env()
        .with_news_api_key(cli.news_api_key.clone())
        .with_geocoding_key(cli.geocoding_key.clone())
        .with_page_size(cli.page_size);
    if config.news_api_key.is_none() {
        warn!("⚠️ No news API key configured, only stored articles will be served");
    }

    let platform: Arc<dyn PlatformGeolocation> = match &cli.command {
        Commands::Locate {
            mode: Some(LocateCommands::Device { lat, lon }),
        } => Arc::new(FixedPosition::new(*lat, *lon)),
        _ => Arc::new(UnsupportedPlatform),
    };
    let resolver = Arc::new(LocationResolver::new(config.geocoding.clone(), platform));

    match cli.command {
        Commands::Locate { mode } => locate(&resolver, mode.unwrap_or(LocateCommands::Ip)).await?,
        Commands::Feed(command) => {
            let (aggregator, articles) = build_services(&cli.storage, cli.seed.as_deref(), &config).await?;
            handle_command(command, &aggregator, &articles, config.page_size).await?;
        }
        Commands::Serve { addr, refresh } => {
            let (aggregator, articles) = build_services(&cli.storage, cli.seed.as_deref(), &config).await?;
            let locator: Arc<dyn Locator> = resolver;
            let session = Arc::new(SessionStore::new(aggregator, locator).with_page_size(config.page_size));
            // the IP lookup keeps running in the background
            let _ = session.initialize().await;
            info!("📰 Loaded {} articles", session.snapshot().news.len());

            if let Some(HumanDuration(interval)) = refresh {
                let session = session.clone();
                tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(interval);
                    ticker.tick().await;
                    loop {
                        ticker.tick().await;
                        info!("🔄 Refreshing news");
                        session.refresh_news().await;
                    }
                });
            }

            ns_web::serve(ServerState::new(session, articles), addr).await?;
        }
    }

    Ok(())
}
