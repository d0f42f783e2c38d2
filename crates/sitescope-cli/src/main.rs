mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sitescope_core::{FilterSet, PicklistScope, ZoomStrategyKind};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sitescope")]
#[command(about = "Proximity search and map framing over field-site exports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List sites within a radius of one site, nearest first
    Neighbors {
        #[command(flatten)]
        source: SourceArgs,
        /// Focal site id
        #[arg(long)]
        site: String,
        /// Search radius in kilometres (defaults to SITESCOPE_NEIGHBOR_RADIUS_KM)
        #[arg(long)]
        radius: Option<f64>,
        /// Maximum neighbours to return; 0 for no cap
        #[arg(long)]
        cap: Option<usize>,
    },
    /// Free-text search over the site list
    Search {
        #[command(flatten)]
        source: SourceArgs,
        /// Matched against site id and name
        #[arg(long)]
        site: Option<String>,
        /// Matched against the address
        #[arg(long)]
        address: Option<String>,
        /// Matched against franchise, region, sub-region, grid and district
        #[arg(long)]
        franchise: Option<String>,
    },
    /// Compute the map frame and marker set for the site list
    Frame {
        #[command(flatten)]
        source: SourceArgs,
        /// Zoom strategy (defaults to SITESCOPE_ZOOM_STRATEGY)
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },
    /// Distinct values for one level of the region cascade
    Picklist {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum)]
        scope: ScopeArg,
    },
    /// Metric history for one site (requires SITESCOPE_SOURCE_URL)
    History {
        /// Site id
        #[arg(long)]
        site: String,
        /// Days of history (defaults to SITESCOPE_HISTORY_DAYS)
        #[arg(long)]
        days: Option<u32>,
    },
}

/// Where site rows come from and which upstream filters apply.
#[derive(Debug, Clone, Default, Args)]
struct SourceArgs {
    /// JSON or YAML site export; without it rows come from SITESCOPE_SOURCE_URL
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    sub_region: Option<String>,
    #[arg(long)]
    grid: Option<String>,
    #[arg(long)]
    district: Option<String>,
    #[arg(long)]
    classification: Option<String>,
}

impl SourceArgs {
    fn filters(&self) -> FilterSet {
        FilterSet {
            region: self.region.clone(),
            sub_region: self.sub_region.clone(),
            grid: self.grid.clone(),
            district: self.district.clone(),
            classification: self.classification.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    PointCount,
    FitBounds,
}

impl From<StrategyArg> for ZoomStrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::PointCount => ZoomStrategyKind::PointCount,
            StrategyArg::FitBounds => ZoomStrategyKind::FitBounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    Region,
    SubRegion,
    Grid,
    District,
}

impl From<ScopeArg> for PicklistScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Region => PicklistScope::Region,
            ScopeArg::SubRegion => PicklistScope::SubRegion,
            ScopeArg::Grid => PicklistScope::Grid,
            ScopeArg::District => PicklistScope::District,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = sitescope_core::load_engine_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let report = match cli.command {
        Commands::Neighbors {
            source,
            site,
            radius,
            cap,
        } => {
            if let Some(radius) = radius {
                anyhow::ensure!(
                    radius.is_finite() && radius >= 0.0,
                    "--radius must be a non-negative number"
                );
                config.neighbor_radius_km = radius;
            }
            if let Some(cap) = cap {
                config.neighbor_cap = (cap > 0).then_some(cap);
            }
            let rows = commands::load_sites(&source, &config).await?;
            serde_json::to_value(commands::neighbors_report(rows, &site, &config)?)?
        }
        Commands::Search {
            source,
            site,
            address,
            franchise,
        } => {
            let query = sitescope_geo::SearchQuery {
                site: site.unwrap_or_default(),
                address: address.unwrap_or_default(),
                franchise: franchise.unwrap_or_default(),
            };
            let rows = commands::load_sites(&source, &config).await?;
            serde_json::to_value(commands::search_report(rows, query, &config))?
        }
        Commands::Frame { source, strategy } => {
            if let Some(strategy) = strategy {
                config.zoom_strategy = strategy.into();
            }
            let rows = commands::load_sites(&source, &config).await?;
            serde_json::to_value(commands::frame_report(rows, &config))?
        }
        Commands::Picklist { source, scope } => {
            serde_json::to_value(commands::picklist(&source, scope.into(), &config).await?)?
        }
        Commands::History { site, days } => {
            let days = days.unwrap_or(config.history_days);
            serde_json::to_value(commands::history_report(&site, days, &config).await?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests;
