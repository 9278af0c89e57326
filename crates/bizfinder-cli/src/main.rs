mod export;
mod logging;
mod map;
mod progress;
mod report;
mod search;

use std::path::PathBuf;

use bizfinder_search::CategoryFilter;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "bizfinder")]
#[command(about = "Find named businesses around a place using OpenStreetMap data")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for businesses around a place
    Search {
        /// Place to search around (e.g. "Denver" or "Boulder, CO")
        place: String,
        /// Search radius in kilometres (defaults to `BIZFINDER_DEFAULT_RADIUS_KM`)
        #[arg(long, short)]
        radius: Option<f64>,
        /// Kind of business to keep
        #[arg(long = "type", value_enum, default_value_t = BusinessType::All)]
        business_type: BusinessType,
        /// Only show businesses with incomplete data
        #[arg(long)]
        incomplete_only: bool,
        /// Write the shown rows to a CSV file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
        /// Write an HTML map of the shown rows
        #[arg(long, value_name = "PATH")]
        map: Option<PathBuf>,
        /// Look up websites for businesses that have none (one web search each)
        #[arg(long)]
        find_websites: bool,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BusinessType {
    All,
    Restaurants,
    Shops,
}

impl From<BusinessType> for CategoryFilter {
    fn from(value: BusinessType) -> Self {
        match value {
            BusinessType::All => Self::All,
            BusinessType::Restaurants => Self::Restaurants,
            BusinessType::Shops => Self::Shops,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = bizfinder_core::load_app_config()?;

    match cli.command {
        Some(Commands::Search {
            place,
            radius,
            business_type,
            incomplete_only,
            csv,
            map,
            find_websites,
        }) => {
            let _log_guard = logging::init(&config)?;
            search::run_search(
                &config,
                search::SearchArgs {
                    place,
                    radius_km: radius,
                    filter: business_type.into(),
                    incomplete_only,
                    csv,
                    map,
                    find_websites,
                },
            )
            .await
        }
        Some(Commands::Config) => {
            println!("{config:#?}");
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
