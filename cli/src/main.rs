mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{cmd_foods, cmd_summary, cmd_target};
use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "mealprint",
    version,
    about = "A food nutrition & emissions analyzer CLI",
    long_about = "\nPick foods and ounce quantities; mealprint totals the calories,\nmacronutrients, and lifecycle carbon footprint of the plate."
)]
struct Cli {
    /// Path to the catalog CSV (default: the data directory's foods.csv,
    /// then the bundled dataset)
    #[arg(long, value_name = "PATH", global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List foods in the catalog
    Foods {
        /// Filter by name (case-insensitive substring)
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show nutrition and emissions totals for a selection
    Summary {
        /// Foods as NAME[=OUNCES] (bare NAME means 1 oz)
        #[arg(required = true)]
        foods: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a selection against a calorie target
    Target {
        /// Calorie target (at least 100)
        calories: i64,
        /// Foods as NAME[=OUNCES] (bare NAME means 1 oz)
        #[arg(required = true)]
        foods: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Disable API key authentication (for development/testing)
        #[arg(long)]
        no_auth: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let catalog = config.load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Foods { search, json } => cmd_foods(&catalog, search.as_deref(), json),
        Commands::Summary { foods, json } => cmd_summary(&catalog, &foods, json),
        Commands::Target {
            calories,
            foods,
            json,
        } => cmd_target(&catalog, calories, &foods, json),
        Commands::Serve {
            port,
            bind,
            no_auth,
        } => {
            let api_key = if no_auth {
                None
            } else {
                let (key, _newly_created) = config.load_or_create_api_key()?;
                Some(key)
            };
            server::start_server(catalog, port, &bind, api_key).await
        }
    }
}
