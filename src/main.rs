use anyhow::Context;
use axum::Router;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use food_explorer::api::{self, AppState};
use food_explorer::commands::{good_query, nutrition_check};
use food_explorer::config::AppConfig;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "openFDA food events and Smart Chef recipes", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the FDA Food Adverse Event explorer
    Fda {
        #[arg(long, default_value = "8000")]
        port: u16,
        /// Open the app in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Serve the Smart Chef recipe app
    Chef {
        #[arg(long, default_value = "8001")]
        port: u16,
        #[arg(long)]
        open: bool,
    },
    /// Print the fixed Cosmetics adverse event query
    GoodQuery,
    /// Check the USDA FoodData Central key and client
    NutritionCheck,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().context("Invalid configuration")?;

    match args.command {
        Command::Fda { port, open } => {
            let state = AppState::new(config);
            state.log_missing_keys();
            serve(api::fda_router(state), port, open).await
        }
        Command::Chef { port, open } => {
            let state = AppState::new(config);
            state.log_missing_keys();
            serve(api::chef_router(state), port, open).await
        }
        Command::GoodQuery => {
            // The failure has already been printed.
            if good_query::run(&config).await.is_err() {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::NutritionCheck => {
            if !nutrition_check::run(&config).await {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn serve(app: Router, port: u16, open: bool) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Server successfully bound to {}", addr);

    if open {
        let url = format!("http://localhost:{}/", port);
        if let Err(e) = webbrowser::open(&url) {
            warn!(error = %e, "Could not open browser at {}", url);
        }
    }

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
