use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use schatzkarte_core::{Catalog, EffectiveWeek};
use schatzkarte_http::{create_router, AppState};
use schatzkarte_service::{MapService, ProgressService, RewardService};
use schatzkarte_storage::{traits::ProgressStore, Storage};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schatzkarte")]
#[command(about = "Treasure-map learning progress server", long_about = None)]
struct Cli {
    /// Path to the SQLite database (defaults to the platform data dir)
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        #[arg(short, long, default_value = "38888")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Print the module catalog as JSON
    Catalog,
    /// Print a user's map view at a given week
    Map {
        user: String,
        #[arg(short, long, conflicts_with = "all_open")]
        week: Option<i64>,
        #[arg(long)]
        all_open: bool,
    },
    /// Print a user's stats
    Stats { user: String },
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("schatzkarte")
        .join("progress.db")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(default_db_path);

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let store: Arc<dyn ProgressStore> = Arc::new(Storage::new(&db_path)?);
    let catalog = Arc::new(Catalog::standard());

    match cli.command {
        Commands::Serve { port, host } => {
            let state = Arc::new(AppState {
                catalog: catalog.clone(),
                map_service: Arc::new(MapService::new(catalog.clone(), store.clone())),
                reward_service: Arc::new(RewardService::new(catalog.clone(), store.clone())),
                progress_service: Arc::new(ProgressService::new(catalog, store)),
            });
            let router = create_router(state);
            let addr = format!("{host}:{port}");
            tracing::info!("Starting HTTP server on {}", addr);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, router).await?;
        }
        Commands::Catalog => {
            println!("{}", serde_json::to_string_pretty(catalog.as_ref())?);
        }
        Commands::Map { user, week, all_open } => {
            let effective = if all_open {
                EffectiveWeek::AllOpen
            } else {
                EffectiveWeek::from_raw(week.unwrap_or(0))?
            };
            let map_service = MapService::new(catalog, store);
            let view = map_service.map_view(&user, effective)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Commands::Stats { user } => {
            let stats = store.get_stats(&user)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
