use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use llm_client::{ChatProvider, OpenAiProvider};
use spotcast_common::{Area, Config};
use spotcast_datafs::DataRoot;
use spotcast_store::Store;

#[derive(Parser)]
#[command(name = "spotcast", about = "Nightly venue-intelligence pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run rotate through materialize for every area, or one area with `--area`.
    RunPipeline {
        #[arg(long)]
        confirm: bool,
        #[arg(long)]
        area: Option<String>,
    },
    /// Discover new venues via the Google Places provider.
    SeedVenues {
        #[arg(long)]
        confirm: bool,
    },
    /// Print a pivot of the latest run manifest.
    Status,
    /// Render the daily report's action buckets.
    Report,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("spotcast=info".parse()?))
        .init();

    let config = Config::from_env();
    config.log_redacted();

    let cli = Cli::parse();

    let store = Store::connect(&config.database_url).await.context("connecting to the store")?;
    store.migrate().await.context("running migrations")?;
    let pool = store.pool();
    let data_root = DataRoot::new(&config.data_dir);

    let recovered = spotcast_orchestrator::recover_stale_runs(pool, &config).await?;
    if recovered > 0 {
        info!(recovered, "spotcast: recovered stale runs before continuing");
    }

    match cli.command {
        Command::RunPipeline { confirm, area } => {
            if !confirm {
                bail!("run-pipeline requires --confirm");
            }
            let provider: Arc<dyn ChatProvider> = Arc::new(OpenAiProvider::new(&config.llm_api_key));
            let outcome =
                spotcast_orchestrator::run_pipeline(&data_root, pool, &config, provider, area.as_deref()).await?;
            info!(run_id = outcome.run_id, status = ?outcome.status, "spotcast: run-pipeline finished");
            if outcome.status != spotcast_common::RunStatus::Completed {
                bail!("run {} ended in status {:?}", outcome.run_id, outcome.status);
            }
        }
        Command::SeedVenues { confirm } => {
            if !confirm || !config.google_places_enabled {
                bail!("seed-venues requires both --confirm and GOOGLE_PLACES_ENABLED=true; refusing to run");
            }
            if config.google_places_api_key.is_empty() {
                bail!("GOOGLE_PLACES_API_KEY is required to seed venues");
            }
            let areas = load_areas(&data_root).await?;
            let provider: Arc<dyn spotcast_seeder::PlacesProvider> = Arc::new(
                spotcast_seeder::google_places::GooglePlacesProvider::new(&config.google_places_api_key),
            );
            let stats = spotcast_seeder::run_seed(pool, provider, &areas, 4, 1000).await?;
            info!(
                succeeded = stats.areas_succeeded.len(),
                failed = stats.areas_failed.len(),
                venues = stats.venues_upserted,
                "spotcast: seed-venues finished"
            );
        }
        Command::Status => match spotcast_orchestrator::manifest::read(&data_root).await? {
            Some(m) => print_manifest(&m),
            None => println!("no run manifest found"),
        },
        Command::Report => {
            let report = spotcast_orchestrator::report::build(pool, &data_root).await?;
            print!("{report}");
        }
    }

    Ok(())
}

async fn load_areas(data_root: &DataRoot) -> Result<Vec<Area>> {
    let areas: Option<Vec<Area>> = spotcast_datafs::read_json(&data_root.config_path("areas.json")).await?;
    areas.context("config/areas.json not found; seed-venues needs at least one configured area")
}

fn print_manifest(m: &spotcast_orchestrator::Manifest) {
    println!("run {} ({}) — {:?}", m.run_id, m.run_date, m.status);
    if let Some(area) = &m.area_filter {
        println!("area filter: {area}");
    }
    for (name, step) in &m.steps {
        let reason = step.reason.as_deref().unwrap_or("");
        println!("  {name:<10} {:?}  {reason}", step.status);
    }
}
