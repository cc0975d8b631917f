use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use taxbridge_api::app::services::build_recorder;
use taxbridge_infra::AppConfig;
use taxbridge_infra::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(name = "taxbridge", version, about = "Stock movement ledger for tax-invoicing integration")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, short, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve,
    /// Record the purchases then sales found in a test-data directory.
    Process {
        #[arg(long, default_value = "testdata")]
        testdata: PathBuf,
    },
    /// Print every stored movement as JSON.
    Movements,
    /// Print the on-hand balance of one item, or of all items.
    Balance { item_cd: Option<String> },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    taxbridge_observability::init(&config.logging);

    let recorder = build_recorder(&config)?;

    match cli.command {
        Command::Serve => {
            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime.block_on(serve(&config.server.bind, recorder.clone()))?;
        }
        Command::Process { testdata } => {
            let summary = taxbridge_api::batch::process_dir(&recorder, &testdata)?;
            println!(
                "recorded: {}, recorded but unsynced: {}, rejected: {}",
                summary.recorded, summary.unsynced, summary.rejected
            );
        }
        Command::Movements => {
            let records = recorder.movements()?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Balance { item_cd: Some(item_cd) } => {
            let qty = recorder.balances().current_stock(&item_cd)?;
            println!("{item_cd}\t{}", qty.normalize());
        }
        Command::Balance { item_cd: None } => {
            for (item_cd, qty) in recorder.balances().balances()? {
                println!("{item_cd}\t{}", qty.normalize());
            }
        }
    }

    Ok(())
}

async fn serve(bind: &str, recorder: taxbridge_api::app::SharedRecorder) -> anyhow::Result<()> {
    let app = taxbridge_api::app::build_app(recorder);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
