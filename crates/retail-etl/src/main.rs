use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use retail_etl::api::{self, AppState};
use retail_etl_core::{
    db::{self, WAREHOUSE},
    warehouse::{self, WarehouseTotals},
    EtlConfig, Pipeline,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Retail sales ETL job and results API", long_about = None)]
struct Cli {
    /// Read configuration from a TOML file instead of the environment
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract, transform and load sales for one date (or every date)
    Run(RunArgs),
    /// Create the warehouse table if it does not exist
    Migrate,
    /// Print the warehouse contents with totals
    Results,
    /// Start the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Sale date to process (YYYY-MM-DD); all dates when omitted
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Override the in-store sales CSV path
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Skip creating the warehouse table before loading
    #[arg(long)]
    skip_migrations: bool,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the listen address
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Skip creating the warehouse table on startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => handle_run(config, args).await,
        Command::Migrate => {
            let pool = db::connect(WAREHOUSE, &config.warehouse).await?;
            warehouse::ensure_schema(&pool).await?;
            info!("Warehouse migrations applied");
            Ok(())
        }
        Command::Results => handle_results(config).await,
        Command::Serve(args) => handle_serve(config, args).await,
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<EtlConfig> {
    match path {
        Some(path) => EtlConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => {
            dotenvy::dotenv().ok();
            EtlConfig::from_env().context("failed to read configuration from the environment")
        }
    }
}

async fn handle_run(mut config: EtlConfig, args: RunArgs) -> Result<()> {
    if let Some(csv) = args.csv {
        config.csv_path = csv;
    }

    let pipeline = Pipeline::connect(&config).await?;

    if args.skip_migrations {
        warn!("Skipping warehouse migrations before loading");
    } else {
        warehouse::ensure_schema(pipeline.warehouse()).await?;
    }

    let report = pipeline
        .run(args.date)
        .await
        .context("ETL run failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn handle_results(config: EtlConfig) -> Result<()> {
    let pool = db::connect(WAREHOUSE, &config.warehouse).await?;
    let records = warehouse::fetch_aggregated(&pool).await?;
    let totals = WarehouseTotals::from_records(&records);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Product ID", "Total Quantity", "Total Sale Amount"]);
    for record in &records {
        table.add_row(vec![
            record.product_id.to_string(),
            record.total_quantity.to_string(),
            format!("${:.2}", record.total_sale_amount),
        ]);
    }
    table.add_row(vec![
        "TOTAL".to_string(),
        totals.total_quantity.to_string(),
        format!("${:.2}", totals.total_sale_amount),
    ]);

    println!("{table}");
    println!("Total products: {}", totals.products);
    Ok(())
}

async fn handle_serve(mut config: EtlConfig, args: ServeArgs) -> Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let pipeline = Pipeline::connect_lazy(&config)?;

    if args.skip_migrations {
        warn!("Skipping warehouse migrations on startup");
    } else {
        warehouse::ensure_schema(pipeline.warehouse())
            .await
            .context("failed to apply warehouse migrations on startup")?;
    }

    api::serve(AppState::new(pipeline), config.bind_addr).await
}
