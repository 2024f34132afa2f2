mod prompt;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use benchdb_core::{
    catalog::{self, NewBenchmark, NewGpu, NewRun},
    config::{BenchConfig, DatabaseConfig},
    db,
    importer::{self, ImportSummary},
};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Benchmark DB management CLI", long_about = None)]
struct Cli {
    /// TOML file with extra capture-header aliases
    #[arg(long, global = true, env = "BENCHDB_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a new manufacturer
    AddManufacturer(NameArgs),
    /// Add a new graphics card vendor
    AddVendor(NameArgs),
    /// Add a new graphics card
    AddGpu(AddGpuArgs),
    /// Add a new CPU
    AddCpu(AddCpuArgs),
    /// Add a new driver
    AddDriver(AddDriverArgs),
    /// Add a new benchmark application
    AddBenchmark(AddBenchmarkArgs),
    /// Add a new run and import its PresentMon results
    AddRun(AddRunArgs),
    /// Import PresentMon results into an existing run
    ImportResults(ImportResultsArgs),
}

#[derive(Args, Debug, Default)]
struct NameArgs {
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args, Debug, Default)]
struct AddGpuArgs {
    /// Graphics card name
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    model: Option<String>,
    /// Existing manufacturer ID (skip selection)
    #[arg(long)]
    manufacturer_id: Option<i32>,
    /// Existing vendor ID (skip selection)
    #[arg(long)]
    vendor_id: Option<i32>,
}

#[derive(Args, Debug, Default)]
struct AddCpuArgs {
    #[arg(long)]
    model: Option<String>,
    /// Existing manufacturer ID (skip selection)
    #[arg(long)]
    manufacturer_id: Option<i32>,
}

#[derive(Args, Debug, Default)]
struct AddDriverArgs {
    #[arg(long)]
    version: Option<String>,
    /// Existing manufacturer ID (skip selection)
    #[arg(long)]
    manufacturer_id: Option<i32>,
}

#[derive(Args, Debug, Default)]
struct AddBenchmarkArgs {
    #[arg(long)]
    application: Option<String>,
    /// Application version
    #[arg(long)]
    version: Option<String>,
    #[arg(long)]
    settings: Option<String>,
    #[arg(long)]
    resolution: Option<String>,
}

#[derive(Args, Debug, Default)]
struct AddRunArgs {
    /// Existing benchmark ID (skip selection)
    #[arg(long)]
    benchmark_id: Option<i32>,
    /// Existing GPU ID (skip selection)
    #[arg(long)]
    gpu_id: Option<i32>,
    /// Existing driver ID (skip selection)
    #[arg(long)]
    driver_id: Option<i32>,
    /// Existing CPU ID (skip selection)
    #[arg(long)]
    cpu_id: Option<i32>,
    /// Run date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    run_date: Option<NaiveDate>,
    /// PresentMon CSV file
    #[arg(long)]
    csv_file: Option<PathBuf>,
    /// Print the import summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ImportResultsArgs {
    #[arg(long)]
    run_id: i32,
    /// PresentMon CSV file
    #[arg(long)]
    csv_file: PathBuf,
    /// Print the import summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    match cli.command {
        Command::AddManufacturer(args) => handle_add_manufacturer(args).await,
        Command::AddVendor(args) => handle_add_vendor(args).await,
        Command::AddGpu(args) => handle_add_gpu(args).await,
        Command::AddCpu(args) => handle_add_cpu(args).await,
        Command::AddDriver(args) => handle_add_driver(args).await,
        Command::AddBenchmark(args) => handle_add_benchmark(args).await,
        Command::AddRun(args) => handle_add_run(args, config).await,
        Command::ImportResults(args) => handle_import_results(args, config).await,
    }
}

async fn handle_add_manufacturer(args: NameArgs) -> Result<()> {
    let name = prompt::text(args.name, "Manufacturer name")?;
    let pool = connect_pool().await?;
    let id = catalog::create_manufacturer(&pool, &name).await?;
    println!("Created Manufacturer ID={id}");
    Ok(())
}

async fn handle_add_vendor(args: NameArgs) -> Result<()> {
    let name = prompt::text(args.name, "Vendor name")?;
    let pool = connect_pool().await?;
    let id = catalog::create_vendor(&pool, &name).await?;
    println!("Created Vendor ID={id}");
    Ok(())
}

async fn handle_add_gpu(args: AddGpuArgs) -> Result<()> {
    let name = prompt::text(args.name, "Graphics card name")?;
    let model = prompt::text(args.model, "Graphics card model")?;
    let pool = connect_pool().await?;

    let manufacturer_id = match args.manufacturer_id {
        Some(id) => id,
        None => prompt::select("manufacturer", &catalog::list_manufacturers(&pool).await?)?,
    };
    let vendor_id = match args.vendor_id {
        Some(id) => id,
        None => prompt::select("vendor", &catalog::list_vendors(&pool).await?)?,
    };

    let id = catalog::create_gpu(
        &pool,
        &NewGpu {
            manufacturer_id,
            vendor_id,
            name,
            model,
        },
    )
    .await?;
    println!("Created GPU ID={id}");
    Ok(())
}

async fn handle_add_cpu(args: AddCpuArgs) -> Result<()> {
    let model = prompt::text(args.model, "CPU model")?;
    let pool = connect_pool().await?;
    let manufacturer_id = match args.manufacturer_id {
        Some(id) => id,
        None => prompt::select("manufacturer", &catalog::list_manufacturers(&pool).await?)?,
    };
    let id = catalog::create_cpu(&pool, manufacturer_id, &model).await?;
    println!("Created CPU ID={id}");
    Ok(())
}

async fn handle_add_driver(args: AddDriverArgs) -> Result<()> {
    let version = prompt::text(args.version, "Driver version")?;
    let pool = connect_pool().await?;
    let manufacturer_id = match args.manufacturer_id {
        Some(id) => id,
        None => prompt::select("manufacturer", &catalog::list_manufacturers(&pool).await?)?,
    };
    let id = catalog::create_driver(&pool, manufacturer_id, &version).await?;
    println!("Created Driver ID={id}");
    Ok(())
}

async fn handle_add_benchmark(args: AddBenchmarkArgs) -> Result<()> {
    let benchmark = NewBenchmark {
        application: prompt::text(args.application, "Application name")?,
        version: prompt::text(args.version, "Application version")?,
        settings: prompt::optional_text(args.settings, "Settings")?,
        resolution: prompt::optional_text(args.resolution, "Resolution")?,
    };
    let pool = connect_pool().await?;
    let id = catalog::create_benchmark(&pool, &benchmark).await?;
    println!("Created Benchmark ID={id}");
    Ok(())
}

async fn handle_add_run(args: AddRunArgs, config: Option<PathBuf>) -> Result<()> {
    let aliases = BenchConfig::discover(config.as_deref())?.alias_table();
    let pool = connect_pool().await?;

    let benchmark_id = match args.benchmark_id {
        Some(id) => id,
        None => prompt::select("benchmark", &catalog::list_benchmarks(&pool).await?)?,
    };
    let gpu_id = match args.gpu_id {
        Some(id) => id,
        None => prompt::select("GPU", &catalog::list_gpus(&pool).await?)?,
    };
    let driver_id = match args.driver_id {
        Some(id) => id,
        None => prompt::select("driver", &catalog::list_drivers(&pool).await?)?,
    };
    let cpu_id = match args.cpu_id {
        Some(id) => id,
        None => prompt::select("CPU", &catalog::list_cpus(&pool).await?)?,
    };
    let run_date = prompt::date(args.run_date, "Run date", Utc::now().date_naive())?;
    let csv_file = match args.csv_file {
        Some(path) => path,
        None => PathBuf::from(prompt::text(None, "PresentMon CSV file path")?),
    };
    ensure_file(&csv_file)?;

    let mut tx = pool.begin().await?;
    let run_id = catalog::create_run(
        &mut tx,
        &NewRun {
            benchmark_id,
            gpu_id,
            driver_id,
            cpu_id,
            run_date: Some(run_date),
        },
    )
    .await?;
    let summary = importer::import_capture(&mut tx, &csv_file, run_id, &aliases)
        .await
        .with_context(|| format!("failed to import {}", csv_file.display()))?;
    tx.commit().await?;

    println!("Created Run ID={run_id} and imported {} results.", summary.rows);
    print_summary(&summary, args.json)
}

async fn handle_import_results(args: ImportResultsArgs, config: Option<PathBuf>) -> Result<()> {
    ensure_file(&args.csv_file)?;
    let aliases = BenchConfig::discover(config.as_deref())?.alias_table();
    let pool = connect_pool().await?;

    let mut tx = pool.begin().await?;
    let summary = importer::import_into_existing_run(&mut tx, &args.csv_file, args.run_id, &aliases)
        .await
        .with_context(|| format!("failed to import {}", args.csv_file.display()))?;
    tx.commit().await?;

    println!("Imported {} results into Run ID={}.", summary.rows, args.run_id);
    print_summary(&summary, args.json)
}

fn ensure_file(path: &std::path::Path) -> Result<()> {
    if !path.is_file() {
        bail!("CSV file '{}' does not exist", path.display());
    }
    Ok(())
}

fn print_summary(summary: &ImportSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    }
    Ok(())
}

async fn connect_pool() -> Result<db::DbPool> {
    let config = DatabaseConfig::from_env().context("database connection is not configured")?;
    let pool = db::connect(&config.url)
        .await
        .context("failed to connect to Postgres")?;
    db::ensure_schema(&pool).await?;
    info!("Connected to benchmark database");
    Ok(pool)
}
