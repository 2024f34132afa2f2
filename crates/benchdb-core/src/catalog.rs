// crates/benchdb-core/src/catalog.rs

//! Record creation for the entities a run refers to. Referential checks are
//! left to the foreign keys in the schema.

use std::fmt;

use chrono::NaiveDate;
use sqlx::{FromRow, Postgres, Transaction};
use tracing::info;

use crate::db::DbPool;
use crate::error::Result;

/// Anything a user can pick by id in a selection prompt.
pub trait CatalogEntry: fmt::Display {
    fn id(&self) -> i32;
}

macro_rules! catalog_entry {
    ($ty:ty) => {
        impl CatalogEntry for $ty {
            fn id(&self) -> i32 {
                self.id
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Manufacturer {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Vendor {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Gpu {
    pub id: i32,
    pub manufacturer_id: i32,
    pub vendor_id: i32,
    pub name: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Cpu {
    pub id: i32,
    pub manufacturer_id: i32,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Driver {
    pub id: i32,
    pub manufacturer_id: i32,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Benchmark {
    pub id: i32,
    pub application: String,
    pub version: String,
    pub settings: Option<String>,
    pub resolution: Option<String>,
}

catalog_entry!(Manufacturer);
catalog_entry!(Vendor);
catalog_entry!(Gpu);
catalog_entry!(Cpu);
catalog_entry!(Driver);
catalog_entry!(Benchmark);

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.name)
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.name)
    }
}

impl fmt::Display for Gpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.id, self.name, self.model)
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.model)
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.version)
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} v{} {} {}",
            self.id,
            self.application,
            self.version,
            self.resolution.as_deref().unwrap_or("-"),
            self.settings.as_deref().unwrap_or("-")
        )
    }
}

#[derive(Debug, Clone)]
pub struct NewGpu {
    pub manufacturer_id: i32,
    pub vendor_id: i32,
    pub name: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct NewBenchmark {
    pub application: String,
    pub version: String,
    pub settings: Option<String>,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewRun {
    pub benchmark_id: i32,
    pub gpu_id: i32,
    pub driver_id: i32,
    pub cpu_id: i32,
    pub run_date: Option<NaiveDate>,
}

pub async fn create_manufacturer(pool: &DbPool, name: &str) -> Result<i32> {
    let id: i32 = sqlx::query_scalar("INSERT INTO manufacturers (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await?;
    info!(id, name, "Created manufacturer");
    Ok(id)
}

pub async fn create_vendor(pool: &DbPool, name: &str) -> Result<i32> {
    let id: i32 = sqlx::query_scalar("INSERT INTO vendors (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await?;
    info!(id, name, "Created vendor");
    Ok(id)
}

pub async fn create_gpu(pool: &DbPool, gpu: &NewGpu) -> Result<i32> {
    let id: i32 = sqlx::query_scalar(
        r#"
            INSERT INTO gpus (manufacturer_id, vendor_id, name, model)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        "#,
    )
    .bind(gpu.manufacturer_id)
    .bind(gpu.vendor_id)
    .bind(&gpu.name)
    .bind(&gpu.model)
    .fetch_one(pool)
    .await?;
    info!(id, name = %gpu.name, model = %gpu.model, "Created GPU");
    Ok(id)
}

pub async fn create_cpu(pool: &DbPool, manufacturer_id: i32, model: &str) -> Result<i32> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO cpus (manufacturer_id, model) VALUES ($1, $2) RETURNING id",
    )
    .bind(manufacturer_id)
    .bind(model)
    .fetch_one(pool)
    .await?;
    info!(id, model, "Created CPU");
    Ok(id)
}

pub async fn create_driver(pool: &DbPool, manufacturer_id: i32, version: &str) -> Result<i32> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO drivers (manufacturer_id, version) VALUES ($1, $2) RETURNING id",
    )
    .bind(manufacturer_id)
    .bind(version)
    .fetch_one(pool)
    .await?;
    info!(id, version, "Created driver");
    Ok(id)
}

pub async fn create_benchmark(pool: &DbPool, benchmark: &NewBenchmark) -> Result<i32> {
    let id: i32 = sqlx::query_scalar(
        r#"
            INSERT INTO benchmarks (application, version, settings, resolution)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        "#,
    )
    .bind(&benchmark.application)
    .bind(&benchmark.version)
    .bind(&benchmark.settings)
    .bind(&benchmark.resolution)
    .fetch_one(pool)
    .await?;
    info!(id, application = %benchmark.application, "Created benchmark");
    Ok(id)
}

/// Inserts a run inside the caller's transaction so that the run and its
/// imported results become visible together.
pub async fn create_run(tx: &mut Transaction<'_, Postgres>, run: &NewRun) -> Result<i32> {
    let id: i32 = sqlx::query_scalar(
        r#"
            INSERT INTO runs (benchmark_id, gpu_id, driver_id, cpu_id, run_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
        "#,
    )
    .bind(run.benchmark_id)
    .bind(run.gpu_id)
    .bind(run.driver_id)
    .bind(run.cpu_id)
    .bind(run.run_date)
    .fetch_one(&mut **tx)
    .await?;
    info!(id, "Created run");
    Ok(id)
}

pub async fn run_exists(tx: &mut Transaction<'_, Postgres>, run_id: i32) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM runs WHERE id = $1)")
        .bind(run_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(exists)
}

pub async fn list_manufacturers(pool: &DbPool) -> Result<Vec<Manufacturer>> {
    let rows = sqlx::query_as::<_, Manufacturer>("SELECT id, name FROM manufacturers ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_vendors(pool: &DbPool) -> Result<Vec<Vendor>> {
    let rows = sqlx::query_as::<_, Vendor>("SELECT id, name FROM vendors ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_gpus(pool: &DbPool) -> Result<Vec<Gpu>> {
    let rows = sqlx::query_as::<_, Gpu>(
        "SELECT id, manufacturer_id, vendor_id, name, model FROM gpus ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_cpus(pool: &DbPool) -> Result<Vec<Cpu>> {
    let rows = sqlx::query_as::<_, Cpu>("SELECT id, manufacturer_id, model FROM cpus ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_drivers(pool: &DbPool) -> Result<Vec<Driver>> {
    let rows =
        sqlx::query_as::<_, Driver>("SELECT id, manufacturer_id, version FROM drivers ORDER BY id")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

pub async fn list_benchmarks(pool: &DbPool) -> Result<Vec<Benchmark>> {
    let rows = sqlx::query_as::<_, Benchmark>(
        "SELECT id, application, version, settings, resolution FROM benchmarks ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
