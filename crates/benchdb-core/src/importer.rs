// crates/benchdb-core/src/importer.rs

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use benchdb_parser::{parse_capture, AliasTable, FrameResult, Metric, ParsedCapture};
use serde::Serialize;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::catalog;
use crate::error::{BenchError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub run_id: i32,
    pub rows: usize,
    pub frame_time_column: String,
    pub metrics: Vec<Metric>,
    pub last_sample_time_ms: Option<i32>,
}

/// Imports a capture file into `run_id` inside the caller's transaction.
///
/// The file is fully parsed and closed before anything is written; the rows
/// are then inserted in one statement. The transaction is never committed
/// here, so on any error the caller's rollback leaves the run without results.
pub async fn import_capture(
    tx: &mut Transaction<'_, Postgres>,
    path: &Path,
    run_id: i32,
    aliases: &AliasTable,
) -> Result<ImportSummary> {
    let parsed = read_capture_file(path, run_id, aliases)?;
    debug!(path = %path.display(), rows = parsed.len(), "parsed capture file");
    persist_capture(tx, run_id, parsed).await
}

/// Same as [`import_capture`] for an already-open handle.
pub async fn import_capture_reader<R: Read>(
    tx: &mut Transaction<'_, Postgres>,
    reader: R,
    run_id: i32,
    aliases: &AliasTable,
) -> Result<ImportSummary> {
    let parsed = parse_capture(reader, run_id, aliases)?;
    persist_capture(tx, run_id, parsed).await
}

/// Imports into a run that must already exist.
pub async fn import_into_existing_run(
    tx: &mut Transaction<'_, Postgres>,
    path: &Path,
    run_id: i32,
    aliases: &AliasTable,
) -> Result<ImportSummary> {
    if !catalog::run_exists(tx, run_id).await? {
        return Err(BenchError::RunNotFound(run_id));
    }
    import_capture(tx, path, run_id, aliases).await
}

fn read_capture_file(path: &Path, run_id: i32, aliases: &AliasTable) -> Result<ParsedCapture> {
    let file = File::open(path).map_err(|source| BenchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_capture(BufReader::new(file), run_id, aliases)?;
    Ok(parsed)
}

async fn persist_capture(
    tx: &mut Transaction<'_, Postgres>,
    run_id: i32,
    parsed: ParsedCapture,
) -> Result<ImportSummary> {
    let ParsedCapture { columns, results } = parsed;

    for metric in Metric::ALL {
        match columns.column(metric) {
            Some(column) => debug!(%metric, header = %column.header, "resolved capture column"),
            None => debug!(%metric, "capture column absent"),
        }
    }

    insert_results(tx, &results).await?;

    let summary = ImportSummary {
        run_id,
        rows: results.len(),
        frame_time_column: columns.frame_time.header.clone(),
        metrics: columns.resolved_metrics(),
        last_sample_time_ms: results.last().map(|r| r.sample_time_ms),
    };
    info!(
        run_id = summary.run_id,
        rows = summary.rows,
        metrics = summary.metrics.len(),
        "Imported capture results"
    );
    Ok(summary)
}

/// Writes every row with a single `INSERT ... SELECT FROM UNNEST(...)`, one
/// array parameter per column, so the batch size is not bound by the
/// protocol's parameter limit.
pub async fn insert_results(
    tx: &mut Transaction<'_, Postgres>,
    results: &[FrameResult],
) -> Result<u64> {
    if results.is_empty() {
        return Ok(0);
    }

    let floats = |get: fn(&FrameResult) -> Option<f64>| -> Vec<Option<f64>> {
        results.iter().map(get).collect()
    };
    let fans = |get: fn(&FrameResult) -> Option<i32>| -> Vec<Option<i32>> {
        results.iter().map(get).collect()
    };

    let run_ids: Vec<i32> = results.iter().map(|r| r.run_id).collect();
    let sample_times: Vec<i32> = results.iter().map(|r| r.sample_time_ms).collect();
    let frame_times: Vec<f64> = results.iter().map(|r| r.frame_time).collect();
    let memory_used: Vec<Option<i64>> = results.iter().map(|r| r.gpu_memory_size_used).collect();

    let inserted = sqlx::query(
        r#"
            INSERT INTO results (
                run_id, sample_time_ms, frame_time,
                cpu_busy, cpu_wait, gpu_latency, gpu_time, gpu_busy, gpu_wait, display_latency,
                gpu_power, gpu_voltage, gpu_frequency, gpu_temperature, gpu_utilization,
                gpu_memory_frequency, gpu_memory_size_used,
                gpu_fan_speed_0, gpu_fan_speed_1, gpu_fan_speed_2, gpu_fan_speed_3,
                cpu_utilization, cpu_power, cpu_temperature, cpu_frequency
            )
            SELECT * FROM UNNEST(
                $1::INTEGER[], $2::INTEGER[], $3::DOUBLE PRECISION[],
                $4::DOUBLE PRECISION[], $5::DOUBLE PRECISION[], $6::DOUBLE PRECISION[],
                $7::DOUBLE PRECISION[], $8::DOUBLE PRECISION[], $9::DOUBLE PRECISION[],
                $10::DOUBLE PRECISION[],
                $11::DOUBLE PRECISION[], $12::DOUBLE PRECISION[], $13::DOUBLE PRECISION[],
                $14::DOUBLE PRECISION[], $15::DOUBLE PRECISION[],
                $16::DOUBLE PRECISION[], $17::BIGINT[],
                $18::INTEGER[], $19::INTEGER[], $20::INTEGER[], $21::INTEGER[],
                $22::DOUBLE PRECISION[], $23::DOUBLE PRECISION[], $24::DOUBLE PRECISION[],
                $25::DOUBLE PRECISION[]
            )
        "#,
    )
    .bind(run_ids)
    .bind(sample_times)
    .bind(frame_times)
    .bind(floats(|r| r.cpu_busy))
    .bind(floats(|r| r.cpu_wait))
    .bind(floats(|r| r.gpu_latency))
    .bind(floats(|r| r.gpu_time))
    .bind(floats(|r| r.gpu_busy))
    .bind(floats(|r| r.gpu_wait))
    .bind(floats(|r| r.display_latency))
    .bind(floats(|r| r.gpu_power))
    .bind(floats(|r| r.gpu_voltage))
    .bind(floats(|r| r.gpu_frequency))
    .bind(floats(|r| r.gpu_temperature))
    .bind(floats(|r| r.gpu_utilization))
    .bind(floats(|r| r.gpu_memory_frequency))
    .bind(memory_used)
    .bind(fans(|r| r.gpu_fan_speed_0))
    .bind(fans(|r| r.gpu_fan_speed_1))
    .bind(fans(|r| r.gpu_fan_speed_2))
    .bind(fans(|r| r.gpu_fan_speed_3))
    .bind(floats(|r| r.cpu_utilization))
    .bind(floats(|r| r.cpu_power))
    .bind(floats(|r| r.cpu_temperature))
    .bind(floats(|r| r.cpu_frequency))
    .execute(&mut **tx)
    .await?
    .rows_affected();

    Ok(inserted)
}
