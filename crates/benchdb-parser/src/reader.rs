use std::io::Read;

use csv::{ReaderBuilder, StringRecord};

use crate::aliases::{AliasTable, ColumnMap, ResolvedColumn};
use crate::errors::CaptureError;
use crate::model::{FrameResult, MetricKind, MetricValue};

/// Output of one parse pass: the resolved header layout plus one normalized
/// row per data line, in file order.
#[derive(Debug, Clone)]
pub struct ParsedCapture {
    pub columns: ColumnMap,
    pub results: Vec<FrameResult>,
}

impl ParsedCapture {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn last_sample_time_ms(&self) -> Option<i32> {
        self.results.last().map(|result| result.sample_time_ms)
    }
}

/// Running sum of frame-time deltas. Sample keys are the sum rounded to the
/// nearest millisecond, ties away from zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameClock {
    elapsed_ms: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Adds `frame_time_ms` and returns the new sample key, or `None` once the
    /// key no longer fits the INTEGER column.
    pub fn advance(&mut self, frame_time_ms: f64) -> Option<i32> {
        self.elapsed_ms += frame_time_ms;
        let rounded = self.elapsed_ms.round();
        if rounded > f64::from(i32::MAX) {
            None
        } else {
            Some(rounded as i32)
        }
    }
}

pub fn parse_capture_str(
    content: &str,
    run_id: i32,
    aliases: &AliasTable,
) -> Result<ParsedCapture, CaptureError> {
    parse_capture(content.as_bytes(), run_id, aliases)
}

/// Parses a PresentMon-style CSV export into rows keyed to `run_id`.
///
/// Fails on a missing or malformed frame-time value; any other cell that is
/// empty or not numeric leaves its field unset for that row.
pub fn parse_capture<R: Read>(
    reader: R,
    run_id: i32,
    aliases: &AliasTable,
) -> Result<ParsedCapture, CaptureError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let header = reader.headers().map_err(CaptureError::csv)?.clone();
    let columns = aliases.resolve(&header)?;

    let mut clock = FrameClock::new();
    let mut results = Vec::new();
    let mut record = StringRecord::new();
    let mut row = 0usize;

    while reader.read_record(&mut record).map_err(CaptureError::csv)? {
        row += 1;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);

        let frame_time = parse_frame_time(&record, &columns.frame_time, row, line)?;
        let sample_time_ms =
            clock
                .advance(frame_time)
                .ok_or_else(|| CaptureError::SampleTimeOverflow {
                    row,
                    line,
                    accumulated_ms: clock.elapsed_ms(),
                })?;

        let mut result = FrameResult::new(run_id, sample_time_ms, frame_time);
        for column in &columns.metrics {
            let raw = record.get(column.index).unwrap_or("");
            if let Some(value) = parse_metric_value(column.metric.kind(), raw) {
                result.set(column.metric, value);
            }
        }
        results.push(result);
    }

    Ok(ParsedCapture { columns, results })
}

fn parse_frame_time(
    record: &StringRecord,
    column: &ResolvedColumn,
    row: usize,
    line: u64,
) -> Result<f64, CaptureError> {
    let raw = record.get(column.index).unwrap_or("").trim();
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(CaptureError::MalformedMandatoryValue {
            row,
            line,
            column: column.header.clone(),
            value: raw.to_string(),
        }),
    }
}

fn parse_metric_value(kind: MetricKind, raw: &str) -> Option<MetricValue> {
    match kind {
        MetricKind::Float => parse_optional_f64(raw).map(MetricValue::Float),
        MetricKind::BigInteger => parse_optional_i64(raw).map(MetricValue::BigInteger),
        MetricKind::Integer => parse_optional_i64(raw)
            .and_then(|value| i32::try_from(value).ok())
            .map(MetricValue::Integer),
    }
}

fn parse_optional_f64(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Integral text parses directly; float text such as `1450.0` is rounded.
fn parse_optional_i64(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    parse_optional_f64(trimmed)
        .map(f64::round)
        .filter(|value| *value >= i64::MIN as f64 && *value < i64::MAX as f64)
        .map(|value| value as i64)
}
