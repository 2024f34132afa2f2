use thiserror::Error;

use crate::model::Metric;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture header has no {metric} column; looked for {aliases:?}")]
    MissingMandatoryColumn {
        metric: Metric,
        aliases: Vec<String>,
    },

    #[error("data row {row} (line {line}) column '{column}': invalid frame time '{value}'")]
    MalformedMandatoryValue {
        row: usize,
        line: u64,
        column: String,
        value: String,
    },

    #[error("data row {row} (line {line}): accumulated time {accumulated_ms} ms exceeds the sample key range")]
    SampleTimeOverflow {
        row: usize,
        line: u64,
        accumulated_ms: f64,
    },

    #[error("CSV error at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },
}

impl CaptureError {
    pub(crate) fn csv(source: csv::Error) -> Self {
        let line = source.position().map(|pos| pos.line()).unwrap_or(0);
        CaptureError::Csv { line, source }
    }
}
