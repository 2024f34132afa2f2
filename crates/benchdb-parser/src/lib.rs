pub mod aliases;
pub mod errors;
pub mod model;
mod reader;

pub use aliases::{AliasTable, ColumnMap, ResolvedColumn};
pub use errors::CaptureError;
pub use model::{FrameResult, Metric, MetricKind, MetricValue};
pub use reader::{parse_capture, parse_capture_str, FrameClock, ParsedCapture};

#[cfg(test)]
mod tests;
