pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod importer;

pub use benchdb_parser::{AliasTable, CaptureError, FrameResult, Metric};
