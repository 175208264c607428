pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{CliConfig, Command};

pub use crate::adapters::AirtableClient;
pub use crate::config::{manifest::ExportManifest, AirtableConfig};
pub use crate::core::{
    export::{ExportSummary, TableExporter},
    projector::{CsvProjector, WrittenFile},
    FieldValue, Fields, Record, RecordStore, TableConfig,
};
pub use crate::utils::error::{ExportError, Result};
