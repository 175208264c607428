use crate::core::projector::CsvProjector;
use crate::core::{RecordStore, TableConfig};
use crate::utils::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub table: String,
    pub path: PathBuf,
    pub records: usize,
    pub columns: usize,
}

/// Fetches whole tables from a store and writes each one as CSV.
pub struct TableExporter<R: RecordStore> {
    store: R,
    projector: CsvProjector,
}

impl<R: RecordStore> TableExporter<R> {
    pub fn new(store: R, projector: CsvProjector) -> Self {
        Self { store, projector }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub async fn export_table(&self, table: &TableConfig) -> Result<ExportSummary> {
        tracing::info!("Fetching records from table {}", table.name);
        let records = self.store.list_all(&table.name).await?;
        tracing::info!("Fetched {} records from {}", records.len(), table.name);

        let written = self.projector.project(&records, &table.filename)?;

        Ok(ExportSummary {
            table: table.name.clone(),
            path: written.path,
            records: written.rows,
            columns: written.columns.len(),
        })
    }

    /// Exports tables one after another, stopping at the first failure.
    pub async fn export_all(&self, tables: &[TableConfig]) -> Result<Vec<ExportSummary>> {
        let mut summaries = Vec::with_capacity(tables.len());
        for (index, table) in tables.iter().enumerate() {
            tracing::debug!("Export {}/{}: {}", index + 1, tables.len(), table.name);
            summaries.push(self.export_table(table).await?);
        }
        Ok(summaries)
    }
}
