use crate::domain::model::{Fields, Record};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Access to a remote tabular store, scoped per call to one table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record in the table, across all pages.
    async fn list_all(&self, table: &str) -> Result<Vec<Record>>;
    async fn create(&self, table: &str, fields: Fields) -> Result<Record>;
    /// Partial update: fields not named are left as they are.
    async fn update(&self, table: &str, id: &str, fields: Fields) -> Result<Record>;
    async fn delete(&self, table: &str, id: &str) -> Result<()>;
}
