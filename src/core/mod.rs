pub mod export;
pub mod projector;

pub use crate::domain::model::{FieldValue, Fields, Record, TableConfig};
pub use crate::domain::ports::RecordStore;
pub use crate::utils::error::Result;
