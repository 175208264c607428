//! Projection of a batch of records into one CSV table.
//!
//! The header is `id,createdTime` followed by every field key seen in the
//! batch, in first-seen order. The file is written to a temporary sibling and
//! renamed over the destination, so a failed run never leaves a half-written
//! CSV behind and never clobbers the previous export.

use crate::core::Record;
use crate::utils::error::{ExportError, Result};
use indexmap::IndexSet;
use path_absolutize::Absolutize;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const ID_COLUMN: &str = "id";
pub const CREATED_TIME_COLUMN: &str = "createdTime";

/// What a successful projection wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CsvProjector {
    project_root: PathBuf,
}

impl CsvProjector {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Writes `records` as CSV to `output_path` and returns what was written.
    ///
    /// Relative paths are taken from the project root. Paths that resolve
    /// outside the root fail with `PathSafetyError` before anything touches
    /// the filesystem.
    pub fn project(&self, records: &[Record], output_path: &str) -> Result<WrittenFile> {
        let path = self.resolve_output_path(output_path)?;

        let parent = path.parent().ok_or_else(|| ExportError::PathSafetyError {
            path: path.clone(),
            root: self.project_root.clone(),
        })?;
        fs::create_dir_all(parent).map_err(|e| ExportError::io("create directory", parent, e))?;

        let columns = discover_columns(records);
        tracing::debug!(
            "Projecting {} records into {} dynamic columns",
            records.len(),
            columns.len()
        );

        let temp = temp_file_for(&path, parent)
            .map_err(|e| ExportError::io("create temporary file in", parent, e))?;
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(temp);

        let csv_err = |source: csv::Error| ExportError::CsvError {
            path: path.clone(),
            source,
        };

        writer
            .write_record(
                [ID_COLUMN, CREATED_TIME_COLUMN]
                    .into_iter()
                    .chain(columns.iter().map(String::as_str)),
            )
            .map_err(csv_err)?;

        for record in records {
            writer.write_record(row_for(record, &columns)).map_err(csv_err)?;
        }

        let temp = writer
            .into_inner()
            .map_err(|e| ExportError::io("flush", &path, e.into_error()))?;
        temp.persist(&path)
            .map_err(|e| ExportError::io("replace", &path, e.error))?;

        tracing::info!("Data saved to {}", path.display());
        Ok(WrittenFile {
            path,
            rows: records.len(),
            columns,
        })
    }

    /// Absolute form of `output_path`, provided it names a file strictly inside the project root.
    pub fn resolve_output_path(&self, output_path: &str) -> Result<PathBuf> {
        let root = self
            .project_root
            .absolutize()
            .map_err(|e| ExportError::io("resolve project root", &self.project_root, e))?
            .to_path_buf();

        let resolved = Path::new(output_path)
            .absolutize_from(&root)
            .map_err(|e| ExportError::io("resolve output path", output_path, e))?
            .to_path_buf();

        // Component-wise, so /data/out2 is not accepted under /data/out.
        if resolved == root || !resolved.starts_with(&root) || is_symlink(&resolved) {
            tracing::warn!(
                "Rejected output path {} outside {}",
                output_path,
                root.display()
            );
            return Err(ExportError::PathSafetyError {
                path: resolved,
                root,
            });
        }

        Ok(resolved)
    }
}

/// Union of field keys across all records, in first-seen order.
///
/// Keys equal to the fixed `id`/`createdTime` columns are left out; those
/// columns always carry the record metadata.
pub fn discover_columns(records: &[Record]) -> Vec<String> {
    let mut columns: IndexSet<&str> = IndexSet::new();
    let mut shadowed: IndexSet<&str> = IndexSet::new();

    for record in records {
        for key in record.fields.keys() {
            if key == ID_COLUMN || key == CREATED_TIME_COLUMN {
                shadowed.insert(key);
            } else {
                columns.insert(key);
            }
        }
    }

    if !shadowed.is_empty() {
        tracing::warn!(
            "Dropping fields that collide with metadata columns: {:?}",
            shadowed
        );
    }

    columns.into_iter().map(str::to_string).collect()
}

fn row_for(record: &Record, columns: &[String]) -> Vec<String> {
    let mut row = Vec::with_capacity(columns.len() + 2);
    row.push(record.id.clone());
    row.push(record.created_time.clone());
    row.extend(columns.iter().map(|column| {
        record
            .fields
            .get(column)
            .map(|value| value.to_cell())
            .unwrap_or_default()
    }));
    row
}

/// Temporary sibling of `target` that ends up with the mode a plain write would give:
/// the existing file's permissions, or `0o666` under the process umask.
fn temp_file_for(target: &Path, parent: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let temp = builder.tempfile_in(parent)?;

    if let Ok(existing) = fs::metadata(target) {
        temp.as_file().set_permissions(existing.permissions())?;
    }
    Ok(temp)
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}
