use crate::domain::model::TableConfig;
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A list of tables to export in one run.
///
/// ```toml
/// [[tables]]
/// name = "Tasks"
/// filename = "exports/${EXPORT_PREFIX}tasks.csv"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    pub tables: Vec<TableConfig>,
}

impl ExportManifest {
    /// 從 TOML 檔案載入
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExportError::io("read manifest", path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let manifest: Self =
            toml::from_str(&processed_content).map_err(|e| ExportError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// 替換環境變數 (例如 ${EXPORT_DIR})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ExportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for ExportManifest {
    fn validate(&self) -> Result<()> {
        if self.tables.is_empty() {
            return Err(ExportError::ConfigValidationError {
                field: "tables".to_string(),
                message: "At least one [[tables]] entry is required".to_string(),
            });
        }

        for table in &self.tables {
            validate_non_empty_string("tables.name", &table.name)?;
            validate_path("tables.filename", &table.filename)?;
        }

        let filenames: Vec<&str> = self.tables.iter().map(|t| t.filename.as_str()).collect();
        validate_file_extensions("tables.filename", &filenames, &["csv"])?;

        Ok(())
    }
}
