use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Name of the file produced by every table export.
pub const EXPORT_FILE_NAME: &str = "table.xlsx";
/// MIME type the exported buffer is handed over with.
pub const EXPORT_MIME_TYPE: &str = "application/octet-stream";
/// The exported workbook always has a single sheet with this name.
pub const SHEET_NAME: &str = "Table";
/// Width applied to any column holding at least one fact value.
pub const FACT_COLUMN_WIDTH: f64 = 18.0;
pub const FACT_NUMBER_FORMAT: &str = "#,##0";
/// Font colour for static (untagged) text.
pub const STATIC_FONT_COLOR: u32 = 0x707070;

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub taxonomy_path: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            taxonomy_path: None,
        }
    }
}

impl ExportConfig {
    pub fn from_env() -> Result<Self> {
        let output_dir = PathBuf::from(
            std::env::var("IXVIEWER_OUTPUT_DIR").unwrap_or_else(|_| ".".to_string()),
        );
        if output_dir.as_os_str().is_empty() {
            return Err(anyhow!("IXVIEWER_OUTPUT_DIR is set but empty"));
        }

        let taxonomy_path = std::env::var("IXVIEWER_TAXONOMY").ok().map(PathBuf::from);

        Ok(Self {
            output_dir,
            taxonomy_path,
        })
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        self
    }

    pub fn export_path(&self) -> PathBuf {
        self.output_dir.join(EXPORT_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_override() {
        let config = ExportConfig::default().with_output_dir(Some(PathBuf::from("out")));
        assert_eq!(config.export_path(), PathBuf::from("out").join("table.xlsx"));

        let config = ExportConfig::default().with_output_dir(None);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }
}
