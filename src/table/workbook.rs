use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::grid::{Cell, Grid};
use crate::core::config::{
    EXPORT_FILE_NAME, EXPORT_MIME_TYPE, FACT_COLUMN_WIDTH, FACT_NUMBER_FORMAT, SHEET_NAME,
    STATIC_FONT_COLOR,
};
use crate::report::FactValue;
use crate::utils::dirs::ensure_dir;

/// Serialized workbook ready to be handed to a [`SaveSink`].
#[derive(Debug, Clone)]
pub struct Blob {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait SaveSink: Send + Sync {
    /// Persist the blob, returning where it ended up.
    async fn save(&self, blob: Blob) -> Result<PathBuf>;
}

/// Writes blobs into a directory, creating it on demand. An existing file
/// with the same name is replaced.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SaveSink for DirectorySink {
    async fn save(&self, blob: Blob) -> Result<PathBuf> {
        ensure_dir(&self.dir).await?;
        let path = self.dir.join(&blob.file_name);
        tokio::fs::write(&path, &blob.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!(
            "Saved {} ({} bytes, {})",
            path.display(),
            blob.bytes.len(),
            blob.mime_type
        );
        Ok(path)
    }
}

/// Renders a labelled grid as a single sheet workbook.
pub struct WorkbookWriter {
    fact_format: Format,
    static_format: Format,
    label_format: Format,
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self {
            fact_format: Format::new().set_num_format(FACT_NUMBER_FORMAT),
            static_format: Format::new().set_font_color(Color::RGB(STATIC_FONT_COLOR)),
            label_format: Format::new(),
        }
    }

    /// Build the workbook and serialize it to an in-memory buffer.
    pub fn write(&self, grid: &Grid<'_>) -> Result<Blob> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        let mut fact_columns = BTreeSet::new();
        for (row_idx, row) in grid.rows().iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                if cell.is_fact() {
                    fact_columns.insert(col_idx);
                }
                self.write_cell(worksheet, row_idx, col_idx, cell)?;
            }
        }
        for col_idx in fact_columns {
            worksheet.set_column_width(cast_col_num(col_idx)?, FACT_COLUMN_WIDTH)?;
        }

        let bytes = workbook
            .save_to_buffer()
            .context("Failed to serialize workbook")?;
        Ok(Blob {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime_type: EXPORT_MIME_TYPE.to_string(),
            bytes,
        })
    }

    fn write_cell(
        &self,
        worksheet: &mut Worksheet,
        row_idx: usize,
        col_idx: usize,
        cell: &Cell<'_>,
    ) -> Result<()> {
        let row = cast_row_num(row_idx)?;
        let col = cast_col_num(col_idx)?;
        match cell {
            Cell::Fact {
                fact,
                negative,
                top_border,
                bottom_border,
            } => {
                let mut format = self.fact_format.clone();
                if *top_border {
                    format = format
                        .set_border_top(FormatBorder::Medium)
                        .set_border_top_color(Color::Black);
                }
                if *bottom_border {
                    format = format
                        .set_border_bottom(FormatBorder::Medium)
                        .set_border_bottom_color(Color::Black);
                }
                match fact.value() {
                    FactValue::Numeric(value) => {
                        worksheet.write_number_with_format(
                            row,
                            col,
                            presentation_value(*value, *negative),
                            &format,
                        )?;
                    }
                    FactValue::Text(text) => {
                        worksheet.write_string_with_format(row, col, text, &format)?;
                    }
                }
            }
            Cell::AspectLabel { text } => {
                self.write_text(worksheet, row, col, text, &self.label_format)?;
            }
            Cell::Static { text } => {
                self.write_text(worksheet, row, col, text, &self.static_format)?;
            }
        }
        Ok(())
    }

    /// Empty text becomes a blank cell that still carries `format`.
    fn write_text(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        text: &str,
        format: &Format,
    ) -> Result<()> {
        if text.is_empty() {
            worksheet.write_blank(row, col, format)?;
        } else {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
        Ok(())
    }
}

/// The stored sign is discarded; the document's presentation decides it.
pub fn presentation_value(value: f64, negative: bool) -> f64 {
    if negative {
        -value.abs()
    } else {
        value.abs()
    }
}

fn cast_row_num(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("row index overflow: {}", value))
}

fn cast_col_num(value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| anyhow!("column index overflow: {}", value))
}
