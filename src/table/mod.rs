pub mod aspects;
pub mod grid;
pub mod labels;
pub mod source;
pub mod style;
pub mod tree;
pub mod workbook;

use anyhow::Result;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::path::PathBuf;

pub use aspects::{column_aspects, reduce, row_aspects, ConstantAspectSet};
pub use grid::{extract_grid, Cell, Grid};
pub use labels::{synthesize, LabelledGrid};
pub use source::{SourceCell, SourceTable};
pub use workbook::{Blob, DirectorySink, SaveSink, WorkbookWriter};

use crate::report::Report;

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("static selector"));

/// One exportable table of a document.
#[derive(Debug, Clone)]
pub struct TableExport {
    /// Position among all `<table>` elements of the document.
    pub index: usize,
    pub table: SourceTable,
}

impl TableExport {
    /// Every table holding at least one fact element, in document order.
    pub fn discover(document: &Html) -> Vec<TableExport> {
        let tables: Vec<TableExport> = document
            .select(&TABLE_SELECTOR)
            .enumerate()
            .filter(|(_, table)| source::has_fact_elements(*table))
            .map(|(index, table)| TableExport {
                index,
                table: SourceTable::from_element(table),
            })
            .collect();
        log::debug!("Found {} exportable tables", tables.len());
        tables
    }

    pub fn grid<'r>(&self, report: &'r Report) -> Grid<'r> {
        extract_grid(&self.table, report)
    }

    /// Extract, reduce and label this table.
    pub fn build<'r>(&self, report: &'r Report) -> LabelledGrid<'r> {
        let grid = self.grid(report);
        let row_sets = row_aspects(&grid);
        let column_sets = column_aspects(&grid);
        synthesize(grid, &row_sets, &column_sets, report.taxonomy())
    }

    /// Run the whole pipeline and hand the workbook to `sink`.
    pub async fn export(&self, report: &Report, sink: &dyn SaveSink) -> Result<PathBuf> {
        let labelled = self.build(report);
        log::info!(
            "Exporting table {}: {} rows x {} columns ({} header rows, {} label columns)",
            self.index,
            labelled.grid.height(),
            labelled.grid.width(),
            labelled.header_rows,
            labelled.label_columns
        );
        let blob = WorkbookWriter::new().write(&labelled.grid)?;
        sink.save(blob).await
    }
}
