use serde::{Serialize, Serializer};

use super::source::{SourceCell, SourceTable};
use super::style::is_ruled;
use super::tree::{is_negative_hint, preceding_text, CellTree};
use crate::report::{Fact, Report};

/// Upper bound on a single colspan, as browsers clamp it.
const MAX_COLSPAN: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Cell<'r> {
    Static {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Fact {
        #[serde(serialize_with = "serialize_fact_id")]
        fact: &'r Fact,
        negative: bool,
        top_border: bool,
        bottom_border: bool,
    },
    AspectLabel {
        text: String,
    },
}

impl<'r> Cell<'r> {
    pub fn empty() -> Self {
        Cell::Static {
            text: String::new(),
        }
    }

    pub fn fact(&self) -> Option<&'r Fact> {
        match self {
            Cell::Fact { fact, .. } => Some(*fact),
            _ => None,
        }
    }

    pub fn is_fact(&self) -> bool {
        matches!(self, Cell::Fact { .. })
    }
}

fn serialize_fact_id<S: Serializer>(fact: &&Fact, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(fact.id())
}

/// Rows of cells in document order; rectangular once extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Grid<'r> {
    rows: Vec<Vec<Cell<'r>>>,
}

impl<'r> Grid<'r> {
    pub fn new(rows: Vec<Vec<Cell<'r>>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell<'r>>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Cell<'r>>> {
        self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell<'r>> {
        self.rows.get(row)?.get(col)
    }

    /// Cells of column `col`, top to bottom. Short rows are skipped.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &Cell<'r>> {
        self.rows.iter().filter_map(move |row| row.get(col))
    }

    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.rows.iter().all(|row| row.len() == width)
    }

    pub fn fact_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_fact()).count()
    }
}

/// Build a rectangular grid from a source table, resolving bound facts
/// through `report`.
pub fn extract_grid<'r>(table: &SourceTable, report: &'r Report) -> Grid<'r> {
    let mut rows = Vec::with_capacity(table.rows.len());
    for source_row in &table.rows {
        let mut row = Vec::with_capacity(source_row.len());
        for source_cell in source_row {
            let span = parse_span(source_cell.colspan.as_deref());
            row.extend((1..span).map(|_| Cell::empty()));
            row.push(extract_cell(source_cell, report));
        }
        rows.push(row);
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize_with(width, Cell::empty);
    }
    Grid::new(rows)
}

fn extract_cell<'r>(cell: &SourceCell, report: &'r Report) -> Cell<'r> {
    if let Some((node, fact_id)) = cell.content.bound_element() {
        match report.get_fact_by_id(fact_id) {
            Some(fact) => {
                let text = preceding_text(&cell.content, node, CellTree::ROOT);
                return Cell::Fact {
                    fact,
                    negative: is_negative_hint(&text),
                    top_border: is_ruled(cell.border_top.as_deref()),
                    bottom_border: is_ruled(cell.border_bottom.as_deref()),
                };
            }
            None => log::debug!("Fact {} not found in report, keeping cell as text", fact_id),
        }
    }
    Cell::Static { text: cell.text() }
}

fn parse_span(colspan: Option<&str>) -> usize {
    let Some(raw) = colspan else {
        return 1;
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => usize::try_from(n).map_or(MAX_COLSPAN, |n| n.min(MAX_COLSPAN)),
        _ => {
            log::debug!("Ignoring malformed colspan {:?}", raw);
            1
        }
    }
}
