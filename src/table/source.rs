use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use super::style::{is_displayed, BorderStyles};
use super::tree::{fact_id_of, CellTree};

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("static selector"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("static selector"));

/// One displayed cell of a source table.
#[derive(Debug, Clone, Default)]
pub struct SourceCell {
    /// Raw `colspan` attribute, validated during extraction.
    pub colspan: Option<String>,
    pub content: CellTree,
    pub border_top: Option<String>,
    pub border_bottom: Option<String>,
}

impl SourceCell {
    pub fn from_element(cell: ElementRef<'_>) -> Self {
        let borders = BorderStyles::from_element(cell);
        Self {
            colspan: cell.value().attr("colspan").map(str::to_string),
            content: CellTree::from_element(cell),
            border_top: borders.top,
            border_bottom: borders.bottom,
        }
    }

    pub fn text(&self) -> String {
        self.content.text()
    }
}

pub type SourceRow = Vec<SourceCell>;

/// Rows of displayed cells, in document order.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn from_element(table: ElementRef<'_>) -> Self {
        let rows = table
            .select(&ROW_SELECTOR)
            .map(|tr| {
                tr.select(&CELL_SELECTOR)
                    .filter(|cell| is_displayed(*cell))
                    .map(SourceCell::from_element)
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A table qualifies for export when it holds at least one fact element.
pub fn has_fact_elements(table: ElementRef<'_>) -> bool {
    table
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|e| fact_id_of(e).is_some())
}
