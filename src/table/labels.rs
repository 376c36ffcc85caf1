use serde::Serialize;

use super::aspects::{aspect_names, ConstantAspectSet};
use super::grid::{Cell, Grid};
use crate::report::Taxonomy;

/// Grid with synthesized aspect label rows and columns around the original cells.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelledGrid<'r> {
    pub grid: Grid<'r>,
    /// Number of header rows placed above the original rows.
    pub header_rows: usize,
    /// Number of label columns placed before the original columns.
    pub label_columns: usize,
    /// Column aspect names carried by every column that holds a fact.
    pub universal_column_aspects: Vec<String>,
}

/// Column aspect names present in every column that has a constant aspect set.
///
/// Columns without facts are skipped; an empty set still counts and
/// disqualifies every name.
pub fn universal_column_aspects<'r>(
    names: &[&'r str],
    column_sets: &[Option<ConstantAspectSet<'r>>],
) -> Vec<&'r str> {
    names
        .iter()
        .copied()
        .filter(|name| column_sets.iter().flatten().all(|set| set.contains(name)))
        .collect()
}

fn label_cell(set: Option<&ConstantAspectSet<'_>>, name: &str, taxonomy: &Taxonomy) -> Cell<'static> {
    let text = set
        .and_then(|s| s.get(name))
        .map(|aspect| aspect.display_label(taxonomy))
        .unwrap_or_default();
    Cell::AspectLabel { text }
}

/// Add one header row per column aspect and one label column per row aspect
/// not already expressed by a column.
///
/// Column aspects always suppress row labels of the same name; row aspects
/// never suppress column headers.
pub fn synthesize<'r>(
    grid: Grid<'r>,
    row_sets: &[Option<ConstantAspectSet<'r>>],
    column_sets: &[Option<ConstantAspectSet<'r>>],
    taxonomy: &Taxonomy,
) -> LabelledGrid<'r> {
    let column_names = aspect_names(column_sets);
    let universal = universal_column_aspects(&column_names, column_sets);
    let row_names: Vec<&str> = aspect_names(row_sets)
        .into_iter()
        .filter(|name| !column_names.contains(name))
        .collect();
    log::debug!(
        "Column aspects {:?} (universal {:?}), row aspects {:?}",
        column_names,
        universal,
        row_names
    );

    let width = grid.width();
    let mut rows: Vec<Vec<Cell<'r>>> = grid
        .into_rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let set = row_sets.get(i).and_then(Option::as_ref);
            let mut labelled: Vec<Cell<'r>> = row_names
                .iter()
                .map(|name| label_cell(set, name, taxonomy))
                .collect();
            labelled.extend(row);
            labelled
        })
        .collect();

    // Each header row goes on top, so the first aspect found ends up
    // closest to the data.
    for name in &column_names {
        let mut header: Vec<Cell<'r>> = row_names.iter().map(|_| Cell::empty()).collect();
        header.extend((0..width).map(|col| {
            let set = column_sets.get(col).and_then(Option::as_ref);
            label_cell(set, name, taxonomy)
        }));
        rows.insert(0, header);
    }

    LabelledGrid {
        grid: Grid::new(rows),
        header_rows: column_names.len(),
        label_columns: row_names.len(),
        universal_column_aspects: universal.into_iter().map(str::to_string).collect(),
    }
}
