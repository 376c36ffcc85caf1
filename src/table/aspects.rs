use itertools::Itertools;

use super::grid::{Cell, Grid};
use crate::report::{Aspect, Fact};

/// Aspects shared, with equal values, by every fact of one row or column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantAspectSet<'r> {
    aspects: Vec<&'r Aspect>,
}

impl<'r> ConstantAspectSet<'r> {
    pub fn get(&self, name: &str) -> Option<&'r Aspect> {
        self.aspects.iter().copied().find(|a| a.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Aspect names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &'r str> + '_ {
        self.aspects.iter().map(|a| a.name())
    }

    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }
}

/// Reduce a slice of cells to the aspects constant across its facts.
///
/// Returns `None` when the slice holds no fact at all; an empty set means the
/// facts share nothing.
pub fn reduce<'a, 'r: 'a>(
    slice: impl IntoIterator<Item = &'a Cell<'r>>,
) -> Option<ConstantAspectSet<'r>> {
    let facts: Vec<&'r Fact> = slice.into_iter().filter_map(Cell::fact).collect();
    let (&first, rest) = facts.split_first()?;

    let names: Vec<&'r str> = facts
        .iter()
        .flat_map(|&f| f.aspects().iter().map(Aspect::name))
        .unique()
        .collect();

    let aspects = names
        .into_iter()
        .filter_map(|name| {
            let value = first.aspect(name)?;
            rest.iter()
                .all(|f| f.aspect(name).is_some_and(|other| value.equal_to(other)))
                .then_some(value)
        })
        .collect();

    Some(ConstantAspectSet { aspects })
}

pub fn row_aspects<'r>(grid: &Grid<'r>) -> Vec<Option<ConstantAspectSet<'r>>> {
    grid.rows().iter().map(|row| reduce(row)).collect()
}

pub fn column_aspects<'r>(grid: &Grid<'r>) -> Vec<Option<ConstantAspectSet<'r>>> {
    (0..grid.width()).map(|col| reduce(grid.column(col))).collect()
}

/// Union of aspect names over a list of sets, in first-seen order.
pub fn aspect_names<'r>(sets: &[Option<ConstantAspectSet<'r>>]) -> Vec<&'r str> {
    sets.iter()
        .flatten()
        .flat_map(|set| set.names())
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact_cell(fact: &Fact) -> Cell<'_> {
        Cell::Fact {
            fact,
            negative: false,
            top_border: false,
            bottom_border: false,
        }
    }

    fn text(s: &str) -> Cell<'static> {
        Cell::Static {
            text: s.to_string(),
        }
    }

    #[test]
    fn test_shared_aspect_survives() {
        let f1 = Fact::new("f1", vec![Aspect::period("2023"), Aspect::concept("a:Cash")], 1.0);
        let f2 = Fact::new("f2", vec![Aspect::period("2023"), Aspect::concept("a:Debt")], 2.0);
        let slice = vec![text("Label"), fact_cell(&f1), fact_cell(&f2)];

        let set = reduce(&slice).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("period").map(Aspect::value), Some("2023"));
        assert!(!set.contains("concept"));
    }

    #[test]
    fn test_empty_slice_is_none() {
        let slice = vec![
            text("a"),
            Cell::AspectLabel {
                text: "b".to_string(),
            },
        ];
        assert!(reduce(&slice).is_none());
        assert!(reduce(&Vec::<Cell<'_>>::new()).is_none());
    }

    #[test]
    fn test_absent_aspect_disqualifies() {
        let f1 = Fact::new("f1", vec![Aspect::period("2023")], 1.0);
        let f2 = Fact::new("f2", vec![Aspect::period("2023"), Aspect::unit("USD")], 2.0);
        let f3 = Fact::new("f3", vec![Aspect::period("2023"), Aspect::unit("USD")], 3.0);

        let set = reduce(&vec![fact_cell(&f1), fact_cell(&f2)]).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["period"]);

        let set = reduce(&vec![fact_cell(&f2), fact_cell(&f1), fact_cell(&f3)]).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["period"]);
    }

    #[test]
    fn test_empty_value_differs_from_present_value() {
        let f1 = Fact::new("f1", vec![Aspect::unit("")], 1.0);
        let f2 = Fact::new("f2", vec![Aspect::unit("")], 2.0);
        let f3 = Fact::new("f3", vec![Aspect::unit("USD")], 3.0);

        let set = reduce(&vec![fact_cell(&f1), fact_cell(&f2)]).unwrap();
        assert_eq!(set.get("unit").map(Aspect::value), Some(""));

        let set = reduce(&vec![fact_cell(&f1), fact_cell(&f3)]).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_disjoint_aspects_give_empty_set() {
        let f1 = Fact::new("f1", vec![Aspect::period("2023")], 1.0);
        let f2 = Fact::new("f2", vec![Aspect::unit("USD")], 2.0);
        let set = reduce(&vec![fact_cell(&f1), fact_cell(&f2)]).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_single_fact_keeps_everything() {
        let f1 = Fact::new(
            "f1",
            vec![Aspect::concept("a:Cash"), Aspect::period("2023"), Aspect::unit("USD")],
            1.0,
        );
        let set = reduce(&vec![fact_cell(&f1)]).unwrap();
        assert_eq!(
            set.names().collect::<Vec<_>>(),
            vec!["concept", "period", "unit"]
        );
    }

    #[test]
    fn test_rows_and_columns() {
        let f1 = Fact::new("f1", vec![Aspect::period("2023"), Aspect::concept("a:Cash")], 1.0);
        let f2 = Fact::new("f2", vec![Aspect::period("2022"), Aspect::concept("a:Cash")], 2.0);
        let f3 = Fact::new("f3", vec![Aspect::period("2023"), Aspect::concept("a:Debt")], 3.0);
        let f4 = Fact::new("f4", vec![Aspect::period("2022"), Aspect::concept("a:Debt")], 4.0);
        let grid = Grid::new(vec![
            vec![text(""), text("2023"), text("2022")],
            vec![text("Cash"), fact_cell(&f1), fact_cell(&f2)],
            vec![text("Debt"), fact_cell(&f3), fact_cell(&f4)],
        ]);

        let rows = row_aspects(&grid);
        assert!(rows[0].is_none());
        assert_eq!(rows[1].as_ref().unwrap().get("concept").map(Aspect::value), Some("a:Cash"));
        assert!(!rows[2].as_ref().unwrap().contains("period"));

        let cols = column_aspects(&grid);
        assert_eq!(cols.len(), 3);
        assert!(cols[0].is_none());
        assert_eq!(cols[1].as_ref().unwrap().get("period").map(Aspect::value), Some("2023"));
        assert_eq!(cols[2].as_ref().unwrap().get("period").map(Aspect::value), Some("2022"));

        assert_eq!(aspect_names(&rows), vec!["concept"]);
        assert_eq!(aspect_names(&cols), vec!["period"]);
    }
}
