//! In-memory view of one reporting sheet.
//!
//! Column 0 of every row is the label column; value columns are addressed by
//! their position relative to it, the same way the reporting tables are read
//! once header rows and empty margins are gone.

use crate::model::Scalar;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Text cell, or `Empty` when the text is blank.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content. Text and blanks are Missing.
    pub fn to_scalar(&self) -> Scalar {
        match self {
            Self::Number(v) => Scalar::from(Some(*v)),
            _ => Scalar::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Label text. Blank and numeric labels count as absent.
    pub fn label(&self) -> Option<&str> {
        self.cells.first().and_then(Cell::as_text)
    }

    /// Cell at `column`, `Empty` past the end of the row.
    pub fn cell(&self, column: usize) -> &Cell {
        self.cells.get(column).unwrap_or(&EMPTY)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Footnote rows start with an opening parenthesis.
    pub fn is_footnote(&self) -> bool {
        self.label().is_some_and(|l| l.trim_start().starts_with('('))
    }
}

/// How to cut a table out of a raw sheet grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableShape {
    /// Leading rows consumed as headers.
    pub skip_rows: usize,
    /// Inclusive sheet column window, 0-based.
    pub columns: Option<(usize, usize)>,
    /// Drop rows and columns that are entirely empty.
    pub compact: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    name: String,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self { name: name.into(), rows }
    }

    /// Build a table from a sheet-absolute grid (row 0 is sheet row 1).
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<Cell>>, shape: &TableShape) -> Self {
        let mut rows: Vec<Vec<Cell>> = grid
            .into_iter()
            .skip(shape.skip_rows)
            .map(|row| match shape.columns {
                Some((first, last)) => {
                    (first..=last).map(|c| row.get(c).cloned().unwrap_or_default()).collect()
                }
                None => row,
            })
            .collect();

        if shape.compact {
            rows.retain(|row| row.iter().any(|c| !c.is_empty()));
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            let keep: Vec<usize> = (0..width)
                .filter(|&c| rows.iter().any(|r| r.get(c).is_some_and(|cell| !cell.is_empty())))
                .collect();
            rows = rows
                .into_iter()
                .map(|row| keep.iter().map(|&c| row.get(c).cloned().unwrap_or_default()).collect())
                .collect();
        }

        Self::new(name, rows.into_iter().map(Row::new).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn without_footnotes(mut self) -> Self {
        self.rows.retain(|row| !row.is_footnote());
        self
    }

    /// Drop every row from the first one whose label contains `marker`
    /// (case-insensitive). Returns false, leaving the table untouched, when
    /// no row carries the marker.
    pub fn truncate_before(&mut self, marker: &str) -> bool {
        let marker = marker.to_lowercase();
        let cut = self
            .rows
            .iter()
            .position(|row| row.label().is_some_and(|l| l.to_lowercase().contains(&marker)));
        match cut {
            Some(index) => {
                self.rows.truncate(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Cell {
        Cell::text(s)
    }

    fn n(v: f64) -> Cell {
        Cell::Number(v)
    }

    #[test]
    fn blank_text_is_empty() {
        assert_eq!(Cell::text("   "), Cell::Empty);
        assert_eq!(Row::new(vec![Cell::text(" ")]).label(), None);
        assert_eq!(Row::new(vec![n(4.0)]).label(), None);
    }

    #[test]
    fn text_value_is_missing() {
        assert!(t("NO").to_scalar().is_missing());
        assert_eq!(n(-2.0).to_scalar(), Scalar::Reported(-2.0));
    }

    #[test]
    fn from_grid_compacts_empty_margins() {
        let grid = vec![
            vec![t("TABLE 4.Gs1"), Cell::Empty, Cell::Empty],
            vec![Cell::Empty, Cell::Empty, Cell::Empty],
            vec![Cell::Empty, t("Total HWP"), n(1.0), Cell::Empty, n(2.0)],
            vec![Cell::Empty, t("Solid wood"), n(3.0), Cell::Empty, n(4.0)],
        ];
        let shape = TableShape { skip_rows: 1, columns: None, compact: true };
        let table = Table::from_grid("Table4.Gs1", grid, &shape);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].label(), Some("Total HWP"));
        assert_eq!(table.rows()[0].cell(1), &n(1.0));
        assert_eq!(table.rows()[0].cell(2), &n(2.0));
        assert_eq!(table.rows()[1].cell(9), &Cell::Empty);
    }

    #[test]
    fn from_grid_column_window_keeps_positions() {
        let grid = vec![
            vec![t("header")],
            vec![Cell::Empty, t("Cropland"), Cell::Empty, n(7.0)],
        ];
        let shape = TableShape { skip_rows: 1, columns: Some((1, 3)), compact: false };
        let table = Table::from_grid("Table4.1", grid, &shape);
        assert_eq!(table.rows()[0].cells(), &[t("Cropland"), Cell::Empty, n(7.0)]);
    }

    #[test]
    fn footnotes_removed() {
        let table = Table::new(
            "x",
            vec![
                Row::new(vec![t("Total HWP")]),
                Row::new(vec![t(" (1) Note")]),
                Row::new(vec![t("Other (see note)")]),
            ],
        )
        .without_footnotes();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].label(), Some("Other (see note)"));
    }

    #[test]
    fn truncate_before_marker() {
        let mut table = Table::new(
            "x",
            vec![
                Row::new(vec![t("Total")]),
                Row::new(vec![t("Solid wood")]),
                Row::new(vec![t("HWP produced and EXPORTED")]),
                Row::new(vec![t("Total")]),
            ],
        );
        assert!(table.truncate_before("exported"));
        assert_eq!(table.len(), 2);
        assert!(!table.truncate_before("exported"));
        assert_eq!(table.len(), 2);
    }
}
