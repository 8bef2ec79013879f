//! In-memory workbook source shared by the engine tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use invgrid_recon::{
    resolve_sheet_name, Cell, LoadedTable, SourceError, Table, TableShape, WorkbookRef,
    WorkbookSource,
};

pub type Grid = Vec<Vec<Cell>>;

#[derive(Default)]
pub struct MemorySource {
    /// country -> file name -> sheet name -> grid
    books: BTreeMap<String, BTreeMap<String, BTreeMap<String, Grid>>>,
    unreadable: Vec<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, country: &str, file: &str, sheet: &str, grid: Grid) -> Self {
        self.books
            .entry(country.to_string())
            .or_default()
            .entry(file.to_string())
            .or_default()
            .insert(sheet.to_string(), grid);
        self
    }

    pub fn with_unreadable(mut self, country: &str, file: &str) -> Self {
        self.books.entry(country.to_string()).or_default().entry(file.to_string()).or_default();
        self.unreadable.push(file.to_string());
        self
    }
}

impl WorkbookSource for MemorySource {
    fn workbooks(&self, country: &str) -> Result<Vec<WorkbookRef>, SourceError> {
        Ok(self
            .books
            .get(country)
            .map(|files| {
                files
                    .keys()
                    .map(|f| WorkbookRef::new(country, format!("/mem/{country}/{f}")))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn load_table(
        &self,
        workbook: &WorkbookRef,
        sheet: &str,
        shape: &TableShape,
    ) -> Result<LoadedTable, SourceError> {
        let file = workbook.file_name();
        if self.unreadable.contains(&file) {
            return Err(SourceError::Unreadable(format!("{file}: not a zip archive")));
        }
        let sheets = &self.books[&workbook.country][&file];
        let names: Vec<String> = sheets.keys().cloned().collect();
        let resolved = resolve_sheet_name(sheet, &names).ok_or_else(|| {
            SourceError::SheetNotFound { sheet: sheet.to_string(), available: names.clone() }
        })?;
        let grid = sheets[resolved].clone();
        Ok(LoadedTable {
            table: Table::from_grid(resolved, grid, shape),
            sheet: resolved.to_string(),
        })
    }
}

pub fn t(s: &str) -> Cell {
    Cell::text(s)
}

pub fn n(v: f64) -> Cell {
    Cell::Number(v)
}

/// HWP grid: one title row, then `(label, gains, losses)` rows.
pub fn hwp_grid(rows: &[(&str, f64, f64)]) -> Grid {
    let mut grid = vec![vec![t("TABLE 4.Gs1 SECTORAL BACKGROUND DATA FOR LULUCF")]];
    grid.extend(rows.iter().map(|(label, gains, losses)| vec![t(label), n(*gains), n(*losses)]));
    grid
}

/// Land transition grid: eight header rows, then one row per origin label
/// starting in column B, destination values in C..=K.
pub fn land_grid(rows: &[(&str, f64)]) -> Grid {
    let mut grid: Grid = (0..8).map(|_| vec![t("header")]).collect();
    for (label, base) in rows {
        let mut row = vec![Cell::Empty, t(label)];
        row.extend((0..9).map(|i| n(base + i as f64)));
        grid.push(row);
    }
    grid
}
