// Excel reading (calamine) and writing (rust_xlsxwriter)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};

use invgrid_recon::{resolve_sheet_name, Cell, SourceError};

use crate::error::IoError;
use crate::render::{render, OutCell, OutputShape, OutputSheet};

/// Cells of one sheet. Row 0 is sheet row 1 and column 0 is column A, so
/// leading empty rows and columns are kept.
#[derive(Debug, Clone)]
pub struct SheetGrid {
    /// Sheet name as it appears in the workbook.
    pub sheet: String,
    pub rows: Vec<Vec<Cell>>,
}

/// Read the sheet matching `declared` (trimmed, case-insensitive).
pub fn read_sheet(path: &Path, declared: &str) -> Result<SheetGrid, SourceError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| SourceError::Unreadable(format!("{}: {}", path.display(), e)))?;

    let names: Vec<String> = workbook.sheet_names().to_vec();
    let resolved = match resolve_sheet_name(declared, &names) {
        Some(name) => name.to_string(),
        None => {
            return Err(SourceError::SheetNotFound { sheet: declared.to_string(), available: names })
        }
    };

    let range = workbook
        .worksheet_range(&resolved)
        .map_err(|e| SourceError::Unreadable(format!("sheet '{}': {}", resolved, e)))?;

    let (top, left) = range.start().map(|(r, c)| (r as usize, c as usize)).unwrap_or((0, 0));
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); top];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; left];
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }
    log::trace!("{}: read {} row(s) from '{}'", path.display(), rows.len(), resolved);

    Ok(SheetGrid { sheet: resolved, rows })
}

/// Anything but a number is text to the engine; text in a value position
/// reads as Missing.
fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::text(s.as_str()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => Cell::Text(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.as_str()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportResult {
    pub sheets_exported: usize,
    pub cells_exported: usize,
}

/// Write one worksheet per metric, in the order given.
pub fn export(
    path: &Path,
    sheets: &[OutputSheet<'_>],
    shape: OutputShape,
    value_label: &str,
) -> Result<ExportResult, IoError> {
    let write_err = |reason: String| IoError::Write { path: path.to_path_buf(), reason };
    let mut result = ExportResult::default();
    let mut xlsx_workbook = XlsxWorkbook::new();
    let header = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .map_err(|e| write_err(format!("Failed to create sheet '{}': {}", sheet.name, e)))?;

        let rows = render(sheet.matrix, shape, value_label);
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let format = (r == 0).then_some(&header);
                write_cell(worksheet, r as u32, c as u16, cell, format)
                    .map_err(|e| write_err(format!("Failed to write cell ({}, {}): {}", r, c, e)))?;
                result.cells_exported += 1;
            }
        }
        result.sheets_exported += 1;
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| write_err(format!("Failed to save XLSX file: {}", e)))?;
    log::info!("wrote {} sheet(s) to {}", result.sheets_exported, path.display());
    Ok(result)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &OutCell,
    format: Option<&Format>,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match (cell, format) {
        (OutCell::Blank, _) => {}
        (OutCell::Text(s), Some(f)) => {
            worksheet.write_string_with_format(row, col, s, f)?;
        }
        (OutCell::Text(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
        (OutCell::Number(v), Some(f)) => {
            worksheet.write_number_with_format(row, col, *v, f)?;
        }
        (OutCell::Number(v), None) => {
            worksheet.write_number(row, col, *v)?;
        }
    }
    Ok(())
}
