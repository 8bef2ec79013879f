// CSV export: one file per metric

use std::path::{Path, PathBuf};

use crate::error::IoError;
use crate::render::{render, OutputShape, OutputSheet};

/// File stem for a metric sheet name. `->` and spaces do not survive well
/// in file names.
pub fn file_stem(name: &str) -> String {
    name.trim()
        .replace("->", "_to_")
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect()
}

/// Write every sheet to `<dir>/<stem>.csv`, creating `dir` if needed.
/// Returns the written paths in sheet order.
pub fn export_dir(
    dir: &Path,
    sheets: &[OutputSheet<'_>],
    shape: OutputShape,
    value_label: &str,
) -> Result<Vec<PathBuf>, IoError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| IoError::Write { path: dir.to_path_buf(), reason: e.to_string() })?;

    let mut written = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let path = dir.join(format!("{}.csv", file_stem(&sheet.name)));
        export_one(&path, sheet, shape, value_label)?;
        written.push(path);
    }
    log::info!("wrote {} csv file(s) to {}", written.len(), dir.display());
    Ok(written)
}

fn export_one(
    path: &Path,
    sheet: &OutputSheet<'_>,
    shape: OutputShape,
    value_label: &str,
) -> Result<(), IoError> {
    let write_err = |e: csv::Error| IoError::Write { path: path.to_path_buf(), reason: e.to_string() };
    let mut writer = csv::WriterBuilder::new().from_path(path).map_err(write_err)?;

    for row in render(sheet.matrix, shape, value_label) {
        let record: Vec<String> = row.iter().map(|c| c.to_field()).collect();
        writer.write_record(&record).map_err(write_err)?;
    }

    writer
        .flush()
        .map_err(|e| IoError::Write { path: path.to_path_buf(), reason: e.to_string() })?;
    Ok(())
}
