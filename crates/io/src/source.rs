// Filesystem workbook source: <root>/<COUNTRY>/<workbook>.xlsx

use std::path::{Path, PathBuf};

use glob::Pattern;

use invgrid_recon::config::DiscoveryConfig;
use invgrid_recon::{LoadedTable, SourceError, Table, TableShape, WorkbookRef, WorkbookSource};

use crate::error::IoError;
use crate::xlsx;

#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    include: Pattern,
    exclude: Vec<Pattern>,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>, discovery: &DiscoveryConfig) -> Result<Self, IoError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(IoError::Open { path: root, reason: "not a directory".into() });
        }
        let compile = |p: &str| {
            Pattern::new(p).map_err(|e| IoError::Glob { pattern: p.to_string(), reason: e.to_string() })
        };
        let include = compile(discovery.include.as_str())?;
        let exclude = discovery.exclude.iter().map(|p| compile(p.as_str())).collect::<Result<_, _>>()?;
        Ok(Self { root, include, exclude })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Country directories under the root: three-character names only,
    /// sorted.
    pub fn list_countries(&self) -> Result<Vec<String>, IoError> {
        let entries = std::fs::read_dir(&self.root)
            .map_err(|e| IoError::Read { path: self.root.clone(), reason: e.to_string() })?;
        let mut countries: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| name.chars().count() == 3)
            .collect();
        countries.sort();
        Ok(countries)
    }

    fn selected(&self, name: &str) -> bool {
        self.include.matches(name) && !self.exclude.iter().any(|p| p.matches(name))
    }
}

impl WorkbookSource for FsSource {
    fn workbooks(&self, country: &str) -> Result<Vec<WorkbookRef>, SourceError> {
        let dir = self.root.join(country);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| SourceError::Unreadable(format!("{}: {}", dir.display(), e)))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| self.selected(name))
            })
            .collect();
        paths.sort();
        log::debug!("{}: {} workbook(s) in {}", country, paths.len(), dir.display());

        Ok(paths.into_iter().map(|p| WorkbookRef::new(country, p)).collect())
    }

    fn load_table(
        &self,
        workbook: &WorkbookRef,
        sheet: &str,
        shape: &TableShape,
    ) -> Result<LoadedTable, SourceError> {
        let grid = xlsx::read_sheet(&workbook.path, sheet)?;
        let table = Table::from_grid(grid.sheet.clone(), grid.rows, shape);
        Ok(LoadedTable { table, sheet: grid.sheet })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    fn touch_xlsx(path: &Path, sheet: &str) {
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet().set_name(sheet).unwrap();
        ws.write_string(0, 0, "title").unwrap();
        ws.write_string(1, 0, "TOTAL HWP").unwrap();
        ws.write_number(1, 1, 7.0).unwrap();
        wb.save(path).unwrap();
    }

    #[test]
    fn missing_root_is_open_error() {
        let dir = tempdir().unwrap();
        let err = FsSource::new(dir.path().join("nope"), &DiscoveryConfig::default()).unwrap_err();
        assert!(matches!(err, IoError::Open { .. }));
    }

    #[test]
    fn bad_pattern_is_glob_error() {
        let dir = tempdir().unwrap();
        let discovery = DiscoveryConfig { include: "[".into(), exclude: vec![] };
        let err = FsSource::new(dir.path(), &discovery).unwrap_err();
        assert!(matches!(err, IoError::Glob { .. }));
    }

    #[test]
    fn lists_three_letter_directories() {
        let dir = tempdir().unwrap();
        for name in ["FIN", "AUT", "EUA", "docs", "AT"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("BEL"), "file, not dir").unwrap();
        let source = FsSource::new(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert_eq!(source.list_countries().unwrap(), vec!["AUT", "EUA", "FIN"]);
    }

    #[test]
    fn discovery_applies_include_and_exclude() {
        let dir = tempdir().unwrap();
        let aut = dir.path().join("AUT");
        std::fs::create_dir(&aut).unwrap();
        for name in [
            "AUT_2022_2001_12042022_125641.xlsx",
            "AUT_2022_2000_12042022_125641.xlsx",
            "AUT_2022_1989_12042022_125641.xlsx",
            "~$AUT_2022_2002_12042022_125641.xlsx",
            "notes.txt",
        ] {
            std::fs::write(aut.join(name), "").unwrap();
        }
        let source = FsSource::new(dir.path(), &DiscoveryConfig::default()).unwrap();

        let names: Vec<String> = source.workbooks("AUT").unwrap().iter().map(|w| w.file_name()).collect();
        assert_eq!(
            names,
            vec!["AUT_2022_2000_12042022_125641.xlsx", "AUT_2022_2001_12042022_125641.xlsx"]
        );
        assert!(source.workbooks("ZZZ").unwrap().is_empty());
    }

    #[test]
    fn load_table_applies_shape() {
        let dir = tempdir().unwrap();
        let fin = dir.path().join("FIN");
        std::fs::create_dir(&fin).unwrap();
        touch_xlsx(&fin.join("FIN_2000.xlsx"), "table4.gs1 ");

        let source = FsSource::new(dir.path(), &DiscoveryConfig::default()).unwrap();
        let workbooks = source.workbooks("FIN").unwrap();
        let shape = TableShape { skip_rows: 1, columns: None, compact: true };
        let loaded = source.load_table(&workbooks[0], "Table4.Gs1", &shape).unwrap();

        assert_eq!(loaded.sheet, "table4.gs1 ");
        assert_eq!(loaded.table.len(), 1);
        assert_eq!(loaded.table.rows()[0].label(), Some("TOTAL HWP"));
    }
}
