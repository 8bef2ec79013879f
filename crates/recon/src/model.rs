use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::ReconError;

/// Text written wherever a value is Missing.
pub const MISSING_SENTINEL: &str = "NaN";

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// One extracted value. `Missing` is never conflated with a reported zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Scalar {
    Reported(f64),
    #[default]
    Missing,
}

impl Scalar {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Reported(v) => Some(*v),
            Self::Missing => None,
        }
    }

    /// Sum of all terms. A single Missing term makes the sum Missing.
    pub fn sum(terms: &[Scalar]) -> Scalar {
        let mut total = 0.0;
        for term in terms {
            match term {
                Self::Reported(v) => total += v,
                Self::Missing => return Self::Missing,
            }
        }
        Self::Reported(total)
    }
}

impl From<Option<f64>> for Scalar {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Reported(v),
            _ => Self::Missing,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reported(v) => write!(f, "{v}"),
            Self::Missing => f.write_str(MISSING_SENTINEL),
        }
    }
}

// ---------------------------------------------------------------------------
// Year range
// ---------------------------------------------------------------------------

/// Inclusive range of inventory years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub const EARLIEST: i32 = 1900;
    pub const LATEST: i32 = 2100;

    pub fn new(start: i32, end: i32) -> Result<Self, ReconError> {
        for year in [start, end] {
            if !(Self::EARLIEST..=Self::LATEST).contains(&year) {
                return Err(ReconError::YearOutOfBounds { year });
            }
        }
        if start > end {
            return Err(ReconError::InvalidYearRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn index_of(&self, year: i32) -> Option<usize> {
        self.contains(year).then(|| (year - self.start) as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// What went wrong (or was worked around) while extracting one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// A label matched a different number of rows than expected.
    StructuralMismatch { pattern: String, expected: usize, found: usize },
    /// Neither an aggregate total nor a domestic/exported pair of totals.
    UnrecognizedLayout { total_rows: usize },
    /// Years in range for which the country has no workbook.
    MissingWorkbook { years: Vec<i32> },
    /// Sheet resolved only after trimming and case folding.
    SheetNameDrift { declared: String, resolved: String },
    SheetNotFound { sheet: String },
    /// A value cell held text; it was treated as Missing.
    MalformedValue { row: usize, column: usize, text: String },
    UnreadableWorkbook { reason: String },
    /// Literal matching was ambiguous and the fallback glob resolved it.
    FallbackMatch { pattern: String, literal_count: usize },
    /// The year in the file name disagrees with the file's position.
    YearMismatch { explicit: i32, positional: i32 },
    /// A second workbook claimed an already filled year and was skipped.
    DuplicateYear { claimed: i32 },
    /// The file name names a year outside the requested range; skipped.
    YearOutOfRange { named: i32 },
    /// A domestic-inclusive table had no exported block to cut away.
    MissingExportedBlock { marker: String },
}

impl Issue {
    /// Stable name used for counts in the run summary.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::StructuralMismatch { .. } => "structural_mismatch",
            Self::UnrecognizedLayout { .. } => "unrecognized_layout",
            Self::MissingWorkbook { .. } => "missing_workbook",
            Self::SheetNameDrift { .. } => "sheet_name_drift",
            Self::SheetNotFound { .. } => "sheet_not_found",
            Self::MalformedValue { .. } => "malformed_value",
            Self::UnreadableWorkbook { .. } => "unreadable_workbook",
            Self::FallbackMatch { .. } => "fallback_match",
            Self::YearMismatch { .. } => "year_mismatch",
            Self::DuplicateYear { .. } => "duplicate_year",
            Self::YearOutOfRange { .. } => "year_out_of_range",
            Self::MissingExportedBlock { .. } => "missing_exported_block",
        }
    }

    pub fn level(&self) -> log::Level {
        match self {
            Self::MalformedValue { .. } | Self::YearOutOfRange { .. } => log::Level::Debug,
            Self::SheetNameDrift { .. } | Self::FallbackMatch { .. } => log::Level::Info,
            _ => log::Level::Warn,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuralMismatch { pattern, expected, found } => {
                write!(f, "'{pattern}' matched {found} row(s), expected {expected}")
            }
            Self::UnrecognizedLayout { total_rows } => {
                write!(f, "unrecognized layout ({total_rows} total row(s))")
            }
            Self::MissingWorkbook { years } => {
                let years: Vec<String> = years.iter().map(i32::to_string).collect();
                write!(f, "no workbook for year(s) {}", years.join(", "))
            }
            Self::SheetNameDrift { declared, resolved } => {
                write!(f, "sheet '{declared}' resolved as '{resolved}'")
            }
            Self::SheetNotFound { sheet } => write!(f, "sheet '{sheet}' not found"),
            Self::MalformedValue { row, column, text } => {
                write!(f, "row {row}, column {column}: non-numeric value '{text}'")
            }
            Self::UnreadableWorkbook { reason } => write!(f, "unreadable workbook: {reason}"),
            Self::FallbackMatch { pattern, literal_count } => write!(
                f,
                "'{pattern}' matched {literal_count} row(s) literally, resolved by code pattern"
            ),
            Self::YearMismatch { explicit, positional } => write!(
                f,
                "file name says {explicit}, position says {positional}; using {explicit}"
            ),
            Self::DuplicateYear { claimed } => write!(f, "year {claimed} already filled, skipped"),
            Self::YearOutOfRange { named } => write!(f, "file is for {named}, outside the range, skipped"),
            Self::MissingExportedBlock { marker } => {
                write!(f, "no '{marker}' row to truncate at; table used whole")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(flatten)]
    pub issue: Issue,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.country)?;
        if let Some(year) = self.year {
            write!(f, " {year}")?;
        }
        if let Some(file) = &self.file {
            write!(f, " [{file}]")?;
        }
        if let Some(metric) = &self.metric {
            write!(f, " {metric}")?;
        }
        write!(f, ": {}", self.issue)
    }
}

/// Where a diagnostic came from.
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a> {
    pub country: &'a str,
    pub year: Option<i32>,
    pub file: Option<&'a str>,
}

impl<'a> Origin<'a> {
    pub fn country(country: &'a str) -> Self {
        Self { country, year: None, file: None }
    }

    pub fn issue(&self, metric: Option<&str>, issue: Issue) -> Diagnostic {
        Diagnostic {
            country: self.country.to_string(),
            year: self.year,
            file: self.file.map(str::to_string),
            metric: metric.map(str::to_string),
            issue,
        }
    }
}

/// Append-only diagnostic log. Every entry is also emitted through `log`.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::log!(diagnostic.issue.level(), "{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
    pub table: String,
    pub start_year: i32,
    pub end_year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricCoverage {
    pub metric: String,
    pub reported: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub meta: RunMeta,
    pub countries: usize,
    pub workbooks_read: usize,
    pub workbooks_skipped: usize,
    pub countries_without_workbooks: usize,
    pub cells: usize,
    pub missing_cells: usize,
    pub issue_counts: BTreeMap<String, usize>,
    pub coverage: Vec<MetricCoverage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_displays_as_nan() {
        assert_eq!(Scalar::Missing.to_string(), "NaN");
        assert_eq!(Scalar::Reported(1.5).to_string(), "1.5");
    }

    #[test]
    fn sum_propagates_missing() {
        assert_eq!(
            Scalar::sum(&[Scalar::Reported(1.0), Scalar::Reported(2.5)]),
            Scalar::Reported(3.5)
        );
        assert_eq!(Scalar::sum(&[Scalar::Reported(1.0), Scalar::Missing]), Scalar::Missing);
        assert_eq!(Scalar::sum(&[]), Scalar::Reported(0.0));
    }

    #[test]
    fn non_finite_numbers_are_missing() {
        assert_eq!(Scalar::from(Some(f64::NAN)), Scalar::Missing);
        assert_eq!(Scalar::from(None), Scalar::Missing);
        assert_eq!(Scalar::from(Some(0.0)), Scalar::Reported(0.0));
    }

    #[test]
    fn year_range_rejects_inverted() {
        assert!(matches!(
            YearRange::new(2001, 1999),
            Err(ReconError::InvalidYearRange { start: 2001, end: 1999 })
        ));
        let years = YearRange::new(1990, 1992).unwrap();
        assert_eq!(years.len(), 3);
        assert_eq!(years.index_of(1991), Some(1));
        assert_eq!(years.index_of(1993), None);
        assert_eq!(years.iter().collect::<Vec<_>>(), vec![1990, 1991, 1992]);
    }

    #[test]
    fn year_range_rejects_extreme_bounds() {
        assert!(matches!(
            YearRange::new(i32::MIN, i32::MAX),
            Err(ReconError::YearOutOfBounds { year: i32::MIN })
        ));
        assert!(matches!(
            YearRange::new(1990, 1_000_000),
            Err(ReconError::YearOutOfBounds { year: 1_000_000 })
        ));
        let widest = YearRange::new(YearRange::EARLIEST, YearRange::LATEST).unwrap();
        assert_eq!(widest.len(), 201);
        assert_eq!(widest.index_of(YearRange::LATEST), Some(200));
    }

    #[test]
    fn diagnostic_serializes_flat() {
        let origin = Origin { country: "AUT", year: Some(1990), file: Some("AUT_1990.xlsx") };
        let diag = origin.issue(Some("Solid wood"), Issue::DuplicateYear { claimed: 1990 });
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "duplicate_year");
        assert_eq!(json["country"], "AUT");
        assert_eq!(json["metric"], "Solid wood");
        assert_eq!(diag.to_string(), "AUT 1990 [AUT_1990.xlsx] Solid wood: year 1990 already filled, skipped");
    }
}
