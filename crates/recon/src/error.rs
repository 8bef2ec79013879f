use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty label, bad column window, etc.).
    ConfigValidation(String),
    /// A country group name that is not one of the built-in groups.
    UnknownCountryGroup(String),
    /// Start year after end year.
    InvalidYearRange { start: i32, end: i32 },
    /// A range bound outside the supported inventory years.
    YearOutOfBounds { year: i32 },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownCountryGroup(name) => write!(f, "unknown country group: {name}"),
            Self::InvalidYearRange { start, end } => {
                write!(f, "start year {start} is after end year {end}")
            }
            Self::YearOutOfBounds { year } => write!(
                f,
                "year {year} is outside {}..={}",
                crate::model::YearRange::EARLIEST,
                crate::model::YearRange::LATEST
            ),
        }
    }
}

impl std::error::Error for ReconError {}

/// Failure to produce a table from one workbook. Always recoverable: the
/// affected country-year stays Missing.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The file could not be opened or parsed as a workbook.
    Unreadable(String),
    /// No sheet matched the declared name, even after trimming and case folding.
    SheetNotFound { sheet: String, available: Vec<String> },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(msg) => write!(f, "unreadable workbook: {msg}"),
            Self::SheetNotFound { sheet, available } => {
                write!(f, "sheet '{sheet}' not found (available: {})", available.join(", "))
            }
        }
    }
}

impl std::error::Error for SourceError {}
