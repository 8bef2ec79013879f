//! Assigns inventory years to a country's sorted workbook list.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::{Diagnostics, Issue, Origin, YearRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YearStrategy {
    /// Year token in the file name wins; position is the fallback.
    #[default]
    Filename,
    /// The n-th file is year start+n, whatever its name says.
    Positional,
}

/// One discovered workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookRef {
    pub country: String,
    pub path: PathBuf,
}

impl WorkbookRef {
    pub fn new(country: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { country: country.into(), path: path.into() }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<'a> {
    pub year: i32,
    pub workbook: &'a WorkbookRef,
}

/// Inventory year named in a file name: the last standalone four-digit
/// token. Submission names put the submission year before the inventory
/// year (`AUT_2017_1990_...`).
pub fn year_from_file_name(name: &str) -> Option<i32> {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    stem.split(|c: char| !c.is_ascii_digit())
        .filter(|token| token.len() == 4)
        .filter_map(|token| token.parse::<i32>().ok())
        .last()
}

/// Walk `workbooks` (already sorted) and give each one a year. Stops once
/// the next positional year passes the end of the range. Under
/// `Filename`, a workbook named for a year outside the range is skipped;
/// only names without a year token take the positional year.
pub fn schedule<'a>(
    country: &str,
    workbooks: &'a [WorkbookRef],
    years: YearRange,
    strategy: YearStrategy,
    diagnostics: &mut Diagnostics,
) -> Vec<Slot<'a>> {
    let mut slots = Vec::new();
    let mut filled = BTreeSet::new();
    let mut next = years.start();

    for workbook in workbooks {
        if next > years.end() {
            log::debug!("{country}: range filled, {} left unread", workbook.file_name());
            break;
        }
        let file = workbook.file_name();
        let origin = Origin { country, year: Some(next), file: Some(&file) };

        let year = match strategy {
            YearStrategy::Positional => next,
            YearStrategy::Filename => match year_from_file_name(&file) {
                Some(named) if !years.contains(named) => {
                    let origin = Origin { year: Some(named), ..origin };
                    diagnostics.push(origin.issue(None, Issue::YearOutOfRange { named }));
                    continue;
                }
                Some(explicit) => {
                    if explicit != next {
                        diagnostics.push(origin.issue(
                            None,
                            Issue::YearMismatch { explicit, positional: next },
                        ));
                    }
                    explicit
                }
                None => next,
            },
        };

        if !filled.insert(year) {
            let origin = Origin { year: Some(year), ..origin };
            diagnostics.push(origin.issue(None, Issue::DuplicateYear { claimed: year }));
            continue;
        }
        slots.push(Slot { year, workbook });
        next = year + 1;
    }
    slots
}

/// Years in range that no slot covers.
pub fn uncovered_years(slots: &[Slot<'_>], years: YearRange) -> Vec<i32> {
    let covered: BTreeSet<i32> = slots.iter().map(|s| s.year).collect();
    years.iter().filter(|y| !covered.contains(y)).collect()
}
