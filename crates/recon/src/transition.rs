//! Land transition matrix: area moved from one land class to another.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assemble::{MetricKey, MetricRecord};
use crate::config::LandTransitionConfig;
use crate::locator::{locate_rows, RowMatch};
use crate::model::{Diagnostics, Issue, Origin, Scalar};
use crate::pattern::LabelPattern;
use crate::table::{Cell, Table, TableShape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LandClass {
    ForestManaged,
    ForestUnmanaged,
    Cropland,
    GrasslandManaged,
    GrasslandUnmanaged,
    WetlandsManaged,
    WetlandsUnmanaged,
    Settlements,
    OtherLand,
}

impl LandClass {
    /// Row order of the matrix, which is also the column order.
    pub const ALL: [LandClass; 9] = [
        Self::ForestManaged,
        Self::ForestUnmanaged,
        Self::Cropland,
        Self::GrasslandManaged,
        Self::GrasslandUnmanaged,
        Self::WetlandsManaged,
        Self::WetlandsUnmanaged,
        Self::Settlements,
        Self::OtherLand,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::ForestManaged => "FL(manag.)",
            Self::ForestUnmanaged => "FL(unmanag.)",
            Self::Cropland => "CL",
            Self::GrasslandManaged => "GL(manag.)",
            Self::GrasslandUnmanaged => "GL(unmanag.)",
            Self::WetlandsManaged => "WL(manag.)",
            Self::WetlandsUnmanaged => "WL(unmanag.)",
            Self::Settlements => "SL",
            Self::OtherLand => "OL",
        }
    }

    /// Default row label. Managed wetlands is matched without its closing
    /// parenthesis.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ForestManaged => "Forest land (managed)",
            Self::ForestUnmanaged => "Forest land (unmanaged)",
            Self::Cropland => "Cropland",
            Self::GrasslandManaged => "Grassland (managed)",
            Self::GrasslandUnmanaged => "Grassland (unmanaged)",
            Self::WetlandsManaged => "Wetlands (managed",
            Self::WetlandsUnmanaged => "Wetlands (unmanaged)",
            Self::Settlements => "Settlements",
            Self::OtherLand => "Other land",
        }
    }

    /// Value column of this class when it is the destination (label is 0).
    pub fn column(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or_default() + 1
    }
}

impl fmt::Display for LandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Transition {
    pub from: LandClass,
    pub to: LandClass,
}

impl Transition {
    /// All 81 transitions, origin-major.
    pub fn all() -> Vec<Transition> {
        LandClass::ALL
            .iter()
            .flat_map(|&from| LandClass::ALL.iter().map(move |&to| Transition { from, to }))
            .collect()
    }
}

impl MetricKey for Transition {
    fn sheet_name(&self) -> String {
        format!("{}->{}", self.from.abbreviation(), self.to.abbreviation())
    }
}

/// One country-year. Absent transitions read as Missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransitionRecord {
    values: BTreeMap<Transition, Scalar>,
}

impl TransitionRecord {
    pub fn get(&self, transition: Transition) -> Scalar {
        self.values.get(&transition).copied().unwrap_or_default()
    }
}

impl MetricRecord for TransitionRecord {
    type Key = Transition;

    fn value(&self, key: Transition) -> Scalar {
        self.get(key)
    }
}

pub struct TransitionExtractor<'a> {
    config: &'a LandTransitionConfig,
}

impl<'a> TransitionExtractor<'a> {
    pub fn new(config: &'a LandTransitionConfig) -> Self {
        Self { config }
    }

    /// Fixed column window, no compaction so destination columns keep
    /// their positions.
    pub fn table_shape(&self) -> TableShape {
        TableShape {
            skip_rows: self.config.skip_rows,
            columns: Some((self.config.first_column, self.config.last_column)),
            compact: false,
        }
    }

    pub fn extract(&self, table: Table, origin: &Origin<'_>, diagnostics: &mut Diagnostics) -> TransitionRecord {
        let table = table.without_footnotes();
        let mut record = TransitionRecord::default();
        for class in &self.config.classes {
            let pattern = LabelPattern::new(class.label.as_str());
            let found = locate_rows(&table, &pattern);
            let row = match &found {
                RowMatch::Literal(rows) => rows[0],
                _ => {
                    diagnostics.push(origin.issue(
                        Some(class.class.abbreviation()),
                        Issue::StructuralMismatch {
                            pattern: class.label.clone(),
                            expected: 1,
                            found: found.found(),
                        },
                    ));
                    continue;
                }
            };
            let cells = &table.rows()[row];
            for to in LandClass::ALL {
                let transition = Transition { from: class.class, to };
                let cell = cells.cell(to.column());
                if let Cell::Text(text) = cell {
                    diagnostics.push(origin.issue(
                        Some(transition.sheet_name().as_str()),
                        Issue::MalformedValue { row, column: to.column(), text: text.clone() },
                    ));
                }
                record.values.insert(transition, cell.to_scalar());
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;

    fn matrix_row(label: &str, base: f64) -> Row {
        let mut cells = vec![Cell::text(label)];
        cells.extend((0..9).map(|i| Cell::Number(base + i as f64)));
        cells.push(Cell::Number(999.0));
        Row::new(cells)
    }

    #[test]
    fn catalogue_has_81_transitions() {
        let all = Transition::all();
        assert_eq!(all.len(), 81);
        assert_eq!(all[0].sheet_name(), "FL(manag.)->FL(manag.)");
        assert_eq!(all[2].sheet_name(), "FL(manag.)->CL");
        assert_eq!(all[80].sheet_name(), "OL->OL");
        assert_eq!(LandClass::OtherLand.column(), 9);
    }

    #[test]
    fn reads_destination_columns() {
        let config = LandTransitionConfig::default();
        let rows = LandClass::ALL
            .iter()
            .enumerate()
            .map(|(i, c)| matrix_row(c.label(), (i * 10) as f64))
            .collect();
        let mut diags = Diagnostics::default();
        let record = TransitionExtractor::new(&config).extract(
            Table::new("Table4.1", rows),
            &Origin::country("AUT"),
            &mut diags,
        );
        assert!(diags.is_empty());
        let cl_to_sl = Transition { from: LandClass::Cropland, to: LandClass::Settlements };
        assert_eq!(record.get(cl_to_sl), Scalar::Reported(27.0));
        let ol_to_fl = Transition { from: LandClass::OtherLand, to: LandClass::ForestManaged };
        assert_eq!(record.get(ol_to_fl), Scalar::Reported(80.0));
    }

    #[test]
    fn ambiguous_or_absent_rows_stay_missing() {
        // "Forest land (managed)" is not a substring of "Forest land (unmanaged)".
        let config = LandTransitionConfig::default();
        let rows = vec![
            matrix_row("Forest land (managed)", 0.0),
            matrix_row("Forest land (unmanaged)", 10.0),
            matrix_row("Wetlands (managed)", 20.0),
            matrix_row("Wetlands (managed) (peat)", 30.0),
        ];
        let mut diags = Diagnostics::default();
        let record = TransitionExtractor::new(&config).extract(
            Table::new("Table4.1", rows),
            &Origin::country("AUT"),
            &mut diags,
        );
        let fl = Transition { from: LandClass::ForestManaged, to: LandClass::ForestManaged };
        assert_eq!(record.get(fl), Scalar::Reported(0.0));
        let wl = Transition { from: LandClass::WetlandsManaged, to: LandClass::Cropland };
        assert!(record.get(wl).is_missing());
        // Wetlands (managed) ambiguous plus six classes absent.
        assert_eq!(diags.len(), 7);
        let wl_diag = diags
            .entries()
            .iter()
            .find(|d| d.metric.as_deref() == Some("WL(manag.)"))
            .unwrap();
        assert!(matches!(wl_diag.issue, Issue::StructuralMismatch { found: 2, .. }));
    }

    #[test]
    fn notation_keys_are_reported_as_malformed() {
        let config = LandTransitionConfig::default();
        let mut cells = vec![Cell::text("Settlements")];
        cells.extend((0..9).map(|i| Cell::Number(i as f64)));
        cells[3] = Cell::text("NO");
        let mut diags = Diagnostics::default();
        let record = TransitionExtractor::new(&config).extract(
            Table::new("Table4.1", vec![Row::new(cells)]),
            &Origin::country("AUT"),
            &mut diags,
        );

        let sl_to_cl = Transition { from: LandClass::Settlements, to: LandClass::Cropland };
        assert!(record.get(sl_to_cl).is_missing());
        let sl_to_sl = Transition { from: LandClass::Settlements, to: LandClass::Settlements };
        assert_eq!(record.get(sl_to_sl), Scalar::Reported(7.0));

        let malformed: Vec<_> = diags
            .entries()
            .iter()
            .filter(|d| matches!(d.issue, Issue::MalformedValue { .. }))
            .collect();
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].metric.as_deref(), Some("SL->CL"));
        assert_eq!(
            malformed[0].issue,
            Issue::MalformedValue { row: 0, column: 3, text: "NO".to_string() }
        );
    }
}
