//! Harvested wood products: gains and losses per product category.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assemble::{MetricKey, MetricRecord};
use crate::config::HwpConfig;
use crate::layout::{self, Layout, LayoutOverrides, TotalLabels};
use crate::locator::{locate_rows, RowMatch};
use crate::model::{Diagnostics, Issue, Origin, Scalar};
use crate::pattern::LabelPattern;
use crate::table::{Cell, Table, TableShape};

// ---------------------------------------------------------------------------
// Metric catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hwp,
    SolidWood,
    PaperAndPaperboard,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] =
        [Self::Hwp, Self::SolidWood, Self::PaperAndPaperboard, Self::Other];

    /// Default row label in the reporting table.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hwp => "Total HWP",
            Self::SolidWood => "Solid wood",
            Self::PaperAndPaperboard => "Paper and paperboard",
            Self::Other => "Other",
        }
    }

    /// Default code glob used when the label is ambiguous.
    pub fn code_glob(&self) -> Option<&'static str> {
        match self {
            Self::Hwp => None,
            Self::SolidWood => Some("4.G*1*"),
            Self::PaperAndPaperboard => Some("4.G*2*"),
            Self::Other => Some("4.G*3*"),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Breakdown {
    Total,
    Domestic,
    Exported,
}

impl Breakdown {
    pub const ALL: [Breakdown; 3] = [Self::Total, Self::Domestic, Self::Exported];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Gains,
    Losses,
}

impl Flow {
    pub const ALL: [Flow; 2] = [Self::Gains, Self::Losses];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HwpMetric {
    pub category: Category,
    pub breakdown: Breakdown,
    pub flow: Flow,
}

impl HwpMetric {
    /// All 24 metrics in output order.
    pub fn all() -> Vec<HwpMetric> {
        let mut metrics = Vec::with_capacity(24);
        for category in Category::ALL {
            for breakdown in Breakdown::ALL {
                for flow in Flow::ALL {
                    metrics.push(HwpMetric { category, breakdown, flow });
                }
            }
        }
        metrics
    }
}

impl MetricKey for HwpMetric {
    fn sheet_name(&self) -> String {
        let stem = match (self.category, self.breakdown) {
            (Category::Hwp, Breakdown::Total) => "Total HWP",
            (Category::Hwp, Breakdown::Domestic) => "Total HWP Domestic",
            (Category::Hwp, Breakdown::Exported) => "Total HWP Exported",
            (Category::SolidWood, Breakdown::Total) => "Solid wood Tot",
            (Category::SolidWood, Breakdown::Domestic) => "Solid Domestic",
            (Category::SolidWood, Breakdown::Exported) => "Solid Exported",
            (Category::PaperAndPaperboard, Breakdown::Total) => "Paper+pboard Tot",
            (Category::PaperAndPaperboard, Breakdown::Domestic) => "Paper+pboard Dom",
            (Category::PaperAndPaperboard, Breakdown::Exported) => "Paper+pboard Exp",
            (Category::Other, Breakdown::Total) => "Other Tot",
            (Category::Other, Breakdown::Domestic) => "Other Domestic",
            (Category::Other, Breakdown::Exported) => "Other Exported",
        };
        let flow = match self.flow {
            Flow::Gains => "gains",
            Flow::Losses => "losses",
        };
        format!("{stem} {flow}")
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Gains and losses read from the same row(s).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowPair {
    pub gains: Scalar,
    pub losses: Scalar,
}

impl FlowPair {
    pub fn get(&self, flow: Flow) -> Scalar {
        match flow {
            Flow::Gains => self.gains,
            Flow::Losses => self.losses,
        }
    }

    fn sum(a: FlowPair, b: FlowPair) -> FlowPair {
        FlowPair {
            gains: Scalar::sum(&[a.gains, b.gains]),
            losses: Scalar::sum(&[a.losses, b.losses]),
        }
    }
}

/// One country-year. Absent entries read as Missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HwpRecord {
    values: BTreeMap<(Category, Breakdown), FlowPair>,
    layout: Option<Layout>,
}

impl HwpRecord {
    pub fn set(&mut self, category: Category, breakdown: Breakdown, pair: FlowPair) {
        self.values.insert((category, breakdown), pair);
    }

    pub fn get(&self, category: Category, breakdown: Breakdown) -> FlowPair {
        self.values.get(&(category, breakdown)).copied().unwrap_or_default()
    }

    /// Layout the record was read with.
    pub fn layout(&self) -> Option<Layout> {
        self.layout
    }
}

impl MetricRecord for HwpRecord {
    type Key = HwpMetric;

    fn value(&self, key: HwpMetric) -> Scalar {
        self.get(key.category, key.breakdown).get(key.flow)
    }
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

pub struct HwpExtractor<'a> {
    config: &'a HwpConfig,
    overrides: &'a LayoutOverrides,
}

impl<'a> HwpExtractor<'a> {
    pub fn new(config: &'a HwpConfig, overrides: &'a LayoutOverrides) -> Self {
        Self { config, overrides }
    }

    /// Header rows skipped, empty rows and columns dropped.
    pub fn table_shape(&self) -> TableShape {
        TableShape { skip_rows: self.config.skip_rows, columns: None, compact: true }
    }

    fn labels(&self) -> TotalLabels {
        TotalLabels {
            aggregate: self.config.total_label.clone(),
            generic: self.config.generic_total_label.clone(),
            exported_marker: self.config.exported_marker.clone(),
        }
    }

    pub fn extract(&self, table: Table, origin: &Origin<'_>, diagnostics: &mut Diagnostics) -> HwpRecord {
        let mut table = table.without_footnotes();
        let classification =
            layout::classify(&table, &self.labels(), self.overrides.get(origin.country));
        if let Some(directive) = &classification.directive {
            if !directive.apply(&mut table) {
                diagnostics.push(origin.issue(
                    None,
                    Issue::MissingExportedBlock { marker: self.config.exported_marker.clone() },
                ));
            }
        }
        log::debug!("{} {:?}: {} layout", origin.country, origin.year, classification.layout);

        let mut record = HwpRecord { layout: Some(classification.layout), ..Default::default() };
        match classification.layout {
            Layout::Unrecognized { total_rows } => {
                diagnostics.push(origin.issue(None, Issue::UnrecognizedLayout { total_rows }));
            }
            Layout::AggregateOnly => {
                if let Some(pairs) = self.read_pairs(&table, &classification.total, Category::Hwp, origin, diagnostics) {
                    record.set(Category::Hwp, Breakdown::Total, pairs[0]);
                }
                for (category, pattern) in self.category_patterns(1) {
                    if let Some(pairs) = self.read_pairs(&table, &pattern, category, origin, diagnostics) {
                        record.set(category, Breakdown::Total, pairs[0]);
                    }
                }
            }
            Layout::Split => {
                let mut split = vec![(Category::Hwp, classification.total.clone())];
                split.extend(self.category_patterns(2));
                for (category, pattern) in split {
                    if let Some(pairs) = self.read_pairs(&table, &pattern, category, origin, diagnostics) {
                        let (domestic, exported) = (pairs[0], pairs[1]);
                        record.set(category, Breakdown::Domestic, domestic);
                        record.set(category, Breakdown::Exported, exported);
                        record.set(category, Breakdown::Total, FlowPair::sum(domestic, exported));
                    }
                }
            }
        }
        record
    }

    fn category_patterns(&self, expected: usize) -> Vec<(Category, LabelPattern)> {
        self.config
            .categories
            .iter()
            .map(|c| {
                let mut pattern = LabelPattern::new(c.label.as_str()).expecting(expected);
                if let Some(glob) = &c.fallback {
                    pattern = pattern.with_fallback(glob.as_str());
                }
                (c.category, pattern)
            })
            .collect()
    }

    /// Exactly `pattern.expected()` pairs, or None after a mismatch report.
    fn read_pairs(
        &self,
        table: &Table,
        pattern: &LabelPattern,
        category: Category,
        origin: &Origin<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Option<Vec<FlowPair>> {
        let metric = category.label();
        let found = locate_rows(table, pattern);
        match &found {
            RowMatch::Unresolved { .. } => {
                diagnostics.push(origin.issue(
                    Some(metric),
                    Issue::StructuralMismatch {
                        pattern: pattern.literal().to_string(),
                        expected: pattern.expected(),
                        found: found.found(),
                    },
                ));
                return None;
            }
            RowMatch::Fallback { literal_count, .. } => {
                diagnostics.push(origin.issue(
                    Some(metric),
                    Issue::FallbackMatch {
                        pattern: pattern.literal().to_string(),
                        literal_count: *literal_count,
                    },
                ));
            }
            RowMatch::Literal(_) => {}
        }

        let rows = found.rows()?;
        let mut read = |row: usize, column: usize| -> Scalar {
            let cell = table.rows()[row].cell(column);
            if let Cell::Text(text) = cell {
                diagnostics.push(origin.issue(
                    Some(metric),
                    Issue::MalformedValue { row, column, text: text.clone() },
                ));
            }
            cell.to_scalar()
        };
        Some(
            rows.iter()
                .map(|&row| FlowPair {
                    gains: read(row, self.config.gains_column),
                    losses: read(row, self.config.losses_column),
                })
                .collect(),
        )
    }
}
