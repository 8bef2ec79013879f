use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pattern::LabelPattern;
use crate::table::Table;

/// Shape of a harvested-wood-products table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum Layout {
    /// One aggregate total row; no domestic/exported breakdown.
    AggregateOnly,
    /// Two generic total rows, domestic block first, exported second.
    Split,
    Unrecognized { total_rows: usize },
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AggregateOnly => write!(f, "aggregate_only"),
            Self::Split => write!(f, "split"),
            Self::Unrecognized { total_rows } => write!(f, "unrecognized({total_rows})"),
        }
    }
}

/// Per-country rule that overrides layout detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutOverride {
    /// Domestic block contains the whole story; cut everything from the
    /// first exported row and read it as an aggregate table.
    DomesticInclusive,
}

impl std::fmt::Display for LayoutOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomesticInclusive => write!(f, "domestic_inclusive"),
        }
    }
}

/// Country code → override. Lookups ignore case.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LayoutOverrides(BTreeMap<String, LayoutOverride>);

impl Default for LayoutOverrides {
    fn default() -> Self {
        Self(BTreeMap::from([("ITA".to_string(), LayoutOverride::DomesticInclusive)]))
    }
}

impl LayoutOverrides {
    pub fn none() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, country: &str, rule: LayoutOverride) -> Self {
        self.0.insert(country.to_uppercase(), rule);
        self
    }

    pub fn get(&self, country: &str) -> Option<LayoutOverride> {
        let wanted = country.to_uppercase();
        self.0.iter().find(|(code, _)| code.to_uppercase() == wanted).map(|(_, rule)| *rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LayoutOverride)> {
        self.0.iter().map(|(code, rule)| (code.as_str(), *rule))
    }
}

/// Table preparation that must run before any row is located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    TruncateBefore(String),
}

impl Directive {
    /// Returns false when the table had nothing to act on.
    pub fn apply(&self, table: &mut Table) -> bool {
        match self {
            Self::TruncateBefore(marker) => table.truncate_before(marker),
        }
    }
}

/// Labels that drive classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalLabels {
    /// Case-sensitive probe for the aggregate layout, e.g. `TOTAL HWP`.
    pub aggregate: String,
    /// Generic total row label, e.g. `Total`.
    pub generic: String,
    /// Label that opens the exported block.
    pub exported_marker: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub layout: Layout,
    pub directive: Option<Directive>,
    /// Pattern that locates the total row(s) under this layout.
    pub total: LabelPattern,
}

pub fn classify(table: &Table, labels: &TotalLabels, rule: Option<LayoutOverride>) -> Classification {
    if let Some(LayoutOverride::DomesticInclusive) = rule {
        return Classification {
            layout: Layout::AggregateOnly,
            directive: Some(Directive::TruncateBefore(labels.exported_marker.clone())),
            total: LabelPattern::new(labels.generic.as_str()),
        };
    }

    let probe = LabelPattern::new(labels.aggregate.as_str()).case_sensitive(true);
    let aggregate = table
        .rows()
        .iter()
        .filter_map(|row| row.label())
        .any(|label| !probe.is_excluded(label) && probe.matches(label));
    if aggregate {
        return Classification {
            layout: Layout::AggregateOnly,
            directive: None,
            total: LabelPattern::new(labels.aggregate.as_str()),
        };
    }

    let generic = LabelPattern::new(labels.generic.as_str()).expecting(2);
    let total_rows = table
        .rows()
        .iter()
        .filter_map(|row| row.label())
        .filter(|label| !generic.is_excluded(label) && generic.matches(label))
        .count();
    let layout = if total_rows == 2 { Layout::Split } else { Layout::Unrecognized { total_rows } };
    Classification { layout, directive: None, total: generic }
}
