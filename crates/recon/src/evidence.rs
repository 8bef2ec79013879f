use std::collections::BTreeMap;

use crate::assemble::{MetricKey, MetricMatrix};
use crate::model::{Diagnostic, MetricCoverage, RunMeta, RunSummary, YearRange};

/// Per-workbook counters kept while a run is in progress.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    pub workbooks_read: usize,
    pub workbooks_skipped: usize,
    pub countries_without_workbooks: usize,
}

/// Compute summary statistics from assembled matrices and diagnostics.
pub fn compute_summary<K: MetricKey>(
    table: &str,
    years: YearRange,
    countries: usize,
    matrices: &[(K, MetricMatrix)],
    diagnostics: &[Diagnostic],
    tally: &Tally,
) -> RunSummary {
    let mut issue_counts: BTreeMap<String, usize> = BTreeMap::new();
    for d in diagnostics {
        *issue_counts.entry(d.issue.kind_name().to_string()).or_insert(0) += 1;
    }

    let coverage: Vec<MetricCoverage> = matrices
        .iter()
        .map(|(key, matrix)| {
            let missing = matrix.missing_count();
            MetricCoverage {
                metric: key.sheet_name(),
                reported: matrix.cells().len() - missing,
                missing,
            }
        })
        .collect();

    RunSummary {
        meta: RunMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            table: table.to_string(),
            start_year: years.start(),
            end_year: years.end(),
        },
        countries,
        workbooks_read: tally.workbooks_read,
        workbooks_skipped: tally.workbooks_skipped,
        countries_without_workbooks: tally.countries_without_workbooks,
        cells: matrices.iter().map(|(_, m)| m.cells().len()).sum(),
        missing_cells: coverage.iter().map(|c| c.missing).sum(),
        issue_counts,
        coverage,
    }
}
