use crate::assemble::{MatrixAssembler, MetricKey, MetricMatrix, MetricRecord};
use crate::config::ReconConfig;
use crate::error::SourceError;
use crate::evidence::{compute_summary, Tally};
use crate::extract::{HwpExtractor, HwpMetric};
use crate::model::{Diagnostic, Diagnostics, Issue, Origin, RunSummary, YearRange};
use crate::schedule::{schedule, uncovered_years, WorkbookRef, YearStrategy};
use crate::table::{Table, TableShape};
use crate::transition::{Transition, TransitionExtractor};

/// A table read from one sheet, with the sheet name that actually matched.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub sheet: String,
}

/// Where workbooks come from. The engine never touches the filesystem.
pub trait WorkbookSource {
    /// Workbooks for one country, sorted ascending, exclusions applied.
    /// An unknown country yields an empty list.
    fn workbooks(&self, country: &str) -> Result<Vec<WorkbookRef>, SourceError>;

    fn load_table(
        &self,
        workbook: &WorkbookRef,
        sheet: &str,
        shape: &TableShape,
    ) -> Result<LoadedTable, SourceError>;
}

/// Match a declared sheet name against a workbook's sheets. An exact match
/// wins; otherwise the first name equal after trimming and case folding.
pub fn resolve_sheet_name<'a>(declared: &str, available: &'a [String]) -> Option<&'a str> {
    if let Some(exact) = available.iter().find(|name| name.as_str() == declared) {
        return Some(exact.as_str());
    }
    let wanted = declared.trim().to_lowercase();
    available.iter().find(|name| name.trim().to_lowercase() == wanted).map(String::as_str)
}

#[derive(Debug)]
pub struct RunOutput<K: MetricKey> {
    /// One matrix per metric, in catalogue order.
    pub matrices: Vec<(K, MetricMatrix)>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: RunSummary,
}

impl<K: MetricKey> RunOutput<K> {
    pub fn matrix(&self, key: K) -> Option<&MetricMatrix> {
        self.matrices.iter().find(|(k, _)| *k == key).map(|(_, m)| m)
    }
}

/// Harvested wood products gains and losses, 24 metrics.
pub fn run_hwp(
    source: &dyn WorkbookSource,
    config: &ReconConfig,
    countries: &[String],
    years: YearRange,
) -> RunOutput<HwpMetric> {
    let extractor = HwpExtractor::new(&config.hwp, &config.layout_overrides);
    let plan = Plan {
        sheet: &config.hwp.sheet,
        shape: extractor.table_shape(),
        strategy: config.years.strategy,
    };
    drive(source, &plan, countries, years, HwpMetric::all(), |table, origin, diagnostics| {
        extractor.extract(table, origin, diagnostics)
    })
}

/// Land transition matrix, 81 metrics.
pub fn run_land_transition(
    source: &dyn WorkbookSource,
    config: &ReconConfig,
    countries: &[String],
    years: YearRange,
) -> RunOutput<Transition> {
    let extractor = TransitionExtractor::new(&config.land_transition);
    let plan = Plan {
        sheet: &config.land_transition.sheet,
        shape: extractor.table_shape(),
        strategy: config.years.strategy,
    };
    drive(source, &plan, countries, years, Transition::all(), |table, origin, diagnostics| {
        extractor.extract(table, origin, diagnostics)
    })
}

struct Plan<'a> {
    sheet: &'a str,
    shape: TableShape,
    strategy: YearStrategy,
}

fn drive<K, R, F>(
    source: &dyn WorkbookSource,
    plan: &Plan<'_>,
    countries: &[String],
    years: YearRange,
    keys: Vec<K>,
    mut extract: F,
) -> RunOutput<K>
where
    K: MetricKey,
    R: MetricRecord<Key = K>,
    F: FnMut(Table, &Origin<'_>, &mut Diagnostics) -> R,
{
    let mut assembler = MatrixAssembler::new(countries, years, keys);
    let mut diagnostics = Diagnostics::default();
    let mut tally = Tally::default();

    for (index, country) in countries.iter().enumerate() {
        let workbooks = match source.workbooks(country) {
            Ok(workbooks) => workbooks,
            Err(e) => {
                let issue = Issue::UnreadableWorkbook { reason: e.to_string() };
                diagnostics.push(Origin::country(country).issue(None, issue));
                Vec::new()
            }
        };
        log::info!("{country}: {} workbook(s)", workbooks.len());
        if workbooks.is_empty() {
            tally.countries_without_workbooks += 1;
        }

        let slots = schedule(country, &workbooks, years, plan.strategy, &mut diagnostics);
        for slot in &slots {
            let file = slot.workbook.file_name();
            let origin = Origin { country, year: Some(slot.year), file: Some(&file) };
            match source.load_table(slot.workbook, plan.sheet, &plan.shape) {
                Ok(loaded) => {
                    if loaded.sheet != plan.sheet {
                        diagnostics.push(origin.issue(
                            None,
                            Issue::SheetNameDrift {
                                declared: plan.sheet.to_string(),
                                resolved: loaded.sheet.clone(),
                            },
                        ));
                    }
                    let record = extract(loaded.table, &origin, &mut diagnostics);
                    assembler.record(index, slot.year, &record);
                    tally.workbooks_read += 1;
                }
                Err(SourceError::SheetNotFound { sheet, .. }) => {
                    diagnostics.push(origin.issue(None, Issue::SheetNotFound { sheet }));
                    tally.workbooks_skipped += 1;
                }
                Err(SourceError::Unreadable(reason)) => {
                    diagnostics.push(origin.issue(None, Issue::UnreadableWorkbook { reason }));
                    tally.workbooks_skipped += 1;
                }
            }
        }

        let missing = uncovered_years(&slots, years);
        if !missing.is_empty() {
            let issue = Issue::MissingWorkbook { years: missing };
            diagnostics.push(Origin::country(country).issue(None, issue));
        }
    }

    let matrices = assembler.finish();
    let diagnostics = diagnostics.into_vec();
    let summary =
        compute_summary(plan.sheet, years, countries.len(), &matrices, &diagnostics, &tally);
    RunOutput { matrices, diagnostics, summary }
}
