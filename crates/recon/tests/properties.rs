// Property-based tests for matrix shape and footnote handling.
// CI: 128 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

mod common;

use common::{hwp_grid, MemorySource};
use invgrid_recon::locator::locate;
use invgrid_recon::pattern::LabelPattern;
use invgrid_recon::table::Row;
use invgrid_recon::{run_hwp, Cell, ReconConfig, Scalar, Table, YearRange};
use proptest::prelude::*;

fn config_128() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn arb_country() -> impl Strategy<Value = String> {
    "[A-Z]{3}"
}

proptest! {
    #![proptest_config(config_128())]

    /// One row per listed country and one column per year, whatever exists on disk.
    #[test]
    fn matrix_shape_is_fixed(
        listed in proptest::collection::vec(arb_country(), 1..6),
        start in 1990i32..2010,
        span in 0i32..6,
        present in proptest::collection::vec((0usize..6, 0i32..8, -50.0f64..50.0), 0..12),
    ) {
        let years = YearRange::new(start, start + span).unwrap();
        let mut source = MemorySource::new();
        for (ci, offset, value) in &present {
            let country = &listed[ci % listed.len()];
            let file = format!("{country}_{}.xlsx", start + offset);
            source = source.with_sheet(
                country,
                &file,
                "Table4.Gs1",
                hwp_grid(&[("TOTAL HWP", *value, -*value)]),
            );
        }

        let out = run_hwp(&source, &ReconConfig::default(), &listed, years);
        prop_assert_eq!(out.matrices.len(), 24);
        for (_, matrix) in &out.matrices {
            prop_assert_eq!(matrix.countries(), listed.as_slice());
            prop_assert_eq!(matrix.cells().len(), listed.len() * years.len());
            let long = matrix.to_long_form("v");
            prop_assert_eq!(long.rows.len(), listed.len() * years.len());
            for (i, row) in long.rows.iter().enumerate() {
                prop_assert_eq!(row.index, i);
            }
        }
    }

    /// Footnote rows never change what a pattern locates.
    #[test]
    fn footnotes_never_match(
        value in -1000.0f64..1000.0,
        notes in proptest::collection::vec(("[ ]{0,3}", "[a-z ]{0,10}", -1000.0f64..1000.0), 0..5),
        position in 0usize..6,
    ) {
        let target = Row::new(vec![Cell::text("Solid wood"), Cell::Number(value)]);
        let mut rows: Vec<Row> = notes
            .iter()
            .map(|(indent, tail, v)| {
                Row::new(vec![Cell::text(format!("{indent}(1) Solid wood {tail}")), Cell::Number(*v)])
            })
            .collect();
        rows.insert(position.min(rows.len()), target);
        let table = Table::new("Table4.Gs1", rows);

        let pattern = LabelPattern::new("solid wood");
        prop_assert_eq!(locate(&table, &pattern, 1), vec![Scalar::Reported(value)]);
        prop_assert_eq!(
            locate(&table.clone().without_footnotes(), &pattern, 1),
            vec![Scalar::Reported(value)]
        );
    }
}
