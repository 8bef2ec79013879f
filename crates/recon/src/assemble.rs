//! Country × year matrices, one per metric.

use std::collections::BTreeMap;

use crate::model::{Scalar, YearRange};

/// A metric that gets its own output matrix.
pub trait MetricKey: Copy + Ord + std::fmt::Debug {
    /// Output sheet name.
    fn sheet_name(&self) -> String;
}

/// Everything extracted from one country-year workbook.
pub trait MetricRecord {
    type Key: MetricKey;

    fn value(&self, key: Self::Key) -> Scalar;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricMatrix {
    countries: Vec<String>,
    years: YearRange,
    /// Row-major, one row per country.
    cells: Vec<Scalar>,
}

impl MetricMatrix {
    /// Every cell starts Missing.
    pub fn new(countries: &[String], years: YearRange) -> Self {
        Self {
            countries: countries.to_vec(),
            years,
            cells: vec![Scalar::Missing; countries.len() * years.len()],
        }
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn years(&self) -> YearRange {
        self.years
    }

    /// First row for `country`.
    pub fn get(&self, country: &str, year: i32) -> Option<Scalar> {
        let row = self.countries.iter().position(|c| c == country)?;
        self.get_at(row, year)
    }

    pub fn get_at(&self, country_index: usize, year: i32) -> Option<Scalar> {
        let col = self.years.index_of(year)?;
        self.row(country_index).map(|r| r[col])
    }

    pub fn set_at(&mut self, country_index: usize, year: i32, value: Scalar) -> bool {
        let width = self.years.len();
        match self.years.index_of(year) {
            Some(col) if country_index < self.countries.len() => {
                self.cells[country_index * width + col] = value;
                true
            }
            _ => false,
        }
    }

    pub fn row(&self, country_index: usize) -> Option<&[Scalar]> {
        let width = self.years.len();
        self.cells.get(country_index * width..(country_index + 1) * width)
    }

    pub fn cells(&self) -> &[Scalar] {
        &self.cells
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }

    /// Country-major rows: all years of the first country, then the next.
    pub fn to_long_form(&self, value_label: &str) -> LongFormTable {
        let rows = self
            .countries
            .iter()
            .enumerate()
            .flat_map(|(ci, country)| {
                self.years.iter().map(move |year| (ci, country, year))
            })
            .enumerate()
            .map(|(index, (ci, country, year))| LongFormRow {
                index,
                country: country.clone(),
                year,
                value: self.get_at(ci, year).unwrap_or_default(),
            })
            .collect();
        LongFormTable { value_label: value_label.to_string(), rows }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongFormRow {
    pub index: usize,
    pub country: String,
    pub year: i32,
    pub value: Scalar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongFormTable {
    pub value_label: String,
    pub rows: Vec<LongFormRow>,
}

/// Collects per-workbook records into one matrix per metric.
#[derive(Debug)]
pub struct MatrixAssembler<K: MetricKey> {
    years: YearRange,
    keys: Vec<K>,
    matrices: BTreeMap<K, MetricMatrix>,
}

impl<K: MetricKey> MatrixAssembler<K> {
    pub fn new(countries: &[String], years: YearRange, keys: impl IntoIterator<Item = K>) -> Self {
        let keys: Vec<K> = keys.into_iter().collect();
        let matrices = keys.iter().map(|k| (*k, MetricMatrix::new(countries, years))).collect();
        Self { years, keys, matrices }
    }

    /// Write one workbook's values. Years outside the range are ignored.
    pub fn record<R: MetricRecord<Key = K>>(&mut self, country_index: usize, year: i32, record: &R) -> bool {
        if !self.years.contains(year) {
            log::debug!("year {year} outside {}..={}, ignored", self.years.start(), self.years.end());
            return false;
        }
        let mut written = false;
        for key in &self.keys {
            if let Some(matrix) = self.matrices.get_mut(key) {
                written |= matrix.set_at(country_index, year, record.value(*key));
            }
        }
        written
    }

    /// Matrices in metric catalogue order.
    pub fn finish(mut self) -> Vec<(K, MetricMatrix)> {
        self.keys
            .iter()
            .filter_map(|k| self.matrices.remove(k).map(|m| (*k, m)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Key {
        A,
        B,
    }

    impl MetricKey for Key {
        fn sheet_name(&self) -> String {
            format!("{self:?}")
        }
    }

    struct Fixed(f64);

    impl MetricRecord for Fixed {
        type Key = Key;

        fn value(&self, key: Key) -> Scalar {
            match key {
                Key::A => Scalar::Reported(self.0),
                Key::B => Scalar::Missing,
            }
        }
    }

    fn countries() -> Vec<String> {
        vec!["AUT".into(), "BEL".into()]
    }

    #[test]
    fn unfilled_cells_stay_missing() {
        let years = YearRange::new(1990, 1992).unwrap();
        let mut asm = MatrixAssembler::new(&countries(), years, [Key::B, Key::A]);
        assert!(asm.record(1, 1991, &Fixed(4.0)));
        assert!(!asm.record(0, 2005, &Fixed(9.0)));
        let out = asm.finish();

        assert_eq!(out[0].0, Key::B);
        let a = &out[1].1;
        assert_eq!(a.get("BEL", 1991), Some(Scalar::Reported(4.0)));
        assert_eq!(a.get("AUT", 1991), Some(Scalar::Missing));
        assert_eq!(a.missing_count(), 5);
        assert_eq!(out[0].1.missing_count(), 6);
    }

    #[test]
    fn long_form_is_country_major() {
        let years = YearRange::new(2000, 2001).unwrap();
        let mut m = MetricMatrix::new(&countries(), years);
        m.set_at(0, 2001, Scalar::Reported(1.0));
        m.set_at(1, 2000, Scalar::Reported(2.0));
        let long = m.to_long_form("HWP in use from domestic harvest (kt C)");

        let keys: Vec<(usize, &str, i32)> =
            long.rows.iter().map(|r| (r.index, r.country.as_str(), r.year)).collect();
        assert_eq!(
            keys,
            vec![(0, "AUT", 2000), (1, "AUT", 2001), (2, "BEL", 2000), (3, "BEL", 2001)]
        );
        assert_eq!(long.rows[0].value, Scalar::Missing);
        assert_eq!(long.rows[1].value, Scalar::Reported(1.0));
        assert_eq!(long.rows[2].value, Scalar::Reported(2.0));
    }

    #[test]
    fn duplicate_countries_keep_separate_rows() {
        let listed = vec!["AUT".to_string(), "AUT".to_string()];
        let years = YearRange::new(2000, 2000).unwrap();
        let mut asm = MatrixAssembler::new(&listed, years, [Key::A]);
        asm.record(1, 2000, &Fixed(3.0));
        let m = &asm.finish()[0].1;
        assert_eq!(m.get_at(0, 2000), Some(Scalar::Missing));
        assert_eq!(m.get_at(1, 2000), Some(Scalar::Reported(3.0)));
    }
}
