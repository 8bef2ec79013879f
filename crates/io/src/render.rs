//! Lays a metric matrix out as output rows, shared by the xlsx and csv writers.

use invgrid_recon::model::MISSING_SENTINEL;
use invgrid_recon::{MetricMatrix, Scalar};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputShape {
    /// `index, country, year, <value>` per country-year, country-major.
    #[default]
    Long,
    /// One row per country, one column per year.
    Wide,
}

/// One output sheet (xlsx) or file (csv).
#[derive(Debug, Clone)]
pub struct OutputSheet<'a> {
    pub name: String,
    pub matrix: &'a MetricMatrix,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutCell {
    Blank,
    Text(String),
    Number(f64),
}

impl OutCell {
    fn value(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Reported(v) => Self::Number(v),
            Scalar::Missing => Self::Text(MISSING_SENTINEL.to_string()),
        }
    }

    pub fn to_field(&self) -> String {
        match self {
            Self::Blank => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(v) => v.to_string(),
        }
    }
}

/// Header row first.
pub fn render(matrix: &MetricMatrix, shape: OutputShape, value_label: &str) -> Vec<Vec<OutCell>> {
    match shape {
        OutputShape::Long => {
            let long = matrix.to_long_form(value_label);
            let mut rows = Vec::with_capacity(long.rows.len() + 1);
            rows.push(vec![
                OutCell::Blank,
                OutCell::Text("country".into()),
                OutCell::Text("year".into()),
                OutCell::Text(long.value_label.clone()),
            ]);
            rows.extend(long.rows.into_iter().map(|r| {
                vec![
                    OutCell::Number(r.index as f64),
                    OutCell::Text(r.country),
                    OutCell::Number(r.year as f64),
                    OutCell::value(r.value),
                ]
            }));
            rows
        }
        OutputShape::Wide => {
            let years = matrix.years();
            let mut header = vec![OutCell::Blank];
            header.extend(years.iter().map(|y| OutCell::Number(y as f64)));
            let mut rows = vec![header];
            for (ci, country) in matrix.countries().iter().enumerate() {
                let mut row = vec![OutCell::Text(country.clone())];
                if let Some(values) = matrix.row(ci) {
                    row.extend(values.iter().map(|v| OutCell::value(*v)));
                }
                rows.push(row);
            }
            rows
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invgrid_recon::YearRange;

    fn matrix() -> MetricMatrix {
        let countries = vec!["AUT".to_string(), "BEL".to_string()];
        let mut m = MetricMatrix::new(&countries, YearRange::new(2000, 2001).unwrap());
        m.set_at(0, 2000, Scalar::Reported(1.5));
        m.set_at(1, 2001, Scalar::Reported(0.0));
        m
    }

    fn fields(rows: &[Vec<OutCell>]) -> Vec<Vec<String>> {
        rows.iter().map(|r| r.iter().map(OutCell::to_field).collect()).collect()
    }

    #[test]
    fn long_layout() {
        let rows = render(&matrix(), OutputShape::Long, "value");
        assert_eq!(
            fields(&rows),
            vec![
                vec!["", "country", "year", "value"],
                vec!["0", "AUT", "2000", "1.5"],
                vec!["1", "AUT", "2001", "NaN"],
                vec!["2", "BEL", "2000", "NaN"],
                vec!["3", "BEL", "2001", "0"],
            ]
        );
    }

    #[test]
    fn wide_layout() {
        let rows = render(&matrix(), OutputShape::Wide, "ignored");
        assert_eq!(
            fields(&rows),
            vec![
                vec!["", "2000", "2001"],
                vec!["AUT", "1.5", "NaN"],
                vec!["BEL", "NaN", "0"],
            ]
        );
    }
}
