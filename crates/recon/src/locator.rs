use crate::model::Scalar;
use crate::pattern::LabelPattern;
use crate::table::Table;

/// Outcome of resolving a label pattern to row positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowMatch {
    /// Substring matching found exactly the expected number of rows.
    Literal(Vec<usize>),
    /// Substring matching was off; the code glob supplied the first
    /// `expected` of its matches.
    Fallback { rows: Vec<usize>, literal_count: usize },
    Unresolved { literal_count: usize, fallback_count: Option<usize> },
}

impl RowMatch {
    pub fn rows(&self) -> Option<&[usize]> {
        match self {
            Self::Literal(rows) | Self::Fallback { rows, .. } => Some(rows),
            Self::Unresolved { .. } => None,
        }
    }

    /// Row count that was actually observed, for mismatch reports.
    pub fn found(&self) -> usize {
        match self {
            Self::Literal(rows) => rows.len(),
            Self::Fallback { literal_count, .. } => *literal_count,
            Self::Unresolved { literal_count, fallback_count } => {
                fallback_count.unwrap_or(*literal_count)
            }
        }
    }
}

pub fn locate_rows(table: &Table, pattern: &LabelPattern) -> RowMatch {
    let candidates: Vec<(usize, &str)> = table
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(i, row)| row.label().map(|label| (i, label)))
        .filter(|(_, label)| !pattern.is_excluded(label))
        .collect();

    let literal: Vec<usize> =
        candidates.iter().filter(|(_, l)| pattern.matches(l)).map(|(i, _)| *i).collect();
    if literal.len() == pattern.expected() {
        return RowMatch::Literal(literal);
    }

    let fallback_count = match pattern.fallback_glob() {
        Some(Ok(glob)) => {
            let matched: Vec<usize> = candidates
                .iter()
                .filter(|(_, l)| LabelPattern::fallback_matches(&glob, l))
                .map(|(i, _)| *i)
                .collect();
            if matched.len() >= pattern.expected() {
                let rows = matched.into_iter().take(pattern.expected()).collect();
                return RowMatch::Fallback { rows, literal_count: literal.len() };
            }
            Some(matched.len())
        }
        Some(Err(e)) => {
            log::warn!("invalid code pattern for '{}': {e}", pattern.literal());
            None
        }
        None => None,
    };

    RowMatch::Unresolved { literal_count: literal.len(), fallback_count }
}

/// Values at `column` for every located row. An unresolved pattern yields
/// `expected` Missing values.
pub fn locate(table: &Table, pattern: &LabelPattern, column: usize) -> Vec<Scalar> {
    match locate_rows(table, pattern).rows() {
        Some(rows) => rows.iter().map(|&r| table.rows()[r].cell(column).to_scalar()).collect(),
        None => vec![Scalar::Missing; pattern.expected()],
    }
}
