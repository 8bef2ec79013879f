use glob::{MatchOptions, Pattern, PatternError};

/// Case-sensitive, so a code glob such as `4.G*1*Solid wood*` never matches
/// a lowercase free-text label.
const FALLBACK_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Describes how a row label is recognised in a reporting table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPattern {
    literal: String,
    case_sensitive: bool,
    exclude_prefixes: Vec<String>,
    expected: usize,
    fallback: Option<String>,
}

impl LabelPattern {
    /// Case-insensitive substring pattern expecting one row; footnote rows
    /// (leading `(`) never qualify.
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            case_sensitive: false,
            exclude_prefixes: vec!["(".to_string()],
            expected: 1,
            fallback: None,
        }
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn expecting(mut self, rows: usize) -> Self {
        self.expected = rows;
        self
    }

    /// Code prefix glob tried when literal matching is ambiguous. The final
    /// pattern is `<prefix><literal>*`.
    pub fn with_fallback(mut self, prefix: impl Into<String>) -> Self {
        self.fallback = Some(prefix.into());
        self
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    pub fn is_excluded(&self, label: &str) -> bool {
        let label = label.trim_start();
        self.exclude_prefixes.iter().any(|p| label.starts_with(p.as_str()))
    }

    pub fn matches(&self, label: &str) -> bool {
        if self.case_sensitive {
            label.contains(&self.literal)
        } else {
            label.to_lowercase().contains(&self.literal.to_lowercase())
        }
    }

    pub fn fallback_glob(&self) -> Option<Result<Pattern, PatternError>> {
        self.fallback
            .as_ref()
            .map(|prefix| Pattern::new(&format!("{prefix}{}*", Pattern::escape(&self.literal))))
    }

    pub(crate) fn fallback_matches(glob: &Pattern, label: &str) -> bool {
        glob.matches_with(label, FALLBACK_MATCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_case_insensitive_substring() {
        let p = LabelPattern::new("Solid wood");
        assert!(p.matches("4.G 1.  SOLID WOOD"));
        assert!(!p.matches("Sawnwood"));
        assert_eq!(p.expected(), 1);
    }

    #[test]
    fn case_sensitive_probe() {
        let p = LabelPattern::new("TOTAL HWP").case_sensitive(true);
        assert!(p.matches("TOTAL HWP IN USE"));
        assert!(!p.matches("Total HWP"));
    }

    #[test]
    fn footnote_prefix_excluded() {
        let p = LabelPattern::new("Other");
        assert!(p.is_excluded("  (3) Other means"));
        assert!(!p.is_excluded("Other"));
    }

    #[test]
    fn fallback_glob_escapes_literal() {
        let p = LabelPattern::new("Paper and paperboard").with_fallback("4.G*2*");
        let glob = p.fallback_glob().unwrap().unwrap();
        assert!(LabelPattern::fallback_matches(&glob, "4.G 2  Paper and paperboard (a)"));
        assert!(!LabelPattern::fallback_matches(&glob, "4.G 2  paper and paperboard"));
        assert!(!LabelPattern::fallback_matches(&glob, "Paper and paperboard"));

        let odd = LabelPattern::new("Other [m3]").with_fallback("4.G*3*");
        let glob = odd.fallback_glob().unwrap().unwrap();
        assert!(LabelPattern::fallback_matches(&glob, "4.G 3 Other [m3] total"));
    }

    #[test]
    fn no_fallback_configured() {
        assert!(LabelPattern::new("Total").fallback_glob().is_none());
    }
}
