use serde::Deserialize;

use crate::error::ReconError;
use crate::extract::Category;
use crate::groups::CountryGroupsConfig;
use crate::layout::LayoutOverrides;
use crate::schedule::YearStrategy;
use crate::transition::LandClass;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Every section is optional; an empty file yields the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub hwp: HwpConfig,
    pub land_transition: LandTransitionConfig,
    pub discovery: DiscoveryConfig,
    pub years: YearsConfig,
    pub layout_overrides: LayoutOverrides,
    pub country_groups: CountryGroupsConfig,
}

// ---------------------------------------------------------------------------
// Harvested wood products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HwpConfig {
    pub sheet: String,
    /// Header rows consumed before the table body.
    pub skip_rows: usize,
    /// Case-sensitive probe for the aggregate-only layout.
    pub total_label: String,
    pub generic_total_label: String,
    /// Label opening the exported block of domestic-inclusive tables.
    pub exported_marker: String,
    pub gains_column: usize,
    pub losses_column: usize,
    /// Value column header in long-form output.
    pub value_label: String,
    pub categories: Vec<CategoryConfig>,
}

impl Default for HwpConfig {
    fn default() -> Self {
        Self {
            sheet: "Table4.Gs1".into(),
            skip_rows: 1,
            total_label: "TOTAL HWP".into(),
            generic_total_label: "Total".into(),
            exported_marker: "exported".into(),
            gains_column: 1,
            losses_column: 2,
            value_label: "HWP in use from domestic harvest (kt C)".into(),
            categories: [Category::SolidWood, Category::PaperAndPaperboard, Category::Other]
                .into_iter()
                .map(|category| CategoryConfig {
                    category,
                    label: category.label().into(),
                    fallback: category.code_glob().map(str::to_string),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    pub category: Category,
    pub label: String,
    /// Code prefix glob, e.g. `4.G*1*`.
    #[serde(default)]
    pub fallback: Option<String>,
}

// ---------------------------------------------------------------------------
// Land transition matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LandTransitionConfig {
    pub sheet: String,
    pub skip_rows: usize,
    /// Sheet column holding the origin labels (0-based, B = 1).
    pub first_column: usize,
    pub last_column: usize,
    pub value_label: String,
    pub classes: Vec<LandClassConfig>,
}

impl Default for LandTransitionConfig {
    fn default() -> Self {
        Self {
            sheet: "Table4.1".into(),
            skip_rows: 8,
            first_column: 1,
            last_column: 12,
            value_label: "Area (kha)".into(),
            classes: LandClass::ALL
                .iter()
                .map(|&class| LandClassConfig { class, label: class.label().into() })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LandClassConfig {
    pub class: LandClass,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Discovery + years
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File name glob inside each country directory.
    pub include: String,
    /// File name globs removed from the included set.
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include: "[A-Za-z]*.xlsx".into(),
            exclude: vec!["*[_,-]198??*.xlsx".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct YearsConfig {
    pub strategy: YearStrategy,
}

// ---------------------------------------------------------------------------
// Parse + validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        self.validate_hwp()?;
        self.validate_land_transition()?;

        compile_glob("discovery.include", &self.discovery.include)?;
        for pattern in &self.discovery.exclude {
            compile_glob("discovery.exclude", pattern)?;
        }

        for (code, _) in self.layout_overrides.iter() {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(invalid(&format!(
                    "layout_overrides: '{code}' is not a three-letter country code"
                )));
            }
        }
        self.country_groups.validate()
    }

    fn validate_hwp(&self) -> Result<(), ReconError> {
        let hwp = &self.hwp;
        non_empty("hwp.sheet", &hwp.sheet)?;
        non_empty("hwp.total_label", &hwp.total_label)?;
        non_empty("hwp.generic_total_label", &hwp.generic_total_label)?;
        non_empty("hwp.exported_marker", &hwp.exported_marker)?;

        // Column 0 is the label column.
        if hwp.gains_column == 0 || hwp.losses_column == 0 {
            return Err(invalid("hwp value columns must be >= 1 (column 0 holds labels)"));
        }
        if hwp.gains_column == hwp.losses_column {
            return Err(invalid("hwp.gains_column and hwp.losses_column must differ"));
        }

        for required in [Category::SolidWood, Category::PaperAndPaperboard, Category::Other] {
            let count = hwp.categories.iter().filter(|c| c.category == required).count();
            if count != 1 {
                return Err(invalid(&format!(
                    "hwp.categories must list '{required}' exactly once, found {count}"
                )));
            }
        }
        for category in &hwp.categories {
            if category.category == Category::Hwp {
                return Err(invalid("hwp.categories: 'hwp' is the table total, not a category"));
            }
            non_empty("hwp.categories.label", &category.label)?;
            if let Some(prefix) = &category.fallback {
                compile_glob("hwp.categories.fallback", &format!("{prefix}*"))?;
            }
        }
        Ok(())
    }

    fn validate_land_transition(&self) -> Result<(), ReconError> {
        let land = &self.land_transition;
        non_empty("land_transition.sheet", &land.sheet)?;
        if land.first_column > land.last_column {
            return Err(invalid("land_transition.first_column is after last_column"));
        }
        // Label column plus one column per destination class.
        let width = land.last_column - land.first_column + 1;
        if width <= LandClass::ALL.len() {
            return Err(invalid(&format!(
                "land_transition column window holds {width} column(s), need at least {}",
                LandClass::ALL.len() + 1
            )));
        }
        for class in LandClass::ALL {
            let count = land.classes.iter().filter(|c| c.class == class).count();
            if count > 1 {
                return Err(invalid(&format!(
                    "land_transition.classes lists '{class}' {count} times"
                )));
            }
        }
        for class in &land.classes {
            non_empty("land_transition.classes.label", &class.label)?;
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> ReconError {
    ReconError::ConfigValidation(msg.to_string())
}

fn non_empty(field: &str, value: &str) -> Result<(), ReconError> {
    if value.trim().is_empty() {
        return Err(invalid(&format!("{field} must not be empty")));
    }
    Ok(())
}

fn compile_glob(field: &str, pattern: &str) -> Result<(), ReconError> {
    glob::Pattern::new(pattern)
        .map(|_| ())
        .map_err(|e| invalid(&format!("{field}: bad pattern '{pattern}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutOverride;

    const FULL: &str = r#"
[hwp]
sheet = "Table4.Gs1"
skip_rows = 1
total_label = "TOTAL HWP"
generic_total_label = "Total"
exported_marker = "exported"
gains_column = 1
losses_column = 2

[[hwp.categories]]
category = "solid_wood"
label = "Solid wood"
fallback = "4.G*1*"

[[hwp.categories]]
category = "paper_and_paperboard"
label = "Paper and paperboard"
fallback = "4.G*2*"

[[hwp.categories]]
category = "other"
label = "Other"

[land_transition]
sheet = "Table4.1"
skip_rows = 8

[discovery]
include = "[A-Za-z]*.xlsx"
exclude = ["*[_,-]198??*.xlsx", "*draft*"]

[years]
strategy = "positional"

[layout_overrides]
ITA = "domestic_inclusive"
ESP = "domestic_inclusive"

[country_groups]
eu = ["AUT", "BEL"]
"#;

    #[test]
    fn empty_config_is_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.hwp.sheet, "Table4.Gs1");
        assert_eq!(config.hwp.categories.len(), 3);
        assert_eq!(config.hwp.categories[0].fallback.as_deref(), Some("4.G*1*"));
        assert_eq!(config.land_transition.classes.len(), 9);
        assert_eq!(config.land_transition.skip_rows, 8);
        assert_eq!(config.years.strategy, YearStrategy::Filename);
        assert_eq!(config.layout_overrides.get("ITA"), Some(LayoutOverride::DomesticInclusive));
    }

    #[test]
    fn parse_full() {
        let config = ReconConfig::from_toml(FULL).unwrap();
        assert!(config.hwp.categories[2].fallback.is_none());
        assert_eq!(config.discovery.exclude.len(), 2);
        assert_eq!(config.years.strategy, YearStrategy::Positional);
        assert_eq!(config.layout_overrides.get("esp"), Some(LayoutOverride::DomesticInclusive));
        assert_eq!(config.country_groups.eu.as_deref(), Some(&["AUT".to_string(), "BEL".to_string()][..]));
    }

    #[test]
    fn rejects_same_value_column() {
        let err = ReconConfig::from_toml("[hwp]\ngains_column = 2\nlosses_column = 2\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_label_column_as_value() {
        let err = ReconConfig::from_toml("[hwp]\ngains_column = 0\n").unwrap_err();
        assert!(err.to_string().contains(">= 1"));
    }

    #[test]
    fn rejects_missing_category() {
        let input = r#"
[[hwp.categories]]
category = "solid_wood"
label = "Solid wood"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("Paper and paperboard"), "{err}");
    }

    #[test]
    fn rejects_narrow_land_window() {
        let err = ReconConfig::from_toml("[land_transition]\nlast_column = 5\n").unwrap_err();
        assert!(err.to_string().contains("column window"), "{err}");
    }

    #[test]
    fn rejects_bad_glob() {
        let err = ReconConfig::from_toml("[discovery]\ninclude = \"[*.xlsx\"\n").unwrap_err();
        assert!(err.to_string().contains("discovery.include"), "{err}");
    }

    #[test]
    fn rejects_bad_override_code() {
        let err = ReconConfig::from_toml("[layout_overrides]\nITALY = \"domestic_inclusive\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("ITALY"), "{err}");
    }

    #[test]
    fn rejects_unknown_strategy() {
        let err = ReconConfig::from_toml("[years]\nstrategy = \"guess\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
