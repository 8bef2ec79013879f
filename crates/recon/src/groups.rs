//! Built-in country groups and the output-file prefix each one implies.

use serde::Deserialize;

use crate::error::ReconError;

pub const EU: &[&str] = &[
    "FIN", "AUT", "BEL", "BGR", "CYP", "CZE", "DEU", "DNK", "ESP", "EST", "FRA", "GRC", "HRV",
    "HUN", "IRL", "ITA", "LTU", "LUX", "LVA", "MLT", "NLD", "POL", "PRT", "ROU", "SVK", "SVN",
    "SWE",
];

/// Added to the EU list by the extended group.
pub const EU_EXTENSION: &[&str] = &["GBR", "ISL", "NOR"];

pub const NON_EU: &[&str] = &[
    "CAN", "CHE", "EUA", "GBR", "ISL", "JPN", "LIE", "MCO", "NOR", "RUS", "TUR", "USA",
];

/// Non-EU parties with reporting gaps.
pub const NON_EU_WITH_GAPS: &[&str] = &[
    "EUA", "CAN", "CHE", "GBR", "ISL", "JPN", "LIE", "MCO", "NOR", "RUS", "TUR",
];

/// EU members with reporting gaps (no HUN, no CYP).
pub const EU_WITH_GAPS: &[&str] = &[
    "FIN", "AUT", "BEL", "BGR", "CZE", "DEU", "DNK", "ESP", "EST", "FRA", "GRC", "HRV", "IRL",
    "ITA", "LTU", "LUX", "LVA", "MLT", "NLD", "POL", "PRT", "ROU", "SVK", "SVN", "SWE",
];

/// Optional replacements for the built-in lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CountryGroupsConfig {
    pub eu: Option<Vec<String>>,
    pub eu_plus: Option<Vec<String>>,
    pub all: Option<Vec<String>>,
    pub all_with_gaps: Option<Vec<String>>,
    pub all_with_gaps_no_eua: Option<Vec<String>>,
}

impl CountryGroupsConfig {
    pub fn validate(&self) -> Result<(), ReconError> {
        let lists = [
            ("eu", &self.eu),
            ("eu_plus", &self.eu_plus),
            ("all", &self.all),
            ("all_with_gaps", &self.all_with_gaps),
            ("all_with_gaps_no_eua", &self.all_with_gaps_no_eua),
        ];
        for (name, list) in lists {
            let Some(codes) = list else { continue };
            if codes.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "country_groups.{name} must not be empty"
                )));
            }
            if codes.iter().any(|c| c.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "country_groups.{name} contains an empty code"
                )));
            }
        }
        Ok(())
    }
}

/// Which countries a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryGroup {
    Eu,
    EuPlus,
    All,
    AllWithGaps,
    AllWithGapsNoEua,
    /// Codes given on the command line, in the order given.
    Explicit(Vec<String>),
    /// Every country directory found under the input directory.
    Directory { name: String, countries: Vec<String> },
}

impl CountryGroup {
    /// Parse a group name as used in config files and logs.
    pub fn named(name: &str) -> Result<Self, ReconError> {
        match name.to_ascii_lowercase().as_str() {
            "eu" => Ok(Self::Eu),
            "eu_plus" | "euplus" => Ok(Self::EuPlus),
            "all" => Ok(Self::All),
            "all_with_gaps" | "amissing" => Ok(Self::AllWithGaps),
            "all_with_gaps_no_eua" | "amissingnoeua" => Ok(Self::AllWithGapsNoEua),
            _ => Err(ReconError::UnknownCountryGroup(name.to_string())),
        }
    }

    pub fn countries(&self, overrides: &CountryGroupsConfig) -> Vec<String> {
        let pick = |custom: &Option<Vec<String>>, builtin: Vec<&str>| match custom {
            Some(list) => list.clone(),
            None => builtin.into_iter().map(str::to_string).collect(),
        };
        match self {
            Self::Eu => pick(&overrides.eu, EU.to_vec()),
            Self::EuPlus => pick(&overrides.eu_plus, [EU, EU_EXTENSION].concat()),
            Self::All => pick(&overrides.all, [EU, NON_EU].concat()),
            Self::AllWithGaps => {
                pick(&overrides.all_with_gaps, [NON_EU_WITH_GAPS, EU_WITH_GAPS].concat())
            }
            Self::AllWithGapsNoEua => {
                let no_eua: Vec<&str> =
                    NON_EU_WITH_GAPS.iter().copied().filter(|c| *c != "EUA").collect();
                pick(&overrides.all_with_gaps_no_eua, [no_eua.as_slice(), EU_WITH_GAPS].concat())
            }
            Self::Explicit(codes) => codes.clone(),
            Self::Directory { countries, .. } => countries.clone(),
        }
    }

    /// Leading part of output file names.
    pub fn file_prefix(&self) -> String {
        match self {
            Self::Eu => "EU".into(),
            Self::EuPlus => "EU_GBR_ISL_NOR".into(),
            Self::All => "EU_and_Others".into(),
            Self::AllWithGaps => "all_countries".into(),
            Self::AllWithGapsNoEua => "all_countries_no_EUA".into(),
            Self::Explicit(codes) => codes.join("_"),
            Self::Directory { name, .. } => name.clone(),
        }
    }
}

impl std::fmt::Display for CountryGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eu => write!(f, "eu"),
            Self::EuPlus => write!(f, "eu_plus"),
            Self::All => write!(f, "all"),
            Self::AllWithGaps => write!(f, "all_with_gaps"),
            Self::AllWithGapsNoEua => write!(f, "all_with_gaps_no_eua"),
            Self::Explicit(codes) => write!(f, "countries({})", codes.join(",")),
            Self::Directory { name, .. } => write!(f, "directory({name})"),
        }
    }
}
