//! Analysis modes.

use serde::{Deserialize, Serialize};

/// One of the three mutually exclusive visualization lenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Radiation dosimetry
    #[default]
    Radiation,
    /// Tissue-damage assessment
    Damage,
    /// Tumor morphology
    Tumor,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 3] = [
        AnalysisMode::Radiation,
        AnalysisMode::Damage,
        AnalysisMode::Tumor,
    ];

    /// Panel heading for this mode.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Radiation => "Radiation Dosimetry",
            Self::Damage => "Tissue Damage Assessment",
            Self::Tumor => "Tumor Morphology",
        }
    }
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Radiation => write!(f, "radiation"),
            Self::Damage => write!(f, "damage"),
            Self::Tumor => write!(f, "tumor"),
        }
    }
}

impl std::str::FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "radiation" => Ok(Self::Radiation),
            "damage" => Ok(Self::Damage),
            "tumor" | "tumors" => Ok(Self::Tumor),
            other => Err(format!("unknown analysis mode '{}'", other)),
        }
    }
}
