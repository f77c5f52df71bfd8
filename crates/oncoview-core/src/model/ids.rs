//! Entity identifiers.

use serde::{Deserialize, Serialize};

/// Unique identifier of a region, tumor or radiation sample.
///
/// Ids are unique across all entity collections of one model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Entity kind, used for tagging primitives and summary rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Anatomical region
    Region,
    /// Tumor
    Tumor,
    /// Radiation dose sample
    RadiationSample,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Region => write!(f, "Region"),
            Self::Tumor => write!(f, "Tumor"),
            Self::RadiationSample => write!(f, "Radiation sample"),
        }
    }
}
