//! Patient identity consumed as read-only context.

use serde::{Deserialize, Serialize};

/// Patient identity record supplied by the host dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientContext {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub condition: String,
}

impl PatientContext {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        age: u32,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
            condition: condition.into(),
        }
    }
}

impl std::fmt::Display for PatientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.age, self.condition)
    }
}
