//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so a host can log or replay them.

use serde::{Deserialize, Serialize};

use crate::model::AnalysisMode;

/// Root event enum for all visualization events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Audit trail entries
    Audit(AuditEvent),
    /// Screen-reader announcements
    Accessibility(AccessibilityEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Audit(_) => EventCategory::Audit,
            AppEvent::Accessibility(_) => EventCategory::Accessibility,
        }
    }

    /// Patient the event concerns, if any
    pub fn patient_id(&self) -> Option<&str> {
        match self {
            AppEvent::Audit(AuditEvent::VisualizationOpened { patient_id })
            | AppEvent::Audit(AuditEvent::ModeChanged { patient_id, .. }) => Some(patient_id),
            AppEvent::Accessibility(_) => None,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Audit(e) => e.description(),
            AppEvent::Accessibility(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Audit trail events.
    Audit,
    /// Accessibility announcements.
    Accessibility,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Audit => write!(f, "Audit"),
            EventCategory::Accessibility => write!(f, "Accessibility"),
        }
    }
}

/// Audit trail events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuditEvent {
    /// The 3D view was opened.
    VisualizationOpened {
        /// Patient id.
        patient_id: String,
    },
    /// The analysis mode changed.
    ModeChanged {
        /// Patient id.
        patient_id: String,
        /// New mode.
        mode: AnalysisMode,
    },
}

impl AuditEvent {
    pub fn description(&self) -> String {
        match self {
            AuditEvent::VisualizationOpened { patient_id } => {
                format!("Audit: 3D visualization opened for {}", patient_id)
            }
            AuditEvent::ModeChanged { patient_id, mode } => {
                format!("Audit: {} switched to {} mode", patient_id, mode)
            }
        }
    }
}

/// Accessibility events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccessibilityEvent {
    /// Text to be read by assistive technology.
    Announcement {
        /// Announcement text.
        text: String,
    },
}

impl AccessibilityEvent {
    pub fn description(&self) -> String {
        match self {
            AccessibilityEvent::Announcement { text } => format!("Announce: {}", text),
        }
    }
}
