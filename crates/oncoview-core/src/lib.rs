//! # OncoView Core
//!
//! Core types for the OncoView visualization: the validated anatomical
//! entity model, view state, error types, the event bus and the outbound
//! collaborator interfaces.

pub mod collaborators;
pub mod error;
pub mod event_bus;
pub mod model;
pub mod types;

pub use collaborators::{Announcer, AuditSink, EventBusBridge};

pub use error::{Error, Result, ValidationError, VisualizationError};

pub use event_bus::{
    event_bus, init_event_bus, AccessibilityEvent, AppEvent, AuditEvent, EventBus, EventBusConfig,
    EventBusError, EventCategory, EventFilter, LoggedEvent, SubscriptionId,
};

pub use model::{
    reference_anatomy, AnalysisMode, AnatomicalRegion, ClinicalSnapshot, EntityId, EntityKind,
    EntityModel, EntityRef, PatientContext, RadiationSample, Rgb, Tumor, ViewState,
    MAX_OPACITY_SCALE, MIN_OPACITY_SCALE,
};

pub use types::{SharedAnnouncer, SharedAuditSink};
