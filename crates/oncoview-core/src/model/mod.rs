//! Anatomical entity model
//!
//! Plain data describing body regions, tumors and radiation sample points,
//! plus the session view state. All types are validated on construction of
//! an [`EntityModel`] and never mutated afterwards.

pub mod color;
pub mod entity_model;
pub mod ids;
pub mod mode;
pub mod patient;
pub mod presets;
pub mod radiation;
pub mod region;
pub mod tumor;
pub mod view_state;

pub use color::Rgb;
pub use entity_model::{ClinicalSnapshot, EntityModel, EntityRef};
pub use ids::{EntityId, EntityKind};
pub use mode::AnalysisMode;
pub use patient::PatientContext;
pub use presets::reference_anatomy;
pub use radiation::RadiationSample;
pub use region::AnatomicalRegion;
pub use tumor::Tumor;
pub use view_state::{ViewState, MAX_OPACITY_SCALE, MIN_OPACITY_SCALE};
