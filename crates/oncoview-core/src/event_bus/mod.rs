//! # Event Bus Module
//!
//! Publish/subscribe bus decoupling the visualization core from the host
//! dashboard's audit log and accessibility services.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oncoview_core::event_bus::{event_bus, AppEvent, AuditEvent, EventCategory, EventFilter};
//!
//! let subscription = event_bus().subscribe(
//!     EventFilter::Categories(vec![EventCategory::Audit]),
//!     |event| {
//!         if let AppEvent::Audit(entry) = event {
//!             println!("audit: {:?}", entry);
//!         }
//!     },
//! );
//!
//! event_bus().publish(AppEvent::Audit(AuditEvent::VisualizationOpened {
//!     patient_id: "P-001".to_string(),
//! }));
//!
//! event_bus().unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
