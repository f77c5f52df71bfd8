//! Outbound collaborator interfaces
//!
//! The visualization never stores audit records or talks to assistive
//! technology itself. It calls these traits; the host supplies the
//! implementation. [`EventBusBridge`] forwards both to the event bus.

use std::sync::Arc;

use crate::event_bus::{event_bus, AccessibilityEvent, AppEvent, AuditEvent, EventBus};
use crate::model::AnalysisMode;

/// Audit trail collaborator
pub trait AuditSink {
    /// Called once when a visualization session opens
    fn on_open(&self, patient_id: &str);

    /// Called on every real mode transition
    fn on_mode_change(&self, patient_id: &str, mode: AnalysisMode);
}

/// Accessibility announcement collaborator
pub trait Announcer {
    /// Called on every user-visible state change
    fn announce(&self, text: &str);
}

/// Forwards collaborator calls to an [`EventBus`] as [`AppEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct EventBusBridge {
    bus: Option<Arc<EventBus>>,
}

impl EventBusBridge {
    /// Bridge to the global event bus
    pub fn global() -> Self {
        Self { bus: None }
    }

    /// Bridge to a specific bus
    pub fn with_bus(bus: Arc<EventBus>) -> Self {
        Self { bus: Some(bus) }
    }

    fn publish(&self, event: AppEvent) {
        let bus = match &self.bus {
            Some(bus) => bus.as_ref(),
            None => event_bus(),
        };
        if let Err(e) = bus.publish(event) {
            tracing::trace!("event dropped: {}", e);
        }
    }
}

impl AuditSink for EventBusBridge {
    fn on_open(&self, patient_id: &str) {
        tracing::info!(patient_id, "audit: visualization opened");
        self.publish(AppEvent::Audit(AuditEvent::VisualizationOpened {
            patient_id: patient_id.to_string(),
        }));
    }

    fn on_mode_change(&self, patient_id: &str, mode: AnalysisMode) {
        tracing::info!(patient_id, %mode, "audit: analysis mode changed");
        self.publish(AppEvent::Audit(AuditEvent::ModeChanged {
            patient_id: patient_id.to_string(),
            mode,
        }));
    }
}

impl Announcer for EventBusBridge {
    fn announce(&self, text: &str) {
        tracing::debug!("announce: {}", text);
        self.publish(AppEvent::Accessibility(AccessibilityEvent::Announcement {
            text: text.to_string(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::{EventCategory, EventFilter};
    use parking_lot::Mutex;

    #[test]
    fn test_bridge_publishes_audit_and_announcements() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Audit, EventCategory::Accessibility]),
            move |event| sink.lock().push(event),
        );

        let bridge = EventBusBridge::with_bus(bus);
        bridge.on_open("P-7");
        bridge.on_mode_change("P-7", AnalysisMode::Damage);
        bridge.announce("Switched to damage analysis");

        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[1],
            AppEvent::Audit(AuditEvent::ModeChanged {
                patient_id: "P-7".to_string(),
                mode: AnalysisMode::Damage
            })
        );
    }
}
