//! Collaborator handles shared between the shell and its host.
//!
//! The visualization runs on a single UI thread, so handles are `Rc`
//! rather than `Arc`. A single value may implement both collaborator
//! traits and be passed as both handles.

use std::rc::Rc;

use crate::collaborators::{Announcer, AuditSink};

/// Audit collaborator handle held by the shell.
pub type SharedAuditSink = Rc<dyn AuditSink>;

/// Announcement collaborator handle held by the shell.
pub type SharedAnnouncer = Rc<dyn Announcer>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalysisMode;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counter {
        calls: Cell<u32>,
    }

    impl AuditSink for Counter {
        fn on_open(&self, _patient_id: &str) {
            self.calls.set(self.calls.get() + 1);
        }

        fn on_mode_change(&self, _patient_id: &str, _mode: AnalysisMode) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    impl Announcer for Counter {
        fn announce(&self, _text: &str) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    #[test]
    fn test_one_value_serves_both_handles() {
        let counter = Rc::new(Counter::default());
        let audit: SharedAuditSink = counter.clone();
        let announcer: SharedAnnouncer = counter.clone();

        audit.on_open("P-1");
        audit.on_mode_change("P-1", AnalysisMode::Tumor);
        announcer.announce("hello");
        assert_eq!(counter.calls.get(), 3);
    }
}
