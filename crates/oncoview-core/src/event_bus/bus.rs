//! Event bus.
//!
//! Handlers are called synchronously, in subscription order, on the
//! publishing thread. Async consumers take a `broadcast` receiver. An
//! optional bounded log keeps recent events for hosts that show an audit
//! trail.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Which events a handler receives
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventFilter {
    #[default]
    All,
    /// Any of these categories
    Categories(Vec<EventCategory>),
    /// Events about one patient
    Patient(String),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
            EventFilter::Patient(id) => event.patient_id() == Some(id.as_str()),
        }
    }
}

/// Bus tuning
#[derive(Debug, Clone, PartialEq)]
pub struct EventBusConfig {
    /// Capacity of the async broadcast channel
    pub channel_capacity: usize,
    /// Number of events kept in the log; `0` disables it
    pub log_capacity: usize,
    /// Events older than this are dropped from the log
    pub log_retention: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 128,
            log_capacity: 0,
            log_retention: Duration::from_secs(3600),
        }
    }
}

/// An event as kept in the bus log.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedEvent {
    /// Publish order, starting at 0 for the bus
    pub sequence: u64,
    pub at: Instant,
    pub event: AppEvent,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    #[error("No active subscribers")]
    NoSubscribers,
}

type Handler = Arc<dyn Fn(AppEvent) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Handler,
}

/// Publish/subscribe hub for [`AppEvent`]s.
pub struct EventBus {
    config: EventBusConfig,
    sender: broadcast::Sender<AppEvent>,
    subscriptions: RwLock<Vec<Subscription>>,
    log: Mutex<VecDeque<LoggedEvent>>,
    next_sequence: Mutex<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            log: Mutex::new(VecDeque::with_capacity(config.log_capacity)),
            config,
            sender,
            subscriptions: RwLock::new(Vec::new()),
            next_sequence: Mutex::new(0),
        }
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Deliver `event` to matching handlers and async receivers.
    ///
    /// Returns how many were reached. Fails with `NoSubscribers` only when
    /// there are no handlers and no receivers at all; the event is still
    /// logged. Handlers run on a snapshot taken before the first call, so
    /// they may publish, subscribe or unsubscribe; changes apply from the
    /// next publish.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        tracing::trace!("publish: {}", event.description());
        self.record(&event);

        let (handlers, idle): (Vec<Handler>, bool) = {
            let subscriptions = self.subscriptions.read();
            let matching = subscriptions
                .iter()
                .filter(|s| s.filter.matches(&event))
                .map(|s| s.handler.clone())
                .collect();
            (matching, subscriptions.is_empty())
        };
        for handler in &handlers {
            handler(event.clone());
        }
        let delivered = handlers.len();

        match self.sender.send(event) {
            Ok(receivers) => Ok(delivered + receivers),
            Err(_) if idle => Err(EventBusError::NoSubscribers),
            Err(_) => Ok(delivered),
        }
    }

    /// Register a handler. It runs on the publishing thread and should not
    /// block.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        tracing::debug!(%id, ?filter, "subscribed");
        self.subscriptions.write().push(Subscription {
            id,
            filter,
            handler: Arc::new(handler),
        });
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        let removed = subscriptions.len() != before;
        if removed {
            tracing::debug!(%id, "unsubscribed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Logged events matching `filter`, oldest first.
    pub fn logged(&self, filter: &EventFilter) -> Vec<LoggedEvent> {
        self.log
            .lock()
            .iter()
            .filter(|e| filter.matches(&e.event))
            .cloned()
            .collect()
    }

    pub fn clear_log(&self) {
        self.log.lock().clear();
    }

    fn record(&self, event: &AppEvent) {
        let sequence = {
            let mut next = self.next_sequence.lock();
            let sequence = *next;
            *next += 1;
            sequence
        };
        if self.config.log_capacity == 0 {
            return;
        }

        let now = Instant::now();
        let mut log = self.log.lock();
        while log
            .front()
            .is_some_and(|e| now.duration_since(e.at) > self.config.log_retention)
        {
            log.pop_front();
        }
        if log.len() == self.config.log_capacity {
            log.pop_front();
        }
        log.push_back(LoggedEvent {
            sequence,
            at: now,
            event: event.clone(),
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("config", &self.config)
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

static GLOBAL_BUS: OnceLock<EventBus> = OnceLock::new();

/// The process-wide bus, created with defaults on first use.
pub fn event_bus() -> &'static EventBus {
    GLOBAL_BUS.get_or_init(EventBus::new)
}

/// Create the process-wide bus with `config`. Fails, handing the config
/// back, once [`event_bus`] has already created it.
pub fn init_event_bus(config: EventBusConfig) -> Result<(), EventBusConfig> {
    GLOBAL_BUS
        .set(EventBus::with_config(config))
        .map_err(|bus| bus.config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{AccessibilityEvent, AuditEvent};
    use crate::model::AnalysisMode;

    fn opened(patient: &str) -> AppEvent {
        AppEvent::Audit(AuditEvent::VisualizationOpened {
            patient_id: patient.to_string(),
        })
    }

    fn mode_changed(patient: &str) -> AppEvent {
        AppEvent::Audit(AuditEvent::ModeChanged {
            patient_id: patient.to_string(),
            mode: AnalysisMode::Tumor,
        })
    }

    fn announcement(text: &str) -> AppEvent {
        AppEvent::Accessibility(AccessibilityEvent::Announcement {
            text: text.to_string(),
        })
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_to_nobody() {
        let bus = EventBus::new();
        assert!(matches!(
            bus.publish(opened("P-1")),
            Err(EventBusError::NoSubscribers)
        ));
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second"] {
            let order = order.clone();
            bus.subscribe(EventFilter::All, move |_| order.lock().push(name));
        }
        assert_eq!(bus.publish(announcement("Labels shown")).unwrap(), 2);
        assert_eq!(*order.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_handler_may_publish_and_subscribe() {
        let bus = Arc::new(EventBus::new());
        let echoes = Arc::new(Mutex::new(Vec::new()));

        let inner = bus.clone();
        bus.subscribe(EventFilter::Categories(vec![EventCategory::Audit]), move |event| {
            inner.subscribe(EventFilter::All, |_| {});
            let text = format!("Echo: {}", event.description());
            inner.publish(announcement(&text)).ok();
        });
        let seen = echoes.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Accessibility]),
            move |event| seen.lock().push(event),
        );

        assert_eq!(bus.publish(opened("P-3")).unwrap(), 1);
        assert_eq!(echoes.lock().len(), 1);
        assert_eq!(bus.subscriber_count(), 3);
    }

    #[test]
    fn test_filters() {
        let bus = EventBus::new();
        let audit = Arc::new(Mutex::new(0));
        let p2 = Arc::new(Mutex::new(0));

        let a = audit.clone();
        bus.subscribe(EventFilter::Categories(vec![EventCategory::Audit]), move |_| {
            *a.lock() += 1
        });
        let p = p2.clone();
        bus.subscribe(EventFilter::Patient("P-2".into()), move |_| *p.lock() += 1);

        bus.publish(opened("P-1")).unwrap();
        bus.publish(mode_changed("P-2")).unwrap();
        bus.publish(announcement("Switched to Tumor Morphology")).unwrap();

        assert_eq!(*audit.lock(), 2);
        assert_eq!(*p2.lock(), 1);
    }

    #[test]
    fn test_log_is_bounded_and_sequenced() {
        let bus = EventBus::with_config(EventBusConfig {
            log_capacity: 3,
            ..Default::default()
        });
        for pct in [10, 20, 30, 40] {
            bus.publish(announcement(&format!("Opacity set to {}%", pct)))
                .ok();
        }
        bus.publish(opened("P-7")).ok();

        let all = bus.logged(&EventFilter::All);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].sequence, 2);
        assert_eq!(all[0].event, announcement("Opacity set to 30%"));

        let trail = bus.logged(&EventFilter::Patient("P-7".into()));
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].sequence, 4);

        bus.clear_log();
        assert!(bus.logged(&EventFilter::All).is_empty());
    }

    #[test]
    fn test_log_disabled_by_default() {
        let bus = EventBus::new();
        bus.publish(opened("P-1")).ok();
        assert!(bus.logged(&EventFilter::All).is_empty());
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();
        assert_eq!(bus.publish(mode_changed("P-1")).unwrap(), 1);

        match receiver.recv().await {
            Ok(AppEvent::Audit(AuditEvent::ModeChanged { mode, .. })) => {
                assert_eq!(mode, AnalysisMode::Tumor)
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
