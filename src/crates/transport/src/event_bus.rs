//! Fan-out of storage signals to several sinks.

use crate::traits::SignalSink;
use stashkit_core_types::StorageSignal;
use std::sync::{Arc, RwLock};

/// Delivery order for subscribers; higher priorities receive a signal first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventPriority {
    Low = 0,
    Normal = 1,
    High = 2,
}

struct Subscriber {
    priority: EventPriority,
    /// Only diagnostics (warning/error) are delivered when set.
    diagnostics_only: bool,
    sink: Arc<dyn SignalSink>,
}

/// Broadcasts each signal to every subscribed sink.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, sink: Arc<dyn SignalSink>, priority: EventPriority) {
        self.insert(Subscriber {
            priority,
            diagnostics_only: false,
            sink,
        });
    }

    /// Subscribe to warning and error signals only.
    pub fn subscribe_diagnostics(&self, sink: Arc<dyn SignalSink>, priority: EventPriority) {
        self.insert(Subscriber {
            priority,
            diagnostics_only: true,
            sink,
        });
    }

    fn insert(&self, subscriber: Subscriber) {
        let Ok(mut subscribers) = self.subscribers.write() else {
            log::warn!("Event bus lock poisoned, dropping subscriber");
            return;
        };
        // Stable: equal priorities keep subscription order.
        let pos = subscribers
            .iter()
            .position(|s| s.priority < subscriber.priority)
            .unwrap_or(subscribers.len());
        log::debug!(
            "Event bus subscriber added: sink={}, priority={:?}",
            subscriber.sink.name(),
            subscriber.priority
        );
        subscribers.insert(pos, subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().map(|s| s.len()).unwrap_or(0)
    }
}

impl SignalSink for EventBus {
    fn emit(&self, signal: StorageSignal) {
        let Ok(subscribers) = self.subscribers.read() else {
            return;
        };
        for subscriber in subscribers.iter() {
            if subscriber.diagnostics_only && !signal.is_diagnostic() {
                continue;
            }
            subscriber.sink.emit(signal.clone());
        }
    }

    fn name(&self) -> &str {
        "event-bus"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySink;
    use stashkit_core_types::StorageType;
    use std::sync::Mutex;

    #[test]
    fn delivers_to_every_subscriber() {
        let bus = EventBus::new();
        let a = Arc::new(MemorySink::new());
        let b = Arc::new(MemorySink::new());
        bus.subscribe(a.clone(), EventPriority::Normal);
        bus.subscribe(b.clone(), EventPriority::Low);

        bus.emit(StorageSignal::warning("w"));

        assert_eq!(a.signals().len(), 1);
        assert_eq!(b.signals().len(), 1);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn diagnostics_only_skips_item_signals() {
        let bus = EventBus::new();
        let diag = Arc::new(MemorySink::new());
        bus.subscribe_diagnostics(diag.clone(), EventPriority::Normal);

        bus.emit(StorageSignal::RemoveItem {
            key: "k".to_string(),
            storage_type: StorageType::LocalStorage,
        });
        bus.emit(StorageSignal::error("quota"));

        assert_eq!(diag.errors(), vec!["quota".to_string()]);
        assert_eq!(diag.signals().len(), 1);
    }

    #[test]
    fn higher_priority_runs_first() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let low = order.clone();
        bus.subscribe(
            Arc::new(move |_s: StorageSignal| low.lock().unwrap().push("low")),
            EventPriority::Low,
        );
        let high = order.clone();
        bus.subscribe(
            Arc::new(move |_s: StorageSignal| high.lock().unwrap().push("high")),
            EventPriority::High,
        );

        bus.emit(StorageSignal::warning("w"));
        assert_eq!(*order.lock().unwrap(), vec!["high", "low"]);
    }
}
