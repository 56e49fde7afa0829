use crate::traits::SignalSink;
use stashkit_core_types::StorageSignal;
use std::sync::Mutex;

/// Records every signal it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    signals: Mutex<Vec<StorageSignal>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn signals(&self) -> Vec<StorageSignal> {
        self.signals
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Drain recorded signals.
    pub fn take(&self) -> Vec<StorageSignal> {
        self.signals
            .lock()
            .map(|mut s| std::mem::take(&mut *s))
            .unwrap_or_default()
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.signals().iter().filter(|s| s.name() == name).count()
    }

    pub fn errors(&self) -> Vec<String> {
        self.signals()
            .into_iter()
            .filter_map(|s| match s {
                StorageSignal::Error { message } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.signals()
            .into_iter()
            .filter_map(|s| match s {
                StorageSignal::Warning { message } => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl SignalSink for MemorySink {
    fn emit(&self, signal: StorageSignal) {
        if let Ok(mut signals) = self.signals.lock() {
            signals.push(signal);
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SignalSink for NullSink {
    fn emit(&self, _signal: StorageSignal) {}

    fn name(&self) -> &str {
        "null"
    }
}
