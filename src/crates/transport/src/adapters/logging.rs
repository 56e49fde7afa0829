use crate::traits::SignalSink;
use stashkit_core_types::StorageSignal;

/// Mirrors every signal into the `log` facade under the `stashkit::signal` target.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl SignalSink for LogSink {
    fn emit(&self, signal: StorageSignal) {
        match signal {
            StorageSignal::Warning { message } => {
                log::warn!(target: "stashkit::signal", "Storage warning: {}", message);
            }
            StorageSignal::Error { message } => {
                log::error!(target: "stashkit::signal", "Storage error: {}", message);
            }
            StorageSignal::SetItem {
                key,
                new_value,
                storage_type,
            } => {
                log::debug!(
                    target: "stashkit::signal",
                    "Item set: key={}, storage_type={}, bytes={}",
                    key,
                    storage_type,
                    new_value.as_ref().map(|v| v.len()).unwrap_or(0)
                );
            }
            StorageSignal::RemoveItem { key, storage_type } => {
                log::debug!(
                    target: "stashkit::signal",
                    "Item removed: key={}, storage_type={}",
                    key,
                    storage_type
                );
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
