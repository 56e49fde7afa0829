use stashkit_core_types::StorageSignal;

/// Receiver of storage signals.
///
/// Emission is fire-and-forget: implementations must not block and must not
/// report failures back to the emitter.
pub trait SignalSink: Send + Sync {
    fn emit(&self, signal: StorageSignal);

    /// Adapter name, used in diagnostics.
    fn name(&self) -> &str {
        "sink"
    }
}

impl<F> SignalSink for F
where
    F: Fn(StorageSignal) + Send + Sync,
{
    fn emit(&self, signal: StorageSignal) {
        self(signal)
    }

    fn name(&self) -> &str {
        "closure"
    }
}
