use crate::traits::SignalSink;
use stashkit_core_types::StorageSignal;
use tokio::sync::mpsc;

/// Forwards signals into an unbounded tokio channel.
///
/// Sending never blocks, so the synchronous storage path can emit from any
/// context. A dropped receiver silently discards further signals.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StorageSignal>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<StorageSignal>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StorageSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl SignalSink for ChannelSink {
    fn emit(&self, signal: StorageSignal) {
        if let Err(e) = self.tx.send(signal) {
            log::trace!("Signal receiver dropped, discarding {}", e.0.name());
        }
    }

    fn name(&self) -> &str {
        "channel"
    }
}
