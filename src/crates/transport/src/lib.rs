/// Stashkit Transport Layer
///
/// Delivery of storage signals to whatever the host listens with:
/// - log records (`log` facade)
/// - tokio mpsc channels
/// - in-memory recording (tests, inspection)
/// - fan-out to several sinks at once
pub mod adapters;
pub mod event_bus;
pub mod traits;

pub use adapters::{ChannelSink, LogSink, MemorySink, NullSink};
pub use event_bus::{EventBus, EventPriority};
pub use traits::SignalSink;

pub use stashkit_core_types::StorageSignal;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
