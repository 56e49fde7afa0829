//! Signal sink adapters

pub mod channel;
pub mod logging;
pub mod memory;

pub use self::channel::ChannelSink;
pub use self::logging::LogSink;
pub use self::memory::{MemorySink, NullSink};
