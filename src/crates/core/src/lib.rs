// Stashkit Core Library - key-value persistence over client-side storage media
// Three-layer architecture: Util -> Infrastructure -> Service

pub mod infrastructure; // Infrastructure layer - Web Storage areas, cookie document
pub mod service; // Service layer - Configuration, local storage service
pub mod util; // Utility layer - Errors, clock

// Export main types
pub use util::errors::*;
pub use util::{Clock, ManualClock, SystemClock};

// Export infrastructure components
pub use infrastructure::{
    Backends, CookieDocument, CookieJar, FileStorageArea, MemoryStorageArea, StorageArea,
};

// Export service layer components
pub use service::{
    config::StorageConfig,
    local_storage::{
        CookieBackend, ExpiryRequest, LocalStorageService, Lookup, MemoryScope, ObservableScope,
        Subscription,
    },
};

// Re-export the signal contract so hosts need only this crate
pub use stashkit_core_types::{StorageSignal, StorageType};
pub use stashkit_transport::SignalSink;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CORE_NAME: &str = "Stashkit Core";
