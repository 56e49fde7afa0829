//! Service layer
//!
//! Configuration and the local storage service built on the infrastructure
//! media.

pub mod config;
pub mod local_storage;

pub use config::StorageConfig;
pub use local_storage::{ExpiryRequest, LocalStorageService, Lookup};
