//! Infrastructure layer
//!
//! Host-facing storage media: Web Storage areas and the cookie document.

pub mod cookies;
pub mod storage;

pub use cookies::{CookieDocument, CookieJar};
pub use storage::{Backends, FileStorageArea, MemoryStorageArea, StorageArea};
