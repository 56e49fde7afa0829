//! Local storage service
//!
//! Namespaced key-value storage with optional expiry over a Web Storage area,
//! falling back to cookies.

pub mod bind;
pub mod codec;
pub mod cookie_backend;
pub mod namespace;
pub mod service;
pub mod web_storage;

pub use bind::{MemoryScope, ObservableScope, Subscription, WatchListener};
pub use codec::{Decoded, Encoded, Envelope, ExpiryCodec, ExpiryRequest};
pub use cookie_backend::CookieBackend;
pub use namespace::{KeyNamespace, KEY_SEPARATOR};
pub use service::{LocalStorageService, Lookup};
pub use web_storage::WebStorage;
