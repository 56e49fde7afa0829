//! Binding of observable host fields to stored keys.
//!
//! The host supplies an [`ObservableScope`]. A bound field starts from the
//! stored value (or a default) and every later change to it is written back.

use super::codec::ExpiryRequest;
use super::service::{LocalStorageService, Lookup};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub type WatchListener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Cancels a watch when `cancel` is called. Dropping it leaves the watch in place.
#[must_use = "dropping a Subscription keeps the watch alive; call cancel() to stop it"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// A host object with named fields whose changes can be observed.
pub trait ObservableScope: Send + Sync {
    fn read(&self, field: &str) -> Option<Value>;

    fn assign(&self, field: &str, value: Value);

    /// Call `listener` with the new value whenever `field` changes.
    fn watch(&self, field: &str, listener: WatchListener) -> Subscription;
}

type WatcherMap = HashMap<u64, (String, WatchListener)>;

/// Field map that notifies watchers on every change.
#[derive(Default)]
pub struct MemoryScope {
    fields: Mutex<HashMap<String, Value>>,
    watchers: Arc<Mutex<WatcherMap>>,
    next_id: AtomicU64,
}

impl MemoryScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.lock().map(|w| w.len()).unwrap_or(0)
    }
}

impl ObservableScope for MemoryScope {
    fn read(&self, field: &str) -> Option<Value> {
        self.fields.lock().ok()?.get(field).cloned()
    }

    fn assign(&self, field: &str, value: Value) {
        let changed = match self.fields.lock() {
            Ok(mut fields) => {
                let previous = fields.insert(field.to_string(), value.clone());
                previous.as_ref() != Some(&value)
            }
            Err(_) => false,
        };
        if !changed {
            return;
        }

        // Listeners run outside the lock so they may touch the scope.
        let listeners: Vec<WatchListener> = match self.watchers.lock() {
            Ok(watchers) => watchers
                .values()
                .filter(|(watched, _)| watched == field)
                .map(|(_, listener)| listener.clone())
                .collect(),
            Err(_) => Vec::new(),
        };
        for listener in listeners {
            listener(&value);
        }
    }

    fn watch(&self, field: &str, listener: WatchListener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut watchers) = self.watchers.lock() {
            watchers.insert(id, (field.to_string(), listener));
        }
        let watchers = Arc::clone(&self.watchers);
        Subscription::new(move || {
            if let Ok(mut watchers) = watchers.lock() {
                watchers.remove(&id);
            }
        })
    }
}

impl LocalStorageService {
    /// Bind `field` of `scope` to the stored key (`storage_key`, or `field`
    /// itself when not given).
    ///
    /// The field starts from the stored value, falling back to `default`.
    /// When both are objects, `default`'s entries are merged over the stored
    /// ones. The starting value is persisted, then each change of the field is
    /// written back until the returned subscription is cancelled.
    pub fn bind(
        self: &Arc<Self>,
        scope: &dyn ObservableScope,
        field: &str,
        default: Option<Value>,
        storage_key: Option<&str>,
    ) -> Subscription {
        let storage_key = storage_key.unwrap_or(field).to_string();

        let initial = match (self.get(&storage_key), default) {
            (Lookup::Value(Value::Object(mut stored)), Some(Value::Object(defaults))) => {
                for (k, v) in defaults {
                    stored.insert(k, v);
                }
                Value::Object(stored)
            }
            (Lookup::Value(stored), _) => stored,
            (Lookup::Null | Lookup::Expired, Some(default)) => default,
            (Lookup::Null | Lookup::Expired, None) => Value::Null,
        };

        scope.assign(field, initial.clone());
        self.set(&storage_key, initial, ExpiryRequest::Never);
        debug!("Bound field to storage: field={}, key={}", field, storage_key);

        let service = Arc::clone(self);
        scope.watch(
            field,
            Arc::new(move |value: &Value| {
                service.set(&storage_key, value.clone(), ExpiryRequest::Never);
            }),
        )
    }
}
