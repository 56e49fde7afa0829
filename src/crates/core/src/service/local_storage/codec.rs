//! Expiry codec
//!
//! Converts application values to stored envelopes and back. A stored item is
//! one of four shapes, told apart by structure alone:
//!
//! - a primitive (string, number, boolean, null)
//! - a legacy object carrying `__ts`, written before expiry support existed
//! - an object carrying the expiry field: `{"value": V, "<field>": epochMillis}`
//! - any other object or array, stored unwrapped

use crate::util::clock::ONE_DAY_MILLISECONDS;
use crate::util::errors::StashResult;
use serde_json::{Map, Value};
use std::time::Duration;

pub const LEGACY_TIMESTAMP_FIELD: &str = "__ts";
pub const VALUE_FIELD: &str = "value";

/// Expiry requested for a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryRequest {
    /// No expiry, unless the configuration forces it on every write.
    #[default]
    Never,
    /// Expire after the configured default duration.
    Default,
    /// Expire after the given duration. A zero duration requests nothing.
    After(Duration),
    /// Expire at an absolute epoch-millisecond timestamp.
    At(i64),
}

impl ExpiryRequest {
    pub fn after_millis(millis: u64) -> Self {
        ExpiryRequest::After(Duration::from_millis(millis))
    }

    pub fn is_requested(&self) -> bool {
        match self {
            ExpiryRequest::Never => false,
            ExpiryRequest::After(d) => !d.is_zero(),
            ExpiryRequest::Default | ExpiryRequest::At(_) => true,
        }
    }
}

/// The structural shape of a decoded item.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Primitive(Value),
    Legacy { value: Value, written_at: i64 },
    Expiring { value: Value, expiry_at: i64 },
    Plain(Value),
}

impl Envelope {
    pub fn classify(item: Value, expiry_field: &str) -> Self {
        match item {
            Value::Object(mut map) => {
                let legacy_ts = map.get(LEGACY_TIMESTAMP_FIELD).and_then(as_millis);
                if let Some(written_at) = legacy_ts {
                    let value = map.remove(VALUE_FIELD).unwrap_or(Value::Null);
                    return Envelope::Legacy { value, written_at };
                }

                let expiry_at = map.get(expiry_field).and_then(as_millis);
                if let Some(expiry_at) = expiry_at {
                    let value = map.remove(VALUE_FIELD).unwrap_or(Value::Null);
                    return Envelope::Expiring { value, expiry_at };
                }

                Envelope::Plain(Value::Object(map))
            }
            array @ Value::Array(_) => Envelope::Plain(array),
            primitive => Envelope::Primitive(primitive),
        }
    }
}

fn as_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

/// Result of encoding one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// JSON text to store; `None` when the value was unset (the null tombstone).
    pub payload: Option<String>,
    pub expiry_at: Option<i64>,
}

impl Encoded {
    /// Text written to a Web Storage area.
    pub fn storage_text(&self) -> &str {
        self.payload.as_deref().unwrap_or("null")
    }

    /// Value handed to the cookie backend; null deletes the cookie.
    pub fn cookie_value(&self) -> Value {
        match &self.payload {
            Some(text) => Value::String(text.clone()),
            None => Value::Null,
        }
    }

    /// Cookie lifetime in days; zero when no expiry applies.
    pub fn days_to_expiry(&self, now: i64) -> f64 {
        self.expiry_at
            .map(|at| at.saturating_sub(now) as f64 / ONE_DAY_MILLISECONDS as f64)
            .unwrap_or(0.0)
    }
}

/// Result of decoding one stored item.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    pub expired: bool,
    /// Set when the item must be written back with this expiry.
    pub rewrite: Option<ExpiryRequest>,
}

impl Decoded {
    fn fresh(value: Value) -> Self {
        Self {
            value,
            expired: false,
            rewrite: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryCodec {
    expiry_field: String,
    default_duration_ms: i64,
    always_expire: bool,
}

impl ExpiryCodec {
    pub fn new(expiry_field: impl Into<String>, default_duration_ms: i64, always_expire: bool) -> Self {
        Self {
            expiry_field: expiry_field.into(),
            default_duration_ms,
            always_expire,
        }
    }

    pub fn expiry_field(&self) -> &str {
        &self.expiry_field
    }

    /// Absolute expiry for a write, or `None` when the value is stored unwrapped.
    ///
    /// Precedence: explicit timestamp, then a positive duration, then the
    /// default duration.
    pub fn resolve_expiry_at(&self, request: ExpiryRequest, now: i64) -> Option<i64> {
        match request {
            ExpiryRequest::At(at) => Some(at),
            ExpiryRequest::After(d) if !d.is_zero() => {
                Some(now.saturating_add(d.as_millis().min(i64::MAX as u128) as i64))
            }
            ExpiryRequest::Default => Some(now.saturating_add(self.default_duration_ms)),
            _ if self.always_expire => Some(now.saturating_add(self.default_duration_ms)),
            _ => None,
        }
    }

    /// Encode a write. `None` is an unset value and becomes the null tombstone.
    pub fn encode(&self, value: Option<&Value>, request: ExpiryRequest, now: i64) -> StashResult<Encoded> {
        let Some(value) = value else {
            return Ok(Encoded {
                payload: None,
                expiry_at: None,
            });
        };

        match self.resolve_expiry_at(request, now) {
            Some(expiry_at) => {
                let mut wrapped = Map::new();
                wrapped.insert(VALUE_FIELD.to_string(), value.clone());
                wrapped.insert(self.expiry_field.clone(), Value::from(expiry_at));
                Ok(Encoded {
                    payload: Some(serde_json::to_string(&Value::Object(wrapped))?),
                    expiry_at: Some(expiry_at),
                })
            }
            None => Ok(Encoded {
                payload: Some(serde_json::to_string(value)?),
                expiry_at: None,
            }),
        }
    }

    /// Decode stored text. Text that is not JSON comes back as a string.
    pub fn decode(&self, raw: &str, force: ExpiryRequest, now: i64) -> Decoded {
        match serde_json::from_str::<Value>(raw) {
            Ok(item) => self.decode_value(item, force, now),
            Err(_) => Decoded::fresh(Value::String(raw.to_string())),
        }
    }

    /// Decode an already parsed item.
    pub fn decode_value(&self, item: Value, force: ExpiryRequest, now: i64) -> Decoded {
        match Envelope::classify(item, &self.expiry_field) {
            Envelope::Primitive(value) | Envelope::Plain(value) => Decoded {
                value,
                expired: false,
                rewrite: force.is_requested().then_some(force),
            },
            Envelope::Legacy { value, written_at } => Decoded {
                value,
                expired: false,
                rewrite: Some(ExpiryRequest::At(written_at)),
            },
            Envelope::Expiring { value, expiry_at } => {
                if now.saturating_sub(expiry_at) > 0 {
                    Decoded {
                        value: Value::Null,
                        expired: true,
                        rewrite: None,
                    }
                } else {
                    Decoded::fresh(value)
                }
            }
        }
    }
}
