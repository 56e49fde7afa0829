/// Separator appended to a non-empty prefix.
pub const KEY_SEPARATOR: char = '.';

/// Derives physical storage keys from application keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNamespace {
    prefix: String,
}

impl KeyNamespace {
    /// Normalizes `prefix` so that a non-empty prefix ends with the separator.
    /// An empty prefix disables namespacing.
    pub fn new(prefix: &str) -> Self {
        let prefix = if prefix.is_empty() || prefix.ends_with(KEY_SEPARATOR) {
            prefix.to_string()
        } else {
            format!("{}{}", prefix, KEY_SEPARATOR)
        };
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    pub fn qualify(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Whether a physical key belongs to this namespace.
    pub fn owns(&self, qualified: &str) -> bool {
        qualified.starts_with(&self.prefix)
    }

    /// Application key for a physical key of this namespace.
    pub fn strip<'a>(&self, qualified: &'a str) -> Option<&'a str> {
        qualified.strip_prefix(self.prefix.as_str())
    }
}
