use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical medium a storage façade writes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StorageType {
    #[default]
    #[serde(rename = "localStorage", alias = "local")]
    LocalStorage,
    #[serde(rename = "sessionStorage", alias = "session")]
    SessionStorage,
    #[serde(rename = "cookie")]
    Cookie,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::LocalStorage => "localStorage",
            StorageType::SessionStorage => "sessionStorage",
            StorageType::Cookie => "cookie",
        }
    }

    /// Whether this type is served by a Web Storage area rather than cookies.
    pub fn is_web_storage(&self) -> bool {
        !matches!(self, StorageType::Cookie)
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "localstorage" | "local" => Ok(StorageType::LocalStorage),
            "sessionstorage" | "session" => Ok(StorageType::SessionStorage),
            "cookie" | "cookies" => Ok(StorageType::Cookie),
            other => Err(format!("Unknown storage type: {}", other)),
        }
    }
}
