use clap::{Args, Parser, Subcommand};
use stashkit_core::{ExpiryRequest, StorageType};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "stashkit")]
#[command(version, about = "Inspect and edit a prefixed key-value store with expiry")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Data directory holding local.json and cookies.json.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// TOML file with storage configuration.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Key prefix; overrides the config file.
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// localStorage, sessionStorage or cookie; overrides the config file.
    #[arg(long, global = true)]
    pub storage_type: Option<StorageType>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a value. Text that is not valid JSON is stored as a string.
    Set {
        key: String,
        value: String,

        #[command(flatten)]
        expiry: ExpiryArgs,
    },
    /// Print a value as JSON.
    Get {
        key: String,

        /// Attach this expiry (milliseconds from now) if the item has none.
        #[arg(long, value_name = "MS")]
        force_expire: Option<u64>,
    },
    /// Remove one or more keys.
    Remove {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// List keys in the namespace.
    Keys,
    /// Remove every key in the namespace, or those matching a pattern.
    Clear {
        #[arg(long)]
        pattern: Option<String>,
    },
    /// Count keys in the namespace.
    Length,
    /// Direct cookie access.
    #[command(subcommand)]
    Cookie(CookieCommand),
}

#[derive(Debug, Subcommand)]
pub enum CookieCommand {
    Get {
        key: String,
    },
    Set {
        key: String,
        value: String,

        /// Lifetime in days; 0 uses the configured default.
        #[arg(long, default_value_t = 0.0)]
        days: f64,
    },
    Remove {
        key: String,
    },
    /// Remove every cookie in the namespace.
    Clear,
}

#[derive(Debug, Clone, Default, Args)]
#[group(multiple = false)]
pub struct ExpiryArgs {
    /// Expire this many milliseconds from now.
    #[arg(long, value_name = "MS")]
    pub expire_in_ms: Option<u64>,

    /// Expire after the configured default duration.
    #[arg(long)]
    pub expire_default: bool,

    /// Expire at this epoch timestamp in milliseconds.
    #[arg(long, value_name = "MS")]
    pub expire_at: Option<i64>,
}

impl ExpiryArgs {
    pub fn to_request(&self) -> ExpiryRequest {
        if let Some(ms) = self.expire_in_ms {
            ExpiryRequest::after_millis(ms)
        } else if let Some(at) = self.expire_at {
            ExpiryRequest::At(at)
        } else if self.expire_default {
            ExpiryRequest::Default
        } else {
            ExpiryRequest::Never
        }
    }
}

pub fn force_expiry(force_expire: Option<u64>) -> ExpiryRequest {
    force_expire
        .map(ExpiryRequest::after_millis)
        .unwrap_or_default()
}
