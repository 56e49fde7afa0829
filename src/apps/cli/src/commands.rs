use crate::cli::{force_expiry, Cli, Command, CookieCommand};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use stashkit_core::{
    Backends, CookieJar, FileStorageArea, LocalStorageService, Lookup, MemoryStorageArea,
    StorageConfig, SystemClock,
};
use stashkit_transport::LogSink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const LOCAL_FILE: &str = "local.json";
const COOKIE_FILE: &str = "cookies.json";

/// JSON when it parses, otherwise the raw text as a string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn data_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.dir {
        Some(dir) => Ok(dir.clone()),
        None => dirs::data_dir()
            .map(|dir| dir.join("stashkit"))
            .context("no data directory on this platform; pass --dir"),
    }
}

fn build_config(cli: &Cli) -> Result<StorageConfig> {
    let mut config = match &cli.config {
        Some(path) => StorageConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => StorageConfig::default(),
    };
    if let Some(prefix) = &cli.prefix {
        config.set_prefix(prefix.clone());
    }
    if let Some(storage_type) = cli.storage_type {
        config.set_storage_type(storage_type);
    }
    config.validate()?;
    Ok(config)
}

pub fn open_service(dir: &Path, config: StorageConfig) -> Result<LocalStorageService> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create data directory: {}", dir.display()))?;

    let local = FileStorageArea::open(dir.join(LOCAL_FILE))?;
    let jar = CookieJar::open(dir.join(COOKIE_FILE), Arc::new(SystemClock))?;
    let backends = Backends::new(Arc::new(jar))
        .with_local(Arc::new(local))
        .with_session(Arc::new(MemoryStorageArea::new()));

    debug!(
        "Opening store: dir={}, prefix={}, storage_type={}",
        dir.display(),
        config.prefix,
        config.storage_type
    );
    Ok(LocalStorageService::new(
        config,
        backends,
        Arc::new(LogSink::new()),
    ))
}

fn print_lookup(lookup: Lookup) -> Result<()> {
    match lookup {
        Lookup::Value(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Lookup::Null => println!("null"),
        Lookup::Expired => {
            eprintln!("expired");
            println!("null");
        }
    }
    Ok(())
}

pub fn run(cli: Cli) -> Result<()> {
    let dir = data_dir(&cli)?;
    let config = build_config(&cli)?;
    let service = open_service(&dir, config)?;
    execute(&service, cli.command)
}

pub fn execute(service: &LocalStorageService, command: Command) -> Result<()> {
    match command {
        Command::Set { key, value, expiry } => {
            if !service.set(&key, parse_value(&value), expiry.to_request()) {
                bail!("failed to store '{}'", key);
            }
        }
        Command::Get { key, force_expire } => {
            print_lookup(service.get_with_expiry(&key, force_expiry(force_expire)))?;
        }
        Command::Remove { keys } => service.remove(&keys),
        Command::Keys => {
            for key in service.keys() {
                println!("{}", key);
            }
        }
        Command::Clear { pattern } => {
            if !service.clear_all(pattern.as_deref()) {
                bail!("clear failed");
            }
        }
        Command::Length => println!("{}", service.length()),
        Command::Cookie(command) => execute_cookie(service, command)?,
    }
    Ok(())
}

fn execute_cookie(service: &LocalStorageService, command: CookieCommand) -> Result<()> {
    let cookies = service.cookie();
    match command {
        CookieCommand::Get { key } => match cookies.get(&key) {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => println!("null"),
        },
        CookieCommand::Set { key, value, days } => {
            if !cookies.set(&key, Some(&parse_value(&value)), days) {
                bail!("failed to set cookie '{}'", key);
            }
        }
        CookieCommand::Remove { key } => {
            cookies.remove(&key);
        }
        CookieCommand::Clear => {
            if !cookies.clear_all() {
                bail!("clearing cookies failed");
            }
        }
    }
    Ok(())
}
