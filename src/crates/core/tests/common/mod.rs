#![allow(dead_code)]

use stashkit_core::{
    Backends, CookieJar, LocalStorageService, ManualClock, MemoryStorageArea, StorageConfig,
};
use stashkit_transport::MemorySink;
use std::sync::Arc;

/// Whole seconds, so cookie `expires` dates round-trip exactly.
pub const NOW: i64 = 1_790_000_000_000;

pub struct Harness {
    pub service: Arc<LocalStorageService>,
    pub local: Arc<MemoryStorageArea>,
    pub session: Arc<MemoryStorageArea>,
    pub jar: Arc<CookieJar>,
    pub sink: Arc<MemorySink>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn stored(&self, qualified: &str) -> Option<String> {
        use stashkit_core::StorageArea;
        self.local.get_item(qualified).expect("read local area")
    }

    pub fn stored_json(&self, qualified: &str) -> Option<serde_json::Value> {
        self.stored(qualified)
            .map(|raw| serde_json::from_str(&raw).expect("stored text is JSON"))
    }
}

pub fn harness(config: StorageConfig) -> Harness {
    harness_with(config, MemoryStorageArea::new(), true)
}

pub fn harness_with(config: StorageConfig, local: MemoryStorageArea, cookies_enabled: bool) -> Harness {
    let clock = Arc::new(ManualClock::new(NOW));
    let local = Arc::new(local);
    let session = Arc::new(MemoryStorageArea::new());
    let jar = Arc::new(if cookies_enabled {
        CookieJar::with_clock(clock.clone())
    } else {
        CookieJar::disabled()
    });
    let sink = Arc::new(MemorySink::new());

    let backends = Backends::new(jar.clone())
        .with_local(local.clone())
        .with_session(session.clone());
    let service = Arc::new(LocalStorageService::with_clock(
        config,
        backends,
        sink.clone(),
        clock.clone(),
    ));

    Harness {
        service,
        local,
        session,
        jar,
        sink,
        clock,
    }
}
