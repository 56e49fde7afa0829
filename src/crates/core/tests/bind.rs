mod common;

use common::harness;
use serde_json::json;
use stashkit_core::{ExpiryRequest, Lookup, MemoryScope, ObservableScope, StorageConfig};

#[test]
fn unbound_key_starts_from_default_and_persists_it() {
    let h = harness(StorageConfig::default());
    let scope = MemoryScope::new();

    let sub = h.service.bind(&scope, "theme", Some(json!("dark")), None);
    assert_eq!(scope.read("theme"), Some(json!("dark")));
    assert_eq!(h.stored("ls.theme").as_deref(), Some("\"dark\""));
    sub.cancel();
}

#[test]
fn stored_value_wins_over_scalar_default() {
    let h = harness(StorageConfig::default());
    h.service.set("theme", json!("light"), ExpiryRequest::Never);
    let scope = MemoryScope::new();

    let _sub = h.service.bind(&scope, "theme", Some(json!("dark")), None);
    assert_eq!(scope.read("theme"), Some(json!("light")));
}

#[test]
fn object_defaults_are_merged_over_stored_object() {
    let h = harness(StorageConfig::default());
    h.service
        .set("prefs", json!({"lang": "en", "size": 12}), ExpiryRequest::Never);
    let scope = MemoryScope::new();

    let _sub = h
        .service
        .bind(&scope, "prefs", Some(json!({"size": 14, "compact": true})), None);
    let expected = json!({"lang": "en", "size": 14, "compact": true});
    assert_eq!(scope.read("prefs"), Some(expected.clone()));
    assert_eq!(h.stored_json("ls.prefs"), Some(expected));
}

#[test]
fn changes_are_written_back_until_cancelled() {
    let h = harness(StorageConfig::default());
    let scope = MemoryScope::new();

    let sub = h.service.bind(&scope, "count", Some(json!(0)), Some("counter"));
    scope.assign("count", json!(1));
    assert_eq!(h.service.get("counter"), Lookup::Value(json!(1)));
    assert_eq!(h.service.get("count"), Lookup::Null);

    sub.cancel();
    assert_eq!(scope.watcher_count(), 0);
    scope.assign("count", json!(2));
    assert_eq!(h.service.get("counter"), Lookup::Value(json!(1)));
}

#[test]
fn expired_entry_is_treated_as_missing() {
    let h = harness(StorageConfig::default());
    h.service
        .set("token", json!("stale"), ExpiryRequest::after_millis(10));
    h.clock.advance(11);
    let scope = MemoryScope::new();

    let _sub = h.service.bind(&scope, "token", None, None);
    assert_eq!(scope.read("token"), Some(json!(null)));
    assert_eq!(h.service.get("token"), Lookup::Null);
}
