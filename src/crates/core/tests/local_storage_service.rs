mod common;

use common::{harness, harness_with, NOW};
use serde_json::{json, Value};
use stashkit_core::{
    ExpiryRequest, Lookup, MemoryStorageArea, StorageArea, StorageConfig, StorageSignal,
    StorageType,
};
use std::time::Duration;

#[test]
fn primitives_round_trip_without_expiry() {
    let h = harness(StorageConfig::default());
    let values = [
        json!("angular"),
        json!(""),
        json!(42),
        json!(-2.5),
        json!(true),
        json!(false),
    ];

    for (i, value) in values.iter().enumerate() {
        let key = format!("k{}", i);
        assert!(h.service.set(&key, value.clone(), ExpiryRequest::Never));
        assert_eq!(h.service.get(&key), Lookup::Value(value.clone()), "key {}", key);
        assert_eq!(
            h.stored(&format!("ls.{}", key)),
            Some(value.to_string()),
            "stored unwrapped"
        );
    }
}

#[test]
fn structured_values_round_trip() {
    let h = harness(StorageConfig::default());
    let value = json!({"theme": "dark", "recent": [1, 2, 3]});
    h.service.set("prefs", value.clone(), ExpiryRequest::Never);
    assert_eq!(h.service.get("prefs"), Lookup::Value(value));
}

#[test]
fn expired_entries_read_as_expired_and_are_deleted() {
    let h = harness(StorageConfig::default());
    h.service.set("token", json!("abc"), ExpiryRequest::after_millis(100));
    assert_eq!(
        h.stored_json("ls.token"),
        Some(json!({"value": "abc", "__expiry": NOW + 100}))
    );

    h.clock.advance(100);
    assert_eq!(h.service.get("token"), Lookup::Value(json!("abc")));

    h.clock.advance(1);
    assert_eq!(h.service.get("token"), Lookup::Expired);
    assert_eq!(h.stored("ls.token"), None);
    assert_eq!(h.service.get("token"), Lookup::Null);
}

#[test]
fn legacy_timestamp_entries_are_migrated_on_read() {
    let h = harness(StorageConfig::default());
    let past = NOW - 60_000;
    h.local
        .set_item("ls.legacy", &json!({"value": "x", "__ts": past}).to_string())
        .unwrap();

    assert_eq!(h.service.get("legacy"), Lookup::Value(json!("x")));
    assert_eq!(
        h.stored_json("ls.legacy"),
        Some(json!({"value": "x", "__expiry": past}))
    );

    assert_eq!(h.service.get("legacy"), Lookup::Expired);
    assert_eq!(h.stored("ls.legacy"), None);
}

#[test]
fn null_missing_and_expired_are_distinct_states() {
    let h = harness(StorageConfig::default());
    h.service.set("nothing", Value::Null, ExpiryRequest::Never);
    assert_eq!(h.stored("ls.nothing").as_deref(), Some("null"));
    assert_eq!(h.service.get("nothing"), Lookup::Null);
    assert_eq!(h.service.get("never-set-key"), Lookup::Null);

    h.service.set("unset", None::<serde_json::Value>, ExpiryRequest::Default);
    assert_eq!(h.stored("ls.unset").as_deref(), Some("null"));
    assert_eq!(h.service.get("unset"), Lookup::Null);

    h.service.set("short", json!(1), ExpiryRequest::after_millis(10));
    h.clock.advance(11);
    let expired = h.service.get("short");
    assert!(expired.is_expired());
    assert!(!expired.is_null());
}

#[test]
fn wrapped_null_reads_as_null() {
    let h = harness(StorageConfig::default());
    h.service.set("k", Value::Null, ExpiryRequest::Default);
    assert_eq!(h.stored_json("ls.k"), Some(json!({"value": null, "__expiry": NOW + 7_200_000})));
    assert_eq!(h.service.get("k"), Lookup::Null);
}

#[test]
fn explicit_timestamp_and_default_expiry() {
    let h = harness(StorageConfig::default());
    h.service.set("at", json!(1), ExpiryRequest::At(NOW + 5));
    h.service.set("default", json!(2), ExpiryRequest::Default);

    assert_eq!(h.stored_json("ls.at").unwrap()["__expiry"], json!(NOW + 5));
    assert_eq!(
        h.stored_json("ls.default").unwrap()["__expiry"],
        json!(NOW + 7_200_000)
    );
}

#[test]
fn always_expire_wraps_plain_writes() {
    let mut config = StorageConfig::default();
    config
        .set_expiry(Duration::from_secs(1), None)
        .set_always_expire(true);
    let h = harness(config);

    h.service.set("k", json!("v"), ExpiryRequest::Never);
    assert_eq!(h.stored_json("ls.k"), Some(json!({"value": "v", "__expiry": NOW + 1000})));

    h.clock.advance(1001);
    assert_eq!(h.service.get("k"), Lookup::Expired);
}

#[test]
fn forced_expiry_on_read_wraps_unwrapped_entries() {
    let h = harness(StorageConfig::default());
    h.service.set("plain", json!("v"), ExpiryRequest::Never);
    h.service.set("obj", json!({"a": 1}), ExpiryRequest::Never);

    assert_eq!(
        h.service.get_with_expiry("plain", ExpiryRequest::after_millis(50)),
        Lookup::Value(json!("v"))
    );
    assert_eq!(
        h.stored_json("ls.plain"),
        Some(json!({"value": "v", "__expiry": NOW + 50}))
    );

    assert_eq!(
        h.service.get_with_expiry("obj", ExpiryRequest::Default),
        Lookup::Value(json!({"a": 1}))
    );
    assert_eq!(
        h.stored_json("ls.obj"),
        Some(json!({"value": {"a": 1}, "__expiry": NOW + 7_200_000}))
    );

    h.clock.advance(51);
    assert_eq!(h.service.get("plain"), Lookup::Expired);
    assert_eq!(h.service.get("obj"), Lookup::Value(json!({"a": 1})));
}

#[test]
fn malformed_stored_text_is_returned_as_string() {
    let h = harness(StorageConfig::default());
    h.local.set_item("ls.raw", "not json at all").unwrap();
    assert_eq!(h.service.get("raw"), Lookup::Value(json!("not json at all")));
}

#[test]
fn typed_reads() {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Prefs {
        theme: String,
        size: u32,
    }

    let h = harness(StorageConfig::default());
    let prefs = Prefs {
        theme: "dark".to_string(),
        size: 14,
    };
    assert!(h.service.set_json("prefs", &prefs, ExpiryRequest::Default));
    assert_eq!(h.service.get_as::<Prefs>("prefs"), Some(prefs));
    assert_eq!(h.service.get_as::<u32>("prefs"), None);
    assert_eq!(h.service.get_as::<u32>("missing"), None);
}

#[test]
fn clear_all_only_touches_the_namespace() {
    let h = harness(StorageConfig::default());
    h.local.set_item("other.key", "1").unwrap();
    h.local.set_item("lsx", "2").unwrap();
    h.service.set("a", json!(1), ExpiryRequest::Never);
    h.service.set("b", json!(2), ExpiryRequest::Never);

    assert!(h.service.clear_all(None));
    assert_eq!(h.service.keys(), Vec::<String>::new());
    assert_eq!(h.local.keys().unwrap(), vec!["other.key", "lsx"]);
}

#[test]
fn clear_all_with_pattern_matches_application_keys() {
    let h = harness(StorageConfig::default());
    for key in ["a1", "a2", "b1"] {
        h.service.set(key, json!(key), ExpiryRequest::Never);
    }

    assert!(h.service.clear_all(Some("^a")));
    assert_eq!(h.service.keys(), vec!["b1"]);

    // An empty pattern matches everything.
    assert!(h.service.clear_all(Some("")));
    assert_eq!(h.service.length(), 0);
}

#[test]
fn invalid_pattern_clears_nothing() {
    let h = harness(StorageConfig::default());
    h.service.set("a", json!(1), ExpiryRequest::Never);
    assert!(!h.service.clear_all(Some("(unclosed")));
    assert_eq!(h.service.length(), 1);
    assert_eq!(h.sink.errors().len(), 1);
}

#[test]
fn keys_and_length_are_namespaced() {
    let mut config = StorageConfig::default();
    config.set_prefix("app");
    let h = harness(config);
    h.local.set_item("ls.foreign", "1").unwrap();
    h.service.set("one", json!(1), ExpiryRequest::Never);
    h.service.set("two", json!(2), ExpiryRequest::Default);

    assert_eq!(h.service.keys(), vec!["one", "two"]);
    assert_eq!(h.service.length(), 2);
    assert_eq!(h.service.derive_key("one"), "app.one");
}

#[test]
fn empty_prefix_disables_namespacing() {
    let mut config = StorageConfig::default();
    config.set_prefix("");
    let h = harness(config);
    h.local.set_item("preexisting", "1").unwrap();
    h.service.set("mine", json!(2), ExpiryRequest::Never);

    assert_eq!(h.service.keys(), vec!["preexisting", "mine"]);
    assert!(h.service.clear_all(None));
    assert_eq!(h.local.length().unwrap(), 0);
}

#[test]
fn remove_is_variadic() {
    let h = harness(StorageConfig::default());
    for key in ["a", "b", "c"] {
        h.service.set(key, json!(1), ExpiryRequest::Never);
    }
    h.service.remove(["a", "c"]);
    assert_eq!(h.service.keys(), vec!["b"]);

    h.service.remove(vec!["b".to_string()]);
    assert_eq!(h.service.length(), 0);
}

#[test]
fn notifications_follow_config() {
    let h = harness(StorageConfig::default());
    h.service.set("k", json!("v"), ExpiryRequest::Never);
    h.service.remove(["k"]);

    assert_eq!(
        h.sink.take(),
        vec![StorageSignal::SetItem {
            key: "k".to_string(),
            new_value: Some("\"v\"".to_string()),
            storage_type: StorageType::LocalStorage,
        }]
    );

    let mut config = StorageConfig::default();
    config.set_notify(false, true);
    let h = harness(config);
    h.service.set("k", json!("v"), ExpiryRequest::Never);
    h.service.remove(["k"]);
    assert_eq!(
        h.sink.take(),
        vec![StorageSignal::RemoveItem {
            key: "k".to_string(),
            storage_type: StorageType::LocalStorage,
        }]
    );
}

#[test]
fn session_storage_uses_the_session_area() {
    let mut config = StorageConfig::default();
    config.set_storage_type(StorageType::SessionStorage);
    let h = harness(config);

    h.service.set("k", json!(1), ExpiryRequest::Never);
    assert_eq!(h.session.get_item("ls.k").unwrap().as_deref(), Some("1"));
    assert_eq!(h.local.length().unwrap(), 0);
    assert_eq!(h.service.storage_type(), StorageType::SessionStorage);
    assert_eq!(h.sink.signals()[0].name(), "storage.setItem");
}

#[test]
fn separate_services_are_isolated() {
    let mut first = StorageConfig::default();
    first.set_prefix("one");
    let mut second = StorageConfig::default();
    second.set_prefix("two");

    let a = harness(first);
    let b = harness_with(second, MemoryStorageArea::new(), true);
    a.service.set("k", json!("a"), ExpiryRequest::Never);
    b.service.set("k", json!("b"), ExpiryRequest::Never);

    assert_eq!(a.service.get("k"), Lookup::Value(json!("a")));
    assert_eq!(b.service.get("k"), Lookup::Value(json!("b")));
    assert_eq!(a.service.derive_key("k"), "one.k");
}

#[test]
fn out_of_range_expiry_markers_are_handled() {
    let h = harness(StorageConfig::default());
    h.local
        .set_item("ls.ancient", r#"{"value":1,"__expiry":-1e300}"#)
        .unwrap();
    h.local
        .set_item("ls.distant", r#"{"value":1,"__expiry":1e300}"#)
        .unwrap();

    assert_eq!(h.service.get("ancient"), Lookup::Expired);
    assert_eq!(h.stored("ls.ancient"), None);
    assert_eq!(h.service.get("distant"), Lookup::Value(json!(1)));
}

#[test]
fn out_of_range_legacy_timestamp_migrates_then_expires() {
    let h = harness(StorageConfig::default());
    h.local
        .set_item("ls.old", r#"{"value":"x","__ts":-1e300}"#)
        .unwrap();

    assert_eq!(h.service.get("old"), Lookup::Value(json!("x")));
    assert_eq!(
        h.stored_json("ls.old"),
        Some(json!({"value": "x", "__expiry": i64::MIN}))
    );
    assert_eq!(h.service.get("old"), Lookup::Expired);
}

#[test]
fn malformed_markers_read_as_plain_objects() {
    let h = harness(StorageConfig::default());
    let text_expiry = r#"{"value":1,"__expiry":"tomorrow"}"#;
    let text_ts = r#"{"value":2,"__ts":"yesterday"}"#;
    h.local.set_item("ls.a", text_expiry).unwrap();
    h.local.set_item("ls.b", text_ts).unwrap();

    assert_eq!(
        h.service.get("a"),
        Lookup::Value(json!({"value": 1, "__expiry": "tomorrow"}))
    );
    assert_eq!(
        h.service.get("b"),
        Lookup::Value(json!({"value": 2, "__ts": "yesterday"}))
    );
    assert_eq!(h.stored("ls.a").as_deref(), Some(text_expiry));
    assert_eq!(h.stored("ls.b").as_deref(), Some(text_ts));
}

#[test]
fn fractional_expiry_marker_is_truncated() {
    let h = harness(StorageConfig::default());
    let raw = format!(r#"{{"value":2,"__expiry":{}.5}}"#, NOW);
    h.local.set_item("ls.f", &raw).unwrap();

    assert_eq!(h.service.get("f"), Lookup::Value(json!(2)));
    h.clock.advance(1);
    assert_eq!(h.service.get("f"), Lookup::Expired);
}

#[test]
fn unbounded_default_duration_does_not_overflow() {
    let mut config = StorageConfig::default();
    config.expiry.default_duration_ms = i64::MAX;
    let h = harness(config);

    assert!(h.service.set("k", json!(1), ExpiryRequest::Default));
    assert_eq!(
        h.stored_json("ls.k"),
        Some(json!({"value": 1, "__expiry": i64::MAX}))
    );
    assert_eq!(h.service.get("k"), Lookup::Value(json!(1)));
}
