use std::collections::HashMap;

use dj_core::{sha256_hex, stable_hash_string, to_canonical_json_bytes, ReleaseProvenance};
use serde_json::json;

#[test]
fn canonical_bytes_sort_nested_keys() {
    let value = json!({"b": {"z": 1, "a": 2}, "a": [ {"y": 1, "x": 0} ]});
    let bytes = to_canonical_json_bytes(&value).expect("encode");
    assert_eq!(
        String::from_utf8(bytes).expect("utf8"),
        r#"{"a":[{"x":0,"y":1}],"b":{"a":2,"z":1}}"#
    );
}

#[test]
fn stable_hash_ignores_map_insertion_order() {
    let mut first = HashMap::new();
    first.insert("card", "cardDijetPbPb2018.input");
    first.insert("location", "1");
    let mut second = HashMap::new();
    second.insert("location", "1");
    second.insert("card", "cardDijetPbPb2018.input");
    assert_eq!(
        stable_hash_string(&first).expect("hash"),
        stable_hash_string(&second).expect("hash")
    );
}

#[test]
fn sha256_hex_matches_known_digest() {
    assert_eq!(
        sha256_hex(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn provenance_builder_records_inputs() {
    let record = ReleaseProvenance::now("abc")
        .with_input("results.json", "00ff")
        .with_tool("dj-release", "0.1.0");
    assert_eq!(record.config_hash, "abc");
    assert_eq!(record.input_hashes.get("results.json").map(String::as_str), Some("00ff"));
    assert!(record.created_at.ends_with('Z'));
}
