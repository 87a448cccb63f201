// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use indexmap::IndexMap;
use serde_json::json;

fn mapping(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn no_mapping_passes_payload_through() {
    let payload = json!({"a": 1});
    assert_eq!(apply_input_mapping(&payload, None).unwrap(), payload);

    let empty = mapping(&[]);
    assert_eq!(apply_input_mapping(&payload, Some(&empty)).unwrap(), payload);
}

#[test]
fn dollar_maps_whole_payload() {
    let payload = json!({"a": 1});
    let m = mapping(&[("all", "$")]);
    assert_eq!(apply_input_mapping(&payload, Some(&m)).unwrap(), json!({"all": {"a": 1}}));
}

#[test]
fn dotted_paths_descend_objects() {
    let payload = json!({"action": "opened", "repository": {"name": "repo-1"}});
    let m = mapping(&[("event", "$.action"), ("name", "$.repository.name")]);
    assert_eq!(
        apply_input_mapping(&payload, Some(&m)).unwrap(),
        json!({"event": "opened", "name": "repo-1"})
    );
}

#[test]
fn missing_keys_are_silently_omitted() {
    let payload = json!({"a": {"b": 1}});
    let m = mapping(&[("found", "$.a.b"), ("absent", "$.a.missing"), ("gone", "$.nope.deep")]);
    assert_eq!(apply_input_mapping(&payload, Some(&m)).unwrap(), json!({"found": 1}));
}

#[test]
fn descending_into_non_object_is_an_error() {
    let payload = json!({"a": 42});
    let m = mapping(&[("x", "$.a.b")]);
    let err = apply_input_mapping(&payload, Some(&m)).unwrap_err();
    assert!(matches!(err, orq_core::Error::Validation { .. }));
}

#[test]
fn bad_expressions_are_errors() {
    let payload = json!({});
    for expr in ["action", ".action", "$action", "$."] {
        let m = mapping(&[("x", expr)]);
        assert!(apply_input_mapping(&payload, Some(&m)).is_err(), "expected error for {expr:?}");
    }
}

#[test]
fn arrays_cannot_be_indexed() {
    let payload = json!({"items": [1, 2, 3]});
    let m = mapping(&[("x", "$.items.0")]);
    assert!(apply_input_mapping(&payload, Some(&m)).is_err());
}

#[test]
fn mapped_values_keep_structure() {
    let payload = json!({"repo": {"owner": {"login": "octocat"}}});
    let m = mapping(&[("owner", "$.repo.owner")]);
    assert_eq!(
        apply_input_mapping(&payload, Some(&m)).unwrap(),
        json!({"owner": {"login": "octocat"}})
    );
}
