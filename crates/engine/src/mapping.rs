// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook payload projection: JSONPath-style dotted expressions.

use indexmap::IndexMap;
use orq_core::{Error, Result};
use serde_json::{Map, Value};

/// Build the worker input from a webhook payload and its mapping.
///
/// Each mapping value is resolved against the payload: `"$"` yields the whole
/// payload, `"$.a.b.c"` descends through objects. An entry whose path hits a
/// missing key is silently omitted; descending into a non-object is an error.
/// An empty mapping passes the payload through verbatim.
pub fn apply_input_mapping(
    payload: &Value,
    mapping: Option<&IndexMap<String, String>>,
) -> Result<Value> {
    let mapping = match mapping {
        Some(mapping) if !mapping.is_empty() => mapping,
        _ => return Ok(payload.clone()),
    };

    let mut out = Map::new();
    for (key, expr) in mapping {
        if let Some(value) = resolve_path(payload, expr)? {
            out.insert(key.clone(), value);
        }
    }
    Ok(Value::Object(out))
}

/// Resolve one dotted-path expression. `Ok(None)` means a key along the path
/// was absent (the caller omits the entry).
fn resolve_path(payload: &Value, expr: &str) -> Result<Option<Value>> {
    if expr == "$" {
        return Ok(Some(payload.clone()));
    }
    let Some(path) = expr.strip_prefix("$.") else {
        return Err(Error::validation(
            "input_mapping",
            format!("expression {expr:?} must be \"$\" or start with \"$.\""),
        ));
    };
    if path.is_empty() {
        return Err(Error::validation("input_mapping", "empty path after \"$.\""));
    }

    let mut current = payload;
    for segment in path.split('.') {
        match current {
            Value::Object(fields) => match fields.get(segment) {
                Some(next) => current = next,
                None => return Ok(None),
            },
            _ => {
                return Err(Error::validation(
                    "input_mapping",
                    format!("cannot descend into non-object at {segment:?} in {expr:?}"),
                ))
            }
        }
    }
    Ok(Some(current.clone()))
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
