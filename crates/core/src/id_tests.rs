// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ids_are_unique() {
    let a = TenantId::new();
    let b = TenantId::new();
    assert_ne!(a, b);
}

#[test]
fn id_parse_round_trip() {
    let id = UserId::new();
    let parsed = UserId::parse(&id.to_string()).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn id_parse_rejects_garbage() {
    let err = UserId::parse("not-a-uuid").unwrap_err();
    assert!(matches!(err, crate::Error::Validation { .. }));
}

#[test]
fn id_serde_is_transparent() {
    let id = TenantId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));

    let parsed: TenantId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn nil_id_is_nil() {
    assert!(TenantId::nil().is_nil());
    assert!(!TenantId::new().is_nil());
}

#[test]
fn short_truncates() {
    assert_eq!(short("abcdef", 3), "abc");
    assert_eq!(short("ab", 3), "ab");
}
