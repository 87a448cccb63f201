// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    not_found = { Error::not_found(Resource::Project, "p-1"), ErrorKind::NotFound },
    validation = { Error::validation("name", "required"), ErrorKind::Validation },
    policy = { Error::ForbiddenDeleteSystem, ErrorKind::Policy },
    structural = { Error::EdgeCreatesCycle, ErrorKind::Structural },
    external = { Error::OAuth2TokenExpired, ErrorKind::External },
    duplicate = { Error::CredentialShareDuplicate, ErrorKind::Duplicate },
    internal = { Error::Storage("boom".into()), ErrorKind::Internal },
)]
fn error_kinds(err: Error, kind: ErrorKind) {
    assert_eq!(err.kind(), kind);
}

#[test]
fn version_not_found_is_distinguished() {
    assert!(Error::not_found(Resource::Version, "3").is_version_not_found());
    assert!(!Error::not_found(Resource::Project, "3").is_version_not_found());
    assert!(!Error::Storage("x".into()).is_version_not_found());
}

#[test]
fn validation_message_carries_field() {
    let err = Error::validation("parent_group_id", "block group cannot be its own parent");
    assert_eq!(
        err.to_string(),
        "validation failed on parent_group_id: block group cannot be its own parent"
    );
}

#[test]
fn not_found_displays_resource() {
    let err = Error::not_found(Resource::BlockGroup, "g-1");
    assert_eq!(err.to_string(), "block group not found: g-1");
}
