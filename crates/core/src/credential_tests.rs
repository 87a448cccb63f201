// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::id::UserId;
use crate::project::ProjectId;

#[test]
fn personal_scope_requires_owner_user() {
    let missing = Credential::builder().scope(CredentialScope::Personal).build();
    assert!(missing.validate_scope().is_err());

    let ok = Credential::builder()
        .scope(CredentialScope::Personal)
        .owner_user_id(UserId::new())
        .build();
    assert!(ok.validate_scope().is_ok());
}

#[test]
fn project_scope_requires_owner_project() {
    let missing = Credential::builder().scope(CredentialScope::Project).build();
    assert!(missing.validate_scope().is_err());

    let ok = Credential::builder()
        .scope(CredentialScope::Project)
        .owner_project_id(ProjectId::new())
        .build();
    assert!(ok.validate_scope().is_ok());
}

#[test]
fn organization_scope_needs_no_owner() {
    let cred = Credential::builder().scope(CredentialScope::Organization).build();
    assert!(cred.validate_scope().is_ok());
}

#[test]
fn ownership_is_personal_scope_only() {
    let user = UserId::new();
    let personal = Credential::builder()
        .scope(CredentialScope::Personal)
        .owner_user_id(user)
        .build();
    assert!(personal.is_owned_by(user));
    assert!(!personal.is_owned_by(UserId::new()));

    // An organization credential is shared, not owned.
    let org = Credential::builder().scope(CredentialScope::Organization).build();
    assert!(!org.is_owned_by(user));
}

#[test]
fn credential_type_serializes_as_type() {
    let cred = Credential::builder().credential_type(CredentialType::OAuth2).build();
    let json = serde_json::to_value(&cred).unwrap();
    assert_eq!(json["type"], "oauth2");
}
