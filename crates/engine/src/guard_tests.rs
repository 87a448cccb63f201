// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orq_core::{Error, Project, Resource, TenantId};
use orq_storage::{MemoryStore, ProjectRepo};

#[tokio::test]
async fn check_exists_finds_tenant_project() {
    let store = MemoryStore::new();
    let project = Project::builder().build();
    ProjectRepo::create(&store, &project).await.unwrap();

    let found = check_exists(&store, project.tenant_id, project.id).await.unwrap();
    assert_eq!(found.id, project.id);
}

#[tokio::test]
async fn check_exists_hides_other_tenants() {
    let store = MemoryStore::new();
    let project = Project::builder().build();
    ProjectRepo::create(&store, &project).await.unwrap();

    let err = check_exists(&store, TenantId::new(), project.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(Resource::Project, _)));
}

#[tokio::test]
async fn check_editable_rejects_system_projects() {
    let store = MemoryStore::new();
    let project = Project::builder().is_system(true).build();
    ProjectRepo::create(&store, &project).await.unwrap();

    let err = check_editable(&store, project.tenant_id, project.id).await.unwrap_err();
    assert!(matches!(err, Error::ProjectNotEditable(_)));
}

#[tokio::test]
async fn check_editable_allows_archived_projects() {
    // The policy table is intentionally permissive today; archived projects
    // remain editable until a status rule lands.
    let store = MemoryStore::new();
    let mut project = Project::builder().build();
    project.status = orq_core::ProjectStatus::Archived;
    ProjectRepo::create(&store, &project).await.unwrap();

    assert!(check_editable(&store, project.tenant_id, project.id).await.is_ok());
}
