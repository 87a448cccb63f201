// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorization guards shared by every mutating operation.

use orq_core::{Error, Project, ProjectId, Resource, Result, TenantId};
use orq_storage::ProjectRepo;

/// Assert the project exists and belongs to the tenant. Returns the project.
pub async fn check_exists(
    projects: &dyn ProjectRepo,
    tenant: TenantId,
    id: ProjectId,
) -> Result<Project> {
    let project = projects
        .get(id)
        .await?
        .filter(|p| p.tenant_id == tenant)
        .ok_or_else(|| Error::not_found(Resource::Project, id))?;
    Ok(project)
}

/// Assert the project exists, belongs to the tenant, and accepts mutation.
///
/// The policy table is deliberately small today: system projects are frozen,
/// everything else is editable. Status-based rules (archived, locked) slot in
/// here without touching call sites.
pub async fn check_editable(
    projects: &dyn ProjectRepo,
    tenant: TenantId,
    id: ProjectId,
) -> Result<Project> {
    let project = check_exists(projects, tenant, id).await?;
    if project.is_system {
        return Err(Error::ProjectNotEditable("system projects are read-only".into()));
    }
    Ok(project)
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
