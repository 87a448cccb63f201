// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version store service over the write-only snapshot repository.

use orq_core::{Error, ProjectId, ProjectVersion, Resource, Result};
use orq_storage::VersionRepo;
use std::sync::Arc;

/// Read/append facade for immutable project snapshots.
#[derive(Clone)]
pub struct VersionStore {
    versions: Arc<dyn VersionRepo>,
}

impl VersionStore {
    pub fn new(versions: Arc<dyn VersionRepo>) -> Self {
        Self { versions }
    }

    /// Append a snapshot. Snapshots are never mutated afterwards.
    pub async fn append(&self, snapshot: &ProjectVersion) -> Result<()> {
        self.versions.append(snapshot).await?;
        tracing::info!(
            project_id = %snapshot.project_id,
            version = snapshot.version,
            "project snapshot appended"
        );
        Ok(())
    }

    /// Fetch one snapshot. A miss is the distinguished `Version` not-found
    /// error so dispatch can fall back to the current draft.
    pub async fn get(&self, project: ProjectId, version: u32) -> Result<ProjectVersion> {
        self.versions
            .get(project, version)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Version, format!("{project}@{version}")))
    }

    pub async fn latest(&self, project: ProjectId) -> Result<Option<ProjectVersion>> {
        Ok(self.versions.latest(project).await?)
    }

    pub async fn list(&self, project: ProjectId) -> Result<Vec<ProjectVersion>> {
        Ok(self.versions.list_by_project(project).await?)
    }
}
