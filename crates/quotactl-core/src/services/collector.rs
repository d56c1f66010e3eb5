//! Quota collection
//!
//! Walks a list of project ids and builds one [`ProjectQuotaDocument`] per
//! project by reading every quota category from the backend. Documents are
//! produced one at a time; each step issues live remote reads, so a
//! collector is finite and cannot be restarted.

use std::vec::IntoIter;

use crate::error::Result;
use crate::models::{ProjectQuotaDocument, QuotaCategory, QuotaSet};

use super::backend::QuotaBackend;
use super::normalize::strip_metadata;

/// Cursor over per-project quota documents
pub struct QuotaCollector<'a, B: QuotaBackend + ?Sized> {
    backend: &'a B,
    pending: IntoIter<String>,
}

impl<'a, B: QuotaBackend + ?Sized> QuotaCollector<'a, B> {
    /// Start a collection over `project_ids`, or every project when empty
    pub async fn new(backend: &'a B, project_ids: Vec<String>) -> Result<Self> {
        let project_ids = if project_ids.is_empty() {
            log::info!("[quotactl:collect] getting list of all projects");
            backend
                .list_projects()
                .await?
                .into_iter()
                .map(|project| project.id)
                .collect()
        } else {
            project_ids
        };

        log::debug!("[quotactl:collect] {} projects to collect", project_ids.len());
        Ok(Self {
            backend,
            pending: project_ids.into_iter(),
        })
    }

    /// Projects not yet collected
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Collect the next project, or `None` once every id has been visited
    pub async fn next_document(&mut self) -> Option<Result<ProjectQuotaDocument>> {
        let project_id = self.pending.next()?;
        Some(self.collect_project(&project_id).await)
    }

    /// Drain the cursor, stopping at the first failure
    pub async fn collect_all(mut self) -> Result<Vec<ProjectQuotaDocument>> {
        let mut documents = Vec::with_capacity(self.remaining());
        while let Some(document) = self.next_document().await {
            documents.push(document?);
        }
        Ok(documents)
    }

    async fn collect_project(&self, project_id: &str) -> Result<ProjectQuotaDocument> {
        let project = self.backend.get_project(project_id).await?;
        log::info!("[quotactl:collect] looking up quotas for project {}", project.name);

        let mut quotas = QuotaSet::new();
        for category in QuotaCategory::ALL {
            let record = self.backend.get_quota(category, &project.id).await?;
            quotas.insert(category, strip_metadata(record));
        }

        Ok(ProjectQuotaDocument::new(&project, quotas))
    }
}
