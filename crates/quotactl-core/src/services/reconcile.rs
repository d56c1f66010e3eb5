//! Command orchestration for get / apply / compare
//!
//! Each function sequences the collector, selector, normalizer and differ
//! around a [`QuotaBackend`]. Calls are issued strictly one at a time, project
//! then category. Nothing is rolled back: a failing write leaves every
//! earlier project already changed.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{DiffResult, ProjectQuotaDocument, QuotaCategory, ReferenceDocument};

use super::backend::QuotaBackend;
use super::collector::QuotaCollector;
use super::differ::{diff_document, diff_documents, StructuralDiff};
use super::normalize::normalize;
use super::selector::{select, ExcludeList};

/// Snapshot quotas for `project_ids`, or every project when empty
pub async fn snapshot<B: QuotaBackend + ?Sized>(
    backend: &B,
    project_ids: Vec<String>,
) -> Result<Vec<ProjectQuotaDocument>> {
    let documents = QuotaCollector::new(backend, project_ids)
        .await?
        .collect_all()
        .await?;
    log::info!("[quotactl:get] collected quotas for {} projects", documents.len());
    Ok(documents)
}

/// Options for [`apply`]
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Project ids or names to apply; when set, `exclude` is ignored
    pub include: Vec<String>,
    /// Project ids or names to skip
    pub exclude: ExcludeList,
    /// Perform writes; otherwise only report what would be written
    pub commit: bool,
}

/// One category written (or planned) for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedQuota {
    pub project_id: String,
    pub project_name: String,
    pub category: QuotaCategory,
    pub limits: usize,
}

/// Outcome of an apply run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub selected: usize,
    pub committed: bool,
    pub applied: Vec<AppliedQuota>,
}

/// Write the quotas of the selected documents back to the cloud
pub async fn apply<B: QuotaBackend + ?Sized>(
    backend: &B,
    documents: Vec<ProjectQuotaDocument>,
    options: &ApplyOptions,
) -> Result<ApplySummary> {
    let selected = select(documents, &options.include, options.exclude.entries())?;
    log::info!("[quotactl:apply] selected {} projects", selected.len());

    // Every selected entry needs an id before the first write goes out
    if let Some(document) = selected.iter().find(|doc| doc.id.is_none()) {
        return Err(Error::malformed(format!(
            "project {} has no id; cannot apply its quotas",
            document.label()
        )));
    }

    if !options.commit {
        log::warn!("[quotactl:apply] dry run: no quotas will be written (pass --commit to apply)");
    }

    let mut summary = ApplySummary {
        selected: selected.len(),
        committed: options.commit,
        applied: Vec::new(),
    };

    for document in &selected {
        let project_id = document.id.as_deref().unwrap_or_default();
        log::info!("[quotactl:apply] processing quotas for project {}", document.label());

        for category in QuotaCategory::ALL {
            let Some(record) = document.quotas.get(&category) else {
                continue;
            };
            let values = normalize(record);

            log::info!(
                "[quotactl:apply] setting {} quota for project {}",
                category,
                document.label()
            );
            if options.commit {
                backend.set_quota(category, project_id, &values).await?;
            } else {
                log::debug!(
                    "[quotactl:apply] would set {} {} limits on {}",
                    values.len(),
                    category,
                    project_id
                );
            }

            summary.applied.push(AppliedQuota {
                project_id: project_id.to_string(),
                project_name: document.label().to_string(),
                category,
                limits: values.len(),
            });
        }
    }

    Ok(summary)
}

/// Compare already loaded documents against the reference
pub fn compare(
    engine: &dyn StructuralDiff,
    reference: &ReferenceDocument,
    documents: Vec<ProjectQuotaDocument>,
) -> Result<Vec<DiffResult>> {
    diff_documents(engine, reference.quotas(), documents)
}

/// Collect live quotas and compare each project as it arrives
pub async fn compare_live<B: QuotaBackend + ?Sized>(
    engine: &dyn StructuralDiff,
    backend: &B,
    reference: &ReferenceDocument,
    project_ids: Vec<String>,
) -> Result<Vec<DiffResult>> {
    let reference = serde_json::to_value(reference.quotas())?;
    let mut collector = QuotaCollector::new(backend, project_ids).await?;

    let mut diffs = Vec::new();
    while let Some(document) = collector.next_document().await {
        if let Some(result) = diff_document(engine, &reference, &document?)? {
            diffs.push(result);
        }
    }
    Ok(diffs)
}
