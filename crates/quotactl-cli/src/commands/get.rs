//! `quotactl get`

use anyhow::{Context as _, Result};
use clap::Args;
use quotactl_core::ProjectQuotaDocument;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use crate::output::{display_value, emit, print_success};
use super::Context;

#[derive(Args)]
pub struct GetArgs {
    /// Project ids to read (default: every project)
    pub projects: Vec<String>,

    /// Write the snapshot to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// One limit per row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct QuotaRow {
    #[tabled(rename = "Project")]
    pub project: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Resource")]
    pub resource: String,
    #[tabled(rename = "Limit")]
    pub limit: String,
}

pub fn quota_rows(documents: &[ProjectQuotaDocument]) -> Vec<QuotaRow> {
    documents
        .iter()
        .flat_map(|doc| {
            doc.quotas.iter().flat_map(move |(category, record)| {
                record.iter().map(move |(resource, limit)| QuotaRow {
                    project: doc.label().to_string(),
                    category: category.to_string(),
                    resource: resource.clone(),
                    limit: display_value(Some(limit)),
                })
            })
        })
        .collect()
}

pub async fn execute(ctx: &Context, args: GetArgs) -> Result<()> {
    let backend = ctx.backend()?;
    let documents = quotactl_core::snapshot(&backend, args.projects)
        .await
        .context("Failed to collect project quotas")?;

    emit(
        &documents,
        || quota_rows(&documents),
        ctx.format,
        args.output.as_deref(),
        "No quotas found.",
    )?;

    if let Some(path) = &args.output {
        print_success(
            &format!("Wrote quotas for {} projects to {}", documents.len(), path.display()),
            ctx.quiet,
        );
    }
    Ok(())
}
