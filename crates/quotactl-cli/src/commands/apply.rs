//! `quotactl apply`
//!
//! Reads a snapshot (file or stdin), selects projects and writes each
//! category back. Without `--commit` nothing is sent to the cloud.

use anyhow::{Context as _, Result};
use clap::Args;
use quotactl_core::{AppliedQuota, ApplyOptions, ApplySummary, ExcludeList};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tabled::Tabled;

use crate::output::{emit, print_success, print_warning};
use super::Context;

#[derive(Args)]
pub struct ApplyArgs {
    /// Only apply these project ids or names (overrides exclusions)
    #[arg(short, long = "project", value_name = "ID")]
    pub projects: Vec<String>,

    /// Skip these project ids or names
    #[arg(short = 'x', long = "exclude", value_name = "ID")]
    pub exclude: Vec<String>,

    /// Skip the ids or names listed in FILE, one per line
    #[arg(short = 'X', long = "exclude-from", value_name = "FILE")]
    pub exclude_from: Option<PathBuf>,

    /// Actually write quotas (default is a dry run)
    #[arg(long)]
    pub commit: bool,

    /// Snapshot produced by `quotactl get`, or - for stdin
    #[arg(value_name = "QUOTAFILE", default_value = "-")]
    pub quotafile: String,
}

/// Summary row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct AppliedRow {
    #[tabled(rename = "Project")]
    pub project: String,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Limits")]
    pub limits: usize,
}

impl From<&AppliedQuota> for AppliedRow {
    fn from(applied: &AppliedQuota) -> Self {
        Self {
            project: applied.project_name.clone(),
            id: applied.project_id.clone(),
            category: applied.category.to_string(),
            limits: applied.limits,
        }
    }
}

fn exclude_list(args: &ApplyArgs) -> Result<ExcludeList> {
    let mut exclude = ExcludeList::new(args.exclude.iter().cloned());
    if let Some(path) = &args.exclude_from {
        let file = File::open(path)
            .with_context(|| format!("Failed to open exclude file {}", path.display()))?;
        exclude
            .extend_from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read exclude file {}", path.display()))?;
    }
    Ok(exclude)
}

fn load_snapshot(quotafile: &str) -> Result<Vec<quotactl_core::ProjectQuotaDocument>> {
    if quotafile == "-" {
        return Ok(quotactl_core::load_documents(std::io::stdin().lock(), "<stdin>")?);
    }
    let file = File::open(quotafile).with_context(|| format!("Failed to open {}", quotafile))?;
    Ok(quotactl_core::load_documents(BufReader::new(file), quotafile)?)
}

pub async fn execute(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let options = ApplyOptions {
        include: args.projects.clone(),
        exclude: exclude_list(&args)?,
        commit: args.commit,
    };
    let documents = load_snapshot(&args.quotafile)?;

    let backend = ctx.backend()?;
    let summary: ApplySummary = quotactl_core::apply(&backend, documents, &options)
        .await
        .context("Failed to apply quotas")?;

    emit(
        &summary,
        || summary.applied.iter().map(AppliedRow::from).collect::<Vec<_>>(),
        ctx.format,
        None,
        "No quotas selected.",
    )?;

    if summary.committed {
        print_success(
            &format!("Applied quotas to {} projects", summary.selected),
            ctx.quiet,
        );
    } else {
        print_warning(
            &format!(
                "Dry run: {} projects selected, nothing written. Re-run with --commit to apply.",
                summary.selected
            ),
            ctx.quiet,
        );
    }
    Ok(())
}
