//! `quotactl compare`

use anyhow::{Context as _, Result};
use clap::Args;
use quotactl_core::{DiffResult, ProjectQuotaDocument, ReferenceDocument};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tabled::Tabled;

use crate::output::{display_value, emit, print_success, print_warning};
use super::Context;

#[derive(Args)]
pub struct CompareArgs {
    /// Reference quotas: a project document or a bare quotas mapping
    #[arg(value_name = "REFERENCE")]
    pub reference: PathBuf,

    /// Project ids to compare (default: every project)
    pub projects: Vec<String>,

    /// Compare a saved snapshot instead of live quotas
    #[arg(short = 'q', long = "quotafile", value_name = "QUOTAFILE")]
    pub quotafile: Option<PathBuf>,

    /// Write the report to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// One differing limit per row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct DiffRow {
    #[tabled(rename = "Project")]
    pub project: String,
    #[tabled(rename = "Path")]
    pub path: String,
    #[tabled(rename = "Reference")]
    pub reference: String,
    #[tabled(rename = "Actual")]
    pub actual: String,
}

pub fn diff_rows(results: &[DiffResult]) -> Vec<DiffRow> {
    results
        .iter()
        .flat_map(|result| {
            let project = result
                .name
                .clone()
                .or_else(|| result.id.clone())
                .unwrap_or_default();
            result
                .diff
                .leaves()
                .into_iter()
                .map(move |(path, reference, actual)| DiffRow {
                    project: project.clone(),
                    path,
                    reference: display_value(reference),
                    actual: display_value(actual),
                })
        })
        .collect()
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn load_reference(path: &Path) -> Result<ReferenceDocument> {
    Ok(quotactl_core::load_reference(open(path)?, &path.display().to_string())?)
}

fn load_subjects(path: &Path, projects: &[String]) -> Result<Vec<ProjectQuotaDocument>> {
    let documents = quotactl_core::load_documents(open(path)?, &path.display().to_string())?;
    Ok(quotactl_core::select(documents, projects, &[])?)
}

pub async fn execute(ctx: &Context, args: CompareArgs) -> Result<()> {
    // Fails on builds without the structural-diff feature before any I/O
    let engine = quotactl_core::diff_engine()?;
    let reference = load_reference(&args.reference)?;

    let results = match &args.quotafile {
        Some(path) => {
            let documents = load_subjects(path, &args.projects)?;
            quotactl_core::compare(engine.as_ref(), &reference, documents)?
        }
        None => {
            let backend = ctx.backend()?;
            quotactl_core::compare_live(engine.as_ref(), &backend, &reference, args.projects)
                .await
                .context("Failed to compare live quotas")?
        }
    };

    emit(
        &results,
        || diff_rows(&results),
        ctx.format,
        args.output.as_deref(),
        "All projects match the reference.",
    )?;

    if results.is_empty() {
        print_success("All projects match the reference", ctx.quiet);
    } else {
        print_warning(
            &format!("{} projects differ from the reference", results.len()),
            ctx.quiet,
        );
    }
    Ok(())
}
