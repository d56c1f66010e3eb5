//! Project selection
//!
//! Include and exclude lists hold project ids or names interchangeably. A
//! non-empty include list wins outright and the exclude list is ignored.

use std::collections::HashSet;
use std::io::BufRead;

use crate::error::{Error, Result};
use crate::models::{ProjectQuotaDocument, ProjectRef};

/// Anything that can be matched against an include/exclude token
pub trait ProjectIdentity {
    fn project_id(&self) -> Option<&str>;
    fn project_name(&self) -> Option<&str>;
}

impl ProjectIdentity for ProjectRef {
    fn project_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn project_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl ProjectIdentity for ProjectQuotaDocument {
    fn project_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn project_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Exclusions gathered from command-line tokens and an optional list file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeList {
    entries: Vec<String>,
}

impl ExcludeList {
    pub fn new(entries: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Append one token per non-blank line of `reader`
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            let token = line.trim();
            if !token.is_empty() {
                self.entries.push(token.to_string());
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_match<T: ProjectIdentity>(item: &T, tokens: &HashSet<&str>) -> bool {
    item.project_id().is_some_and(|id| tokens.contains(id))
        || item.project_name().is_some_and(|name| tokens.contains(name))
}

/// Resolve which items an operation acts on, preserving input order
pub fn select<T: ProjectIdentity>(items: Vec<T>, include: &[String], exclude: &[String]) -> Result<Vec<T>> {
    if !include.is_empty() {
        let tokens: HashSet<&str> = include.iter().map(String::as_str).collect();
        if !exclude.is_empty() {
            log::debug!("[quotactl:select] include list given, ignoring {} exclusions", exclude.len());
        }

        let mut selected = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            if item.project_id().is_none() || item.project_name().is_none() {
                let known = item
                    .project_id()
                    .or(item.project_name())
                    .map(|s| format!(" ({})", s))
                    .unwrap_or_default();
                return Err(Error::selection(format!(
                    "no quota for project: entry #{}{} is missing its id or name",
                    index + 1,
                    known
                )));
            }
            if is_match(&item, &tokens) {
                selected.push(item);
            }
        }
        return Ok(selected);
    }

    if !exclude.is_empty() {
        let tokens: HashSet<&str> = exclude.iter().map(String::as_str).collect();
        return Ok(items.into_iter().filter(|item| !is_match(item, &tokens)).collect());
    }

    Ok(items)
}
