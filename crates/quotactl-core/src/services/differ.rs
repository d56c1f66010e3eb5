//! Structural quota diffing
//!
//! Compares a reference quotas mapping against each project's quotas and
//! reports additions, removals and changed values at every nesting level
//! (category -> resource -> limit).
//!
//! The diff engine is gated behind the `structural-diff` cargo feature.
//! [`diff_engine`] reports `Error::MissingCapability` when it is compiled
//! out, so `compare` can fail before touching the cloud or any file.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{DiffResult, ProjectQuotaDocument, QuotaSet};

/// Recursive delta between two JSON values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuotaDiff {
    /// Same key, different value
    Changed { before: Value, after: Value },
    /// Key only present in the subject
    Added { added: Value },
    /// Key only present in the reference
    Removed { removed: Value },
    /// Both sides are objects; per-key deltas, never empty
    Nested(BTreeMap<String, QuotaDiff>),
}

impl QuotaDiff {
    /// Flatten into `(dotted.path, reference, subject)` rows
    pub fn leaves(&self) -> Vec<(String, Option<&Value>, Option<&Value>)> {
        let mut rows = Vec::new();
        self.collect_leaves(String::new(), &mut rows);
        rows
    }

    fn collect_leaves<'a>(
        &'a self,
        path: String,
        rows: &mut Vec<(String, Option<&'a Value>, Option<&'a Value>)>,
    ) {
        match self {
            QuotaDiff::Changed { before, after } => rows.push((path, Some(before), Some(after))),
            QuotaDiff::Added { added } => rows.push((path, None, Some(added))),
            QuotaDiff::Removed { removed } => rows.push((path, Some(removed), None)),
            QuotaDiff::Nested(children) => {
                for (key, child) in children {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    child.collect_leaves(child_path, rows);
                }
            }
        }
    }
}

/// Structural comparison capability used by `compare`
pub trait StructuralDiff {
    /// Returns `None` when both values are structurally equal
    fn diff(&self, reference: &Value, subject: &Value) -> Option<QuotaDiff>;
}

/// Key-by-key recursive comparison of JSON objects
#[cfg(feature = "structural-diff")]
#[derive(Debug, Default, Clone, Copy)]
pub struct RecursiveDiff;

#[cfg(feature = "structural-diff")]
impl StructuralDiff for RecursiveDiff {
    fn diff(&self, reference: &Value, subject: &Value) -> Option<QuotaDiff> {
        match (reference, subject) {
            (Value::Object(before), Value::Object(after)) => {
                let mut children = BTreeMap::new();

                for (key, old) in before {
                    match after.get(key) {
                        Some(new) => {
                            if let Some(child) = self.diff(old, new) {
                                children.insert(key.clone(), child);
                            }
                        }
                        None => {
                            children.insert(key.clone(), QuotaDiff::Removed { removed: old.clone() });
                        }
                    }
                }
                for (key, new) in after {
                    if !before.contains_key(key) {
                        children.insert(key.clone(), QuotaDiff::Added { added: new.clone() });
                    }
                }

                if children.is_empty() {
                    None
                } else {
                    Some(QuotaDiff::Nested(children))
                }
            }
            (old, new) if old == new => None,
            (old, new) => Some(QuotaDiff::Changed {
                before: old.clone(),
                after: new.clone(),
            }),
        }
    }
}

/// Resolve the diff engine compiled into this build
#[cfg(feature = "structural-diff")]
pub fn diff_engine() -> Result<Box<dyn StructuralDiff>> {
    Ok(Box::new(RecursiveDiff))
}

/// Resolve the diff engine compiled into this build
#[cfg(not(feature = "structural-diff"))]
pub fn diff_engine() -> Result<Box<dyn StructuralDiff>> {
    Err(crate::error::Error::missing_capability(
        "compare requires the structural-diff feature; rebuild quotactl with default features",
    ))
}

/// Diff one document against the reference; `None` when it matches
pub fn diff_document(
    engine: &dyn StructuralDiff,
    reference: &Value,
    document: &ProjectQuotaDocument,
) -> Result<Option<DiffResult>> {
    let subject = serde_json::to_value(&document.quotas)?;

    let Some(diff) = engine.diff(reference, &subject) else {
        log::debug!("[quotactl:compare] quota for project {} matches reference", document.label());
        return Ok(None);
    };

    log::warn!("[quotactl:compare] quota for project {} differs from reference", document.label());
    Ok(Some(DiffResult {
        name: document.name.clone(),
        id: document.id.clone(),
        diff,
    }))
}

/// Diff every document against the reference, keeping only differing ones
pub fn diff_documents<I>(
    engine: &dyn StructuralDiff,
    reference: &QuotaSet,
    documents: I,
) -> Result<Vec<DiffResult>>
where
    I: IntoIterator<Item = ProjectQuotaDocument>,
{
    let reference = serde_json::to_value(reference)?;
    let mut diffs = Vec::new();
    for document in documents {
        if let Some(result) = diff_document(engine, &reference, &document)? {
            diffs.push(result);
        }
    }
    Ok(diffs)
}
