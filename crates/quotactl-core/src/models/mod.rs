//! Data models shared by the collector, selector, normalizer and differ

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::services::differ::QuotaDiff;

/// Sentinel limit meaning "no explicit cap configured"
pub const UNLIMITED: i64 = -1;

/// Metadata key some backends embed in quota responses
pub const METADATA_ID_KEY: &str = "id";

// ============ Projects ============

/// Identity of a project as returned by the identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
}

impl ProjectRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

// ============ Categories ============

/// Resource domain with its own limit schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaCategory {
    Compute,
    Network,
    Volume,
}

impl QuotaCategory {
    /// Every category, in the order reads and writes are issued
    pub const ALL: [QuotaCategory; 3] = [
        QuotaCategory::Compute,
        QuotaCategory::Network,
        QuotaCategory::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaCategory::Compute => "compute",
            QuotaCategory::Network => "network",
            QuotaCategory::Volume => "volume",
        }
    }
}

impl std::fmt::Display for QuotaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuotaCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compute" | "nova" => Ok(QuotaCategory::Compute),
            "network" | "neutron" => Ok(QuotaCategory::Network),
            "volume" | "cinder" => Ok(QuotaCategory::Volume),
            _ => Err(format!("Unknown quota category: {}", s)),
        }
    }
}

// ============ Quotas ============

/// Resource name -> limit for one category of one project.
///
/// Values are kept as JSON so backend-specific extras (the `id` field, per
/// volume-type keys) survive a snapshot untouched.
pub type QuotaRecord = BTreeMap<String, Value>;

/// Category -> record for one project
pub type QuotaSet = BTreeMap<QuotaCategory, QuotaRecord>;

/// Unit of storage, comparison and transfer
///
/// `id` and `name` are optional so hand-edited files missing them can be
/// loaded and reported by the selector rather than rejected wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectQuotaDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub quotas: QuotaSet,
}

impl ProjectQuotaDocument {
    pub fn new(project: &ProjectRef, quotas: QuotaSet) -> Self {
        Self {
            id: Some(project.id.clone()),
            name: Some(project.name.clone()),
            quotas,
        }
    }

    /// Human-facing label: name, then id, then a placeholder
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("<unnamed>")
    }
}

/// Baseline for `compare`: a full document or a bare quotas mapping
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceDocument {
    Document(ProjectQuotaDocument),
    Bare(QuotaSet),
}

impl ReferenceDocument {
    pub fn quotas(&self) -> &QuotaSet {
        match self {
            ReferenceDocument::Document(doc) => &doc.quotas,
            ReferenceDocument::Bare(quotas) => quotas,
        }
    }
}

// ============ Reports ============

/// One differing project in a compare report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffResult {
    pub name: Option<String>,
    pub id: Option<String>,
    pub diff: QuotaDiff,
}
