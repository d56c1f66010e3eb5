//! # quotactl-core
//!
//! Core logic for quotactl: snapshot, reapply and compare OpenStack project
//! quotas.
//!
//! This crate provides:
//! - Data models (`models` module)
//! - Collection, selection, normalization and diffing (`services` module)
//! - The OpenStack backend (`services::openstack`)
//! - Unified error handling (`error` module)

pub mod error;
pub mod models;
pub mod services;

// Re-exports for convenience
pub use error::{Error, Result};

pub use models::{
    DiffResult, ProjectQuotaDocument, ProjectRef, QuotaCategory, QuotaRecord, QuotaSet,
    ReferenceDocument, UNLIMITED,
};

pub use services::{
    apply, compare, compare_live, diff_engine, load_documents, load_reference, normalize, select,
    snapshot, write_json, AppliedQuota, ApplyOptions, ApplySummary, CloudConfig, ExcludeList,
    OpenStackClient, QuotaBackend, QuotaCollector, QuotaDiff, StructuralDiff,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}
