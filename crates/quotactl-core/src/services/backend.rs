//! Quota backend trait
//!
//! Defines the interface the collector and orchestrators need from the cloud
//! control plane. The OpenStack implementation lives in
//! [`crate::services::openstack`]; tests use in-memory implementations.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ProjectRef, QuotaCategory, QuotaRecord};

/// Project enumeration plus per-category quota reads and writes
///
/// Implementations issue one remote call per method invocation and never
/// retry. Failures surface as `Error::UpstreamRead` or
/// `Error::UpstreamWrite` naming the operation and project.
///
/// # Example Implementation
///
/// ```ignore
/// use async_trait::async_trait;
/// use quotactl_core::services::QuotaBackend;
///
/// struct StaticBackend;
///
/// #[async_trait]
/// impl QuotaBackend for StaticBackend {
///     async fn list_projects(&self) -> Result<Vec<ProjectRef>> {
///         Ok(vec![ProjectRef::new("p1", "demo")])
///     }
///
///     async fn get_project(&self, id: &str) -> Result<ProjectRef> {
///         Ok(ProjectRef::new(id, "demo"))
///     }
///
///     async fn get_quota(&self, _category: QuotaCategory, _project_id: &str) -> Result<QuotaRecord> {
///         Ok(QuotaRecord::new())
///     }
///
///     async fn set_quota(&self, _category: QuotaCategory, _project_id: &str, _values: &QuotaRecord) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait QuotaBackend: Send + Sync {
    /// Every project visible to the current credentials
    async fn list_projects(&self) -> Result<Vec<ProjectRef>>;

    /// Resolve the full identity of a project id
    async fn get_project(&self, id: &str) -> Result<ProjectRef>;

    /// Raw quota record for one category
    ///
    /// A category the cloud does not offer yields an empty record.
    async fn get_quota(&self, category: QuotaCategory, project_id: &str) -> Result<QuotaRecord>;

    /// Write limits for one category
    ///
    /// `values` must already be normalized: no `id`, no `-1`.
    async fn set_quota(
        &self,
        category: QuotaCategory,
        project_id: &str,
        values: &QuotaRecord,
    ) -> Result<()>;
}
