//! Services module

pub mod backend;
pub mod collector;
pub mod differ;
pub mod documents;
pub mod normalize;
pub mod openstack;
pub mod reconcile;
pub mod selector;

pub use backend::QuotaBackend;
pub use collector::QuotaCollector;
pub use differ::{diff_document, diff_documents, diff_engine, QuotaDiff, StructuralDiff};
pub use documents::{load_documents, load_reference, write_json};
pub use normalize::{normalize, strip_metadata};
pub use openstack::{CloudConfig, OpenStackClient};
pub use reconcile::{apply, compare, compare_live, snapshot, AppliedQuota, ApplyOptions, ApplySummary};
pub use selector::{select, ExcludeList, ProjectIdentity};
