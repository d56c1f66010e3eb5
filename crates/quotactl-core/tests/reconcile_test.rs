//! Orchestration tests against an in-memory backend

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use quotactl_core::models::{
    ProjectQuotaDocument, ProjectRef, QuotaCategory, QuotaRecord, QuotaSet, ReferenceDocument,
};
use quotactl_core::services::reconcile::{apply, compare_live, snapshot, ApplyOptions};
use quotactl_core::services::{ExcludeList, QuotaBackend, QuotaCollector};
use quotactl_core::{Error, Result};
use serde_json::{json, Value};

// ============ Fake backend ============

#[derive(Default)]
struct FakeBackend {
    projects: Vec<ProjectRef>,
    quotas: BTreeMap<(String, QuotaCategory), QuotaRecord>,
    failing_project: Option<String>,
    calls: Mutex<Vec<String>>,
    writes: Mutex<Vec<(String, QuotaCategory, QuotaRecord)>>,
}

impl FakeBackend {
    fn with_project(mut self, id: &str, name: &str, compute: Value) -> Self {
        self.projects.push(ProjectRef::new(id, name));
        self.quotas
            .insert((id.to_string(), QuotaCategory::Compute), record(compute));
        self
    }

    fn failing_on(mut self, id: &str) -> Self {
        self.failing_project = Some(id.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn writes(&self) -> Vec<(String, QuotaCategory, QuotaRecord)> {
        self.writes.lock().unwrap().clone()
    }

    fn record_call(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, id: &str, operation: &str) -> Result<()> {
        if self.failing_project.as_deref() == Some(id) {
            return Err(Error::upstream_read(operation, "HTTP 500: boom"));
        }
        Ok(())
    }
}

#[async_trait]
impl QuotaBackend for FakeBackend {
    async fn list_projects(&self) -> Result<Vec<ProjectRef>> {
        self.record_call("list_projects".to_string());
        Ok(self.projects.clone())
    }

    async fn get_project(&self, id: &str) -> Result<ProjectRef> {
        self.record_call(format!("get_project {}", id));
        self.check(id, "get project")?;
        self.projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| Error::upstream_read(format!("get project {}", id), "HTTP 404"))
    }

    async fn get_quota(&self, category: QuotaCategory, project_id: &str) -> Result<QuotaRecord> {
        self.record_call(format!("get_quota {} {}", category, project_id));
        Ok(self
            .quotas
            .get(&(project_id.to_string(), category))
            .cloned()
            .unwrap_or_default())
    }

    async fn set_quota(
        &self,
        category: QuotaCategory,
        project_id: &str,
        values: &QuotaRecord,
    ) -> Result<()> {
        self.record_call(format!("set_quota {} {}", category, project_id));
        if self.failing_project.as_deref() == Some(project_id) {
            return Err(Error::upstream_write(
                format!("set {} quota for project {}", category, project_id),
                "HTTP 403",
            ));
        }
        self.writes
            .lock()
            .unwrap()
            .push((project_id.to_string(), category, values.clone()));
        Ok(())
    }
}

fn record(value: Value) -> QuotaRecord {
    serde_json::from_value(value).unwrap()
}

fn document(id: &str, name: &str, compute: Value) -> ProjectQuotaDocument {
    let mut quotas = QuotaSet::new();
    quotas.insert(QuotaCategory::Compute, record(compute));
    ProjectQuotaDocument::new(&ProjectRef::new(id, name), quotas)
}

fn three_projects() -> FakeBackend {
    FakeBackend::default()
        .with_project("a", "alpha", json!({"id": "a", "cores": 10, "ram": -1}))
        .with_project("b", "bravo", json!({"id": "b", "cores": 20}))
        .with_project("c", "charlie", json!({"id": "c", "cores": 10}))
}

// ============ Collector / get ============

#[tokio::test]
async fn test_snapshot_reads_every_category_in_order() {
    let backend = three_projects();
    let docs = snapshot(&backend, vec!["b".to_string()]).await.unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(
        backend.calls(),
        vec![
            "get_project b",
            "get_quota compute b",
            "get_quota network b",
            "get_quota volume b",
        ]
    );
}

#[tokio::test]
async fn test_snapshot_strips_id_but_keeps_unlimited() {
    let backend = three_projects();
    let docs = snapshot(&backend, vec!["a".to_string()]).await.unwrap();

    let compute = &docs[0].quotas[&QuotaCategory::Compute];
    assert!(!compute.contains_key("id"));
    assert_eq!(compute["ram"], json!(-1));
    assert_eq!(docs[0].id.as_deref(), Some("a"));
    assert_eq!(docs[0].name.as_deref(), Some("alpha"));
    assert!(docs[0].quotas[&QuotaCategory::Network].is_empty());
}

#[tokio::test]
async fn test_snapshot_without_ids_lists_all_projects() {
    let backend = three_projects();
    let docs = snapshot(&backend, Vec::new()).await.unwrap();

    let ids: Vec<_> = docs.iter().map(|d| d.id.clone().unwrap()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(backend.calls()[0], "list_projects");
}

#[tokio::test]
async fn test_collector_is_lazy() {
    let backend = three_projects();
    let mut collector = QuotaCollector::new(&backend, vec!["a".to_string(), "c".to_string()])
        .await
        .unwrap();
    assert_eq!(collector.remaining(), 2);
    assert!(backend.calls().is_empty());

    let first = collector.next_document().await.unwrap().unwrap();
    assert_eq!(first.id.as_deref(), Some("a"));
    assert_eq!(collector.remaining(), 1);
    assert_eq!(backend.calls().len(), 4);

    collector.next_document().await.unwrap().unwrap();
    assert!(collector.next_document().await.is_none());
}

#[tokio::test]
async fn test_snapshot_stops_at_first_failure() {
    let backend = three_projects().failing_on("b");
    let err = snapshot(&backend, Vec::new()).await.unwrap_err();

    assert!(matches!(err, Error::UpstreamRead { .. }));
    assert!(!backend.calls().iter().any(|call| call.ends_with(" c")));
}

// ============ Apply ============

#[tokio::test]
async fn test_apply_dry_run_writes_nothing() {
    let backend = three_projects();
    let docs = vec![document("a", "alpha", json!({"cores": 10}))];

    let summary = apply(&backend, docs, &ApplyOptions::default()).await.unwrap();

    assert!(!summary.committed);
    assert_eq!(summary.selected, 1);
    assert_eq!(summary.applied.len(), 1);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_apply_commit_writes_normalized_records() {
    let backend = three_projects();
    let docs = vec![document(
        "a",
        "alpha",
        json!({"id": "a", "cores": -1, "ram": 2048}),
    )];
    let options = ApplyOptions {
        commit: true,
        ..Default::default()
    };

    let summary = apply(&backend, docs, &options).await.unwrap();

    assert!(summary.committed);
    let writes = backend.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, "a");
    assert_eq!(writes[0].1, QuotaCategory::Compute);
    assert_eq!(writes[0].2, record(json!({"ram": 2048})));
}

#[tokio::test]
async fn test_apply_exclude_skips_projects() {
    let backend = three_projects();
    let docs = vec![
        document("a", "alpha", json!({"cores": 1})),
        document("b", "bravo", json!({"cores": 2})),
        document("c", "charlie", json!({"cores": 3})),
    ];
    let options = ApplyOptions {
        exclude: ExcludeList::new(vec!["bravo".to_string()]),
        commit: true,
        ..Default::default()
    };

    apply(&backend, docs, &options).await.unwrap();

    let written: Vec<_> = backend.writes().into_iter().map(|w| w.0).collect();
    assert_eq!(written, vec!["a", "c"]);
}

#[tokio::test]
async fn test_apply_include_overrides_exclude() {
    let backend = three_projects();
    let docs = vec![
        document("a", "alpha", json!({"cores": 1})),
        document("c", "charlie", json!({"cores": 3})),
    ];
    let options = ApplyOptions {
        include: vec!["c".to_string()],
        exclude: ExcludeList::new(vec!["c".to_string()]),
        commit: true,
    };

    let summary = apply(&backend, docs, &options).await.unwrap();

    assert_eq!(summary.selected, 1);
    let written: Vec<_> = backend.writes().into_iter().map(|w| w.0).collect();
    assert_eq!(written, vec!["c"]);
}

#[tokio::test]
async fn test_apply_include_with_incomplete_entry_fails_before_writing() {
    let backend = three_projects();
    let mut nameless = document("b", "bravo", json!({"cores": 2}));
    nameless.name = None;
    let docs = vec![document("a", "alpha", json!({"cores": 1})), nameless];
    let options = ApplyOptions {
        include: vec!["a".to_string()],
        commit: true,
        ..Default::default()
    };

    let err = apply(&backend, docs, &options).await.unwrap_err();

    assert!(matches!(err, Error::Selection(_)));
    assert!(backend.writes().is_empty());
}

#[tokio::test]
async fn test_apply_without_id_is_malformed() {
    let backend = three_projects();
    let mut anonymous = document("x", "xray", json!({"cores": 1}));
    anonymous.id = None;
    let options = ApplyOptions {
        commit: true,
        ..Default::default()
    };

    let err = apply(&backend, vec![anonymous], &options).await.unwrap_err();
    assert!(matches!(err, Error::MalformedDocument(_)));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_apply_failure_keeps_earlier_writes() {
    let backend = three_projects().failing_on("b");
    let docs = vec![
        document("a", "alpha", json!({"cores": 1})),
        document("b", "bravo", json!({"cores": 2})),
        document("c", "charlie", json!({"cores": 3})),
    ];
    let options = ApplyOptions {
        commit: true,
        ..Default::default()
    };

    let err = apply(&backend, docs, &options).await.unwrap_err();

    assert!(matches!(err, Error::UpstreamWrite { .. }));
    let written: Vec<_> = backend.writes().into_iter().map(|w| w.0).collect();
    assert_eq!(written, vec!["a"]);
}

// ============ Compare ============

#[cfg(feature = "structural-diff")]
#[tokio::test]
async fn test_compare_live_reports_only_differing_projects() {
    use quotactl_core::services::diff_engine;

    let backend = three_projects();
    let mut reference = QuotaSet::new();
    reference.insert(QuotaCategory::Compute, record(json!({"cores": 10})));
    for category in [QuotaCategory::Network, QuotaCategory::Volume] {
        reference.insert(category, QuotaRecord::new());
    }
    let reference = ReferenceDocument::Bare(reference);

    let engine = diff_engine().unwrap();
    let diffs = compare_live(engine.as_ref(), &backend, &reference, Vec::new())
        .await
        .unwrap();

    // "a" carries an extra unlimited ram entry; "c" matches exactly
    let ids: Vec<_> = diffs.iter().map(|d| d.id.clone().unwrap()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(diffs[1].name.as_deref(), Some("bravo"));
}
