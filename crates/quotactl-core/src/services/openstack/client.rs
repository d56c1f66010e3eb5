//! OpenStack quota backend
//!
//! Implements [`QuotaBackend`] against the Keystone v3, Nova, Neutron and
//! Cinder REST APIs.
//!
//! # Overview
//!
//! The client authenticates lazily: the first remote call posts to
//! `{auth_url}/v3/auth/tokens`, keeps the `X-Subject-Token` and the service
//! catalog, and reuses both for the rest of the process. Commands that only
//! work on files therefore never contact the cloud.
//!
//! Each quota category is described by one entry of a fixed endpoint table
//! (catalog service type, resource path, JSON envelope key). Reads `GET` the
//! resource and unwrap the envelope; writes `PUT` the same resource with the
//! values wrapped in that envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;

use crate::error::{Error, Result};
use crate::models::{ProjectRef, QuotaCategory, QuotaRecord};
use crate::services::backend::QuotaBackend;

use super::config::CloudConfig;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header carrying a freshly issued Keystone token
const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Header carrying the token on every other request
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

const USER_AGENT: &str = concat!("quotactl/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Category endpoint table
// ============================================================================

/// Where one quota category lives in the cloud
#[derive(Debug)]
pub struct CategoryEndpoint {
    /// Catalog service types, in order of preference
    pub service_types: &'static [&'static str],
    /// Resource path below the service endpoint; the project id is appended
    pub path: &'static str,
    /// Key wrapping the limits in request and response bodies
    pub envelope: &'static str,
}

static COMPUTE_ENDPOINT: CategoryEndpoint = CategoryEndpoint {
    service_types: &["compute"],
    path: "os-quota-sets",
    envelope: "quota_set",
};

static NETWORK_ENDPOINT: CategoryEndpoint = CategoryEndpoint {
    service_types: &["network"],
    path: "v2.0/quotas",
    envelope: "quota",
};

static VOLUME_ENDPOINT: CategoryEndpoint = CategoryEndpoint {
    service_types: &["volumev3", "block-storage", "volume"],
    path: "os-quota-sets",
    envelope: "quota_set",
};

/// Read/write description for `category`
pub fn category_endpoint(category: QuotaCategory) -> &'static CategoryEndpoint {
    match category {
        QuotaCategory::Compute => &COMPUTE_ENDPOINT,
        QuotaCategory::Network => &NETWORK_ENDPOINT,
        QuotaCategory::Volume => &VOLUME_ENDPOINT,
    }
}

/// Build the quota resource URL for `project_id` below `base`
fn quota_url(base: &str, endpoint: &CategoryEndpoint, project_id: &str) -> String {
    let base = base.trim_end_matches('/');
    // Some catalogs publish the network endpoint with its version suffix
    let base = base.strip_suffix("/v2.0").unwrap_or(base);
    format!("{}/{}/{}", base, endpoint.path, project_id)
}

/// Normalize an identity URL so it ends in `/v3`
fn identity_v3_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if url.ends_with("/v3") {
        url.to_string()
    } else {
        format!("{}/v3", url)
    }
}

// ============================================================================
// Keystone types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: TokenBody,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    #[serde(default)]
    catalog: Vec<CatalogService>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogService {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogEndpoint {
    interface: String,
    region: Option<String>,
    region_id: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ProjectList {
    projects: Vec<ProjectRef>,
    links: Option<PageLinks>,
}

#[derive(Debug, Deserialize)]
struct PageLinks {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectEnvelope {
    project: ProjectRef,
}

/// Authenticated state shared by every call
#[derive(Debug)]
struct Session {
    token: String,
    catalog: Vec<CatalogService>,
    identity_url: String,
}

/// First endpoint matching any of `service_types` (in preference order),
/// `interface`, and `region` when one is configured
fn find_endpoint<'a>(
    catalog: &'a [CatalogService],
    service_types: &[&str],
    interface: &str,
    region: Option<&str>,
) -> Option<&'a str> {
    service_types.iter().find_map(|service_type| {
        catalog
            .iter()
            .filter(|service| service.service_type == *service_type)
            .flat_map(|service| service.endpoints.iter())
            .find(|endpoint| {
                endpoint.interface == interface
                    && region.map_or(true, |r| {
                        endpoint.region.as_deref() == Some(r) || endpoint.region_id.as_deref() == Some(r)
                    })
            })
            .map(|endpoint| endpoint.url.as_str())
    })
}

/// Keystone v3 token request for `config`
fn auth_request_body(config: &CloudConfig) -> Value {
    let identity = match &config.token {
        Some(token) => json!({
            "methods": ["token"],
            "token": {"id": token}
        }),
        None => json!({
            "methods": ["password"],
            "password": {
                "user": {
                    "name": config.username,
                    "domain": {"name": config.user_domain()},
                    "password": config.password
                }
            }
        }),
    };

    let mut auth = json!({ "identity": identity });
    if let Some(project_id) = &config.project_id {
        auth["scope"] = json!({"project": {"id": project_id}});
    } else if let Some(project_name) = &config.project_name {
        auth["scope"] = json!({
            "project": {
                "name": project_name,
                "domain": {"name": config.project_domain()}
            }
        });
    }

    json!({ "auth": auth })
}

/// Unwrap the limits from a quota response body
fn extract_record(mut body: Value, envelope: &str) -> std::result::Result<QuotaRecord, String> {
    match body.get_mut(envelope).map(Value::take) {
        Some(Value::Object(limits)) => Ok(limits.into_iter().collect()),
        Some(other) => Err(format!("'{}' is not an object: {}", envelope, other)),
        None => Err(format!("response has no '{}' field", envelope)),
    }
}

// ============================================================================
// OpenStackClient
// ============================================================================

/// Quota backend talking to an OpenStack cloud
pub struct OpenStackClient {
    config: CloudConfig,
    client: Client,
    session: OnceCell<Session>,
}

impl OpenStackClient {
    /// Create a client; no request is made until the first backend call
    pub fn new(config: CloudConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            config,
            client,
            session: OnceCell::new(),
        })
    }

    async fn session(&self) -> Result<&Session> {
        self.session.get_or_try_init(|| self.authenticate()).await
    }

    async fn authenticate(&self) -> Result<Session> {
        self.config.validate()?;
        let auth_url = identity_v3_url(self.config.auth_url.as_deref().unwrap_or_default());
        log::info!("[quotactl:openstack] authenticating against {}", auth_url);

        let response = self
            .client
            .post(format!("{}/auth/tokens", auth_url))
            .header("Accept", "application/json")
            .json(&auth_request_body(&self.config))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[quotactl:openstack] authentication failed: HTTP {}", status);
            return Err(Error::auth(format!(
                "identity service returned HTTP {}: {}",
                status, body
            )));
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::auth("identity service returned no X-Subject-Token header"))?;

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("invalid token response: {}", e)))?;

        let identity_url = find_endpoint(
            &body.token.catalog,
            &["identity"],
            self.config.interface(),
            self.config.region_name.as_deref(),
        )
        .map(identity_v3_url)
        .unwrap_or(auth_url);

        log::debug!(
            "[quotactl:openstack] authenticated; {} catalog services",
            body.token.catalog.len()
        );
        Ok(Session {
            token,
            catalog: body.token.catalog,
            identity_url,
        })
    }

    fn service_endpoint<'s>(&self, session: &'s Session, endpoint: &CategoryEndpoint) -> Option<&'s str> {
        find_endpoint(
            &session.catalog,
            endpoint.service_types,
            self.config.interface(),
            self.config.region_name.as_deref(),
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, session: &Session, url: &str, operation: &str) -> Result<T> {
        log::debug!("[quotactl:openstack] GET {}", url);
        let response = self
            .client
            .get(url)
            .header(AUTH_TOKEN_HEADER, &session.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::upstream_read(operation, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream_read(operation, format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::upstream_read(operation, format!("invalid response: {}", e)))
    }
}

#[async_trait]
impl QuotaBackend for OpenStackClient {
    async fn list_projects(&self) -> Result<Vec<ProjectRef>> {
        let session = self.session().await?;
        let mut next = Some(format!("{}/projects", session.identity_url));
        let mut projects = Vec::new();

        while let Some(url) = next.take() {
            let page: ProjectList = self.get_json(session, &url, "list projects").await?;
            projects.extend(page.projects);
            next = page.links.and_then(|links| links.next);
        }

        log::debug!("[quotactl:openstack] found {} projects", projects.len());
        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> Result<ProjectRef> {
        let session = self.session().await?;
        let url = format!("{}/projects/{}", session.identity_url, id);
        let envelope: ProjectEnvelope = self
            .get_json(session, &url, &format!("get project {}", id))
            .await?;
        Ok(envelope.project)
    }

    async fn get_quota(&self, category: QuotaCategory, project_id: &str) -> Result<QuotaRecord> {
        let session = self.session().await?;
        let endpoint = category_endpoint(category);

        let Some(base) = self.service_endpoint(session, endpoint) else {
            log::warn!(
                "[quotactl:openstack] no {} service in catalog; treating {} quota as empty",
                endpoint.service_types.join("/"),
                category
            );
            return Ok(QuotaRecord::new());
        };

        let operation = format!("get {} quota for project {}", category, project_id);
        let body: Value = self
            .get_json(session, &quota_url(base, endpoint, project_id), &operation)
            .await?;
        extract_record(body, endpoint.envelope).map_err(|msg| Error::upstream_read(&operation, msg))
    }

    async fn set_quota(
        &self,
        category: QuotaCategory,
        project_id: &str,
        values: &QuotaRecord,
    ) -> Result<()> {
        let session = self.session().await?;
        let endpoint = category_endpoint(category);
        let operation = format!("set {} quota for project {}", category, project_id);

        let base = self.service_endpoint(session, endpoint).ok_or_else(|| {
            Error::upstream_write(&operation, format!("no {} service in catalog", category))
        })?;

        let limits: Map<String, Value> = values.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let mut body = Map::new();
        body.insert(endpoint.envelope.to_string(), Value::Object(limits));

        let url = quota_url(base, endpoint, project_id);
        log::debug!("[quotactl:openstack] PUT {}", url);
        let response = self
            .client
            .put(&url)
            .header(AUTH_TOKEN_HEADER, &session.token)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream_write(&operation, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            log::error!("[quotactl:openstack] {} failed: HTTP {}", operation, status);
            return Err(Error::upstream_write(
                &operation,
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
