//! Cloud connection settings
//!
//! Settings come from a named `clouds.yaml` entry when `--os-cloud` /
//! `OS_CLOUD` is given, otherwise from the standard `OS_*` environment
//! variables. Environment values also fill any gap left by the yaml entry,
//! so passwords can stay out of the file.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Error, Result};

const DEFAULT_INTERFACE: &str = "public";
const DEFAULT_DOMAIN: &str = "Default";

/// Resolved connection settings for one cloud
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudConfig {
    pub auth_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
    pub user_domain_name: Option<String>,
    pub project_domain_name: Option<String>,
    pub token: Option<String>,
    pub region_name: Option<String>,
    pub interface: Option<String>,
}

/// `clouds.yaml` top level
#[derive(Debug, Deserialize)]
struct CloudsFile {
    #[serde(default)]
    clouds: HashMap<String, CloudEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct CloudEntry {
    #[serde(default)]
    auth: AuthSection,
    region_name: Option<String>,
    interface: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthSection {
    auth_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    project_name: Option<String>,
    project_id: Option<String>,
    user_domain_name: Option<String>,
    project_domain_name: Option<String>,
    token: Option<String>,
}

impl CloudConfig {
    /// Resolve settings for `cloud` (if named) with the process environment
    pub fn resolve(cloud: Option<&str>) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        match cloud {
            Some(name) => {
                let path = find_clouds_file(&candidate_paths(env("OS_CLIENT_CONFIG_FILE")))
                    .ok_or_else(|| Error::config(format!("cloud '{}' requested but no clouds.yaml was found", name)))?;
                log::debug!("[quotactl:config] reading cloud '{}' from {:?}", name, path);
                let content = std::fs::read_to_string(&path)?;
                let config = Self::from_clouds_yaml(&content, name)?;
                Ok(config.fill_from(Self::from_lookup(env)))
            }
            None => Ok(Self::from_lookup(env)),
        }
    }

    /// Build settings from `OS_*` variables via `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            auth_url: lookup("OS_AUTH_URL"),
            username: lookup("OS_USERNAME"),
            password: lookup("OS_PASSWORD"),
            project_name: lookup("OS_PROJECT_NAME").or_else(|| lookup("OS_TENANT_NAME")),
            project_id: lookup("OS_PROJECT_ID").or_else(|| lookup("OS_TENANT_ID")),
            user_domain_name: lookup("OS_USER_DOMAIN_NAME"),
            project_domain_name: lookup("OS_PROJECT_DOMAIN_NAME"),
            token: lookup("OS_TOKEN"),
            region_name: lookup("OS_REGION_NAME"),
            interface: lookup("OS_INTERFACE"),
        }
    }

    /// Pick the named entry out of a `clouds.yaml` document
    pub fn from_clouds_yaml(content: &str, cloud: &str) -> Result<Self> {
        let file: CloudsFile = serde_yaml::from_str(content)
            .map_err(|e| Error::config(format!("invalid clouds.yaml: {}", e)))?;

        let mut clouds = file.clouds;
        let entry = clouds
            .remove(cloud)
            .ok_or_else(|| Error::config(format!("cloud '{}' not found in clouds.yaml", cloud)))?;

        let auth = entry.auth;
        Ok(Self {
            auth_url: auth.auth_url,
            username: auth.username,
            password: auth.password,
            project_name: auth.project_name,
            project_id: auth.project_id,
            user_domain_name: auth.user_domain_name,
            project_domain_name: auth.project_domain_name,
            token: auth.token,
            region_name: entry.region_name,
            interface: entry.interface,
        })
    }

    /// Fill unset fields from `other`
    pub fn fill_from(self, other: CloudConfig) -> Self {
        Self {
            auth_url: self.auth_url.or(other.auth_url),
            username: self.username.or(other.username),
            password: self.password.or(other.password),
            project_name: self.project_name.or(other.project_name),
            project_id: self.project_id.or(other.project_id),
            user_domain_name: self.user_domain_name.or(other.user_domain_name),
            project_domain_name: self.project_domain_name.or(other.project_domain_name),
            token: self.token.or(other.token),
            region_name: self.region_name.or(other.region_name),
            interface: self.interface.or(other.interface),
        }
    }

    /// Check that enough is set to authenticate
    pub fn validate(&self) -> Result<()> {
        if self.auth_url.is_none() {
            return Err(Error::config(
                "no auth URL configured; set OS_AUTH_URL or use --os-cloud",
            ));
        }
        if self.token.is_none() && (self.username.is_none() || self.password.is_none()) {
            return Err(Error::config(
                "no credentials configured; set OS_USERNAME and OS_PASSWORD, or OS_TOKEN",
            ));
        }
        Ok(())
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or(DEFAULT_INTERFACE)
    }

    pub fn user_domain(&self) -> &str {
        self.user_domain_name.as_deref().unwrap_or(DEFAULT_DOMAIN)
    }

    pub fn project_domain(&self) -> &str {
        self.project_domain_name.as_deref().unwrap_or(DEFAULT_DOMAIN)
    }
}

/// Places `clouds.yaml` is looked for, most specific first
fn candidate_paths(explicit: Option<String>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = explicit {
        paths.push(PathBuf::from(path));
    }
    paths.push(PathBuf::from("clouds.yaml"));
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("openstack").join("clouds.yaml"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("openstack").join("clouds.yaml"));
    }
    paths.push(PathBuf::from("/etc/openstack/clouds.yaml"));
    paths
}

fn find_clouds_file(paths: &[PathBuf]) -> Option<PathBuf> {
    paths.iter().find(|p| p.is_file()).cloned()
}
