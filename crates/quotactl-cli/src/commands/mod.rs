//! CLI commands module
//!
//! Contains all CLI command implementations.

pub mod apply;
pub mod compare;
pub mod get;

use anyhow::{Context as _, Result};
use quotactl_core::{CloudConfig, OpenStackClient};

use crate::output::OutputFormat;

/// Shared context for all commands
pub struct Context {
    pub format: OutputFormat,
    pub quiet: bool,
    pub os_cloud: Option<String>,
}

impl Context {
    /// Build the cloud backend; authentication waits for the first call
    pub fn backend(&self) -> Result<OpenStackClient> {
        let config = CloudConfig::resolve(self.os_cloud.as_deref())
            .context("Failed to load cloud configuration")?;
        OpenStackClient::new(config).context("Failed to create OpenStack client")
    }
}
