//! OpenStack implementation of the quota backend

pub mod client;
pub mod config;

pub use client::{category_endpoint, CategoryEndpoint, OpenStackClient};
pub use config::CloudConfig;
