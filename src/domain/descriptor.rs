// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Descriptor - the compiler's only output
//!
//! The descriptor is what the hosting control plane receives. It is built by
//! the assembler once every invariant holds and is not modified afterwards.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Hostname, RegistryCredentials, ServiceSpec};

/// TLS settings requested for the deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslConfig {
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl SslConfig {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            provider: None,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

/// Resource preset chosen in the wizard
///
/// Recorded on the request context; downstream systems apply the limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceTier {
    #[default]
    Small,
    Medium,
    Large,
    Xlarge,
}

impl ResourceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Xlarge => "xlarge",
        }
    }

    /// CPU share of the preset
    pub fn cpus(&self) -> f32 {
        match self {
            Self::Small => 0.5,
            Self::Medium => 1.0,
            Self::Large => 2.0,
            Self::Xlarge => 4.0,
        }
    }

    /// Memory limit of the preset in MiB
    pub fn memory_mb(&self) -> u32 {
        match self {
            Self::Small => 512,
            Self::Medium => 1024,
            Self::Large => 2048,
            Self::Xlarge => 4096,
        }
    }
}

impl fmt::Display for ResourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" | "starter" => Ok(Self::Small),
            "medium" | "standard" => Ok(Self::Medium),
            "large" | "performance" => Ok(Self::Large),
            "xlarge" | "enterprise" => Ok(Self::Xlarge),
            other => Err(format!("unknown resource tier '{}'", other)),
        }
    }
}

/// Which input path produced the compose document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DeploymentSource {
    Manifest,
    Wizard { archetype: String },
    Template { template_id: String },
}

/// Metadata about the compile request, carried into the descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub request_id: Uuid,

    pub requested_at: DateTime<Utc>,

    pub source: DeploymentSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_tier: Option<ResourceTier>,
}

impl RequestContext {
    /// Fresh context stamped with a v7 id and the current time
    pub fn new(source: DeploymentSource) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            requested_at: Utc::now(),
            source,
            resource_tier: None,
        }
    }

    /// Context with caller-chosen id and timestamp (reproducible output)
    pub fn with_identity(source: DeploymentSource, request_id: Uuid, requested_at: DateTime<Utc>) -> Self {
        Self {
            request_id,
            requested_at,
            source,
            resource_tier: None,
        }
    }

    pub fn with_tier(mut self, tier: ResourceTier) -> Self {
        self.resource_tier = Some(tier);
        self
    }
}

/// Caller-supplied deployment fields merged with the service list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentMeta {
    pub domain: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    pub customer_id: String,

    #[serde(default)]
    pub ssl: SslConfig,

    /// Credentials for pulling private images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryCredentials>,

    pub context: RequestContext,
}

impl DeploymentMeta {
    pub fn new(domain: impl Into<String>, customer_id: impl Into<String>, context: RequestContext) -> Self {
        Self {
            domain: domain.into(),
            aliases: Vec::new(),
            customer_id: customer_id.into(),
            ssl: SslConfig::default(),
            registry: None,
            context,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_ssl(mut self, ssl: SslConfig) -> Self {
        self.ssl = ssl;
        self
    }

    pub fn with_registry(mut self, registry: RegistryCredentials) -> Self {
        self.registry = Some(registry);
        self
    }
}

/// Routing entry for one resolved service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    pub service: String,
    pub hostname: Hostname,
    pub container_name: String,
    pub port: u16,
    pub labels: IndexMap<String, String>,
}

/// Canonical, validated multi-service deployment
///
/// # Invariants
/// - `domain` and `aliases` are distinct valid host names
/// - At most one service resolves to `domain`; all other host names are
///   distinct
/// - Every service has a non-empty image and declared named volumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDescriptor {
    pub domain: Hostname,
    pub aliases: Vec<Hostname>,
    pub customer_id: String,
    pub ssl: SslConfig,
    pub project_name: String,
    pub services: Vec<ServiceSpec>,
    pub endpoints: Vec<ServiceEndpoint>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub volumes: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryCredentials>,

    pub context: RequestContext,
}

impl DeploymentDescriptor {
    pub fn service(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn endpoint(&self, service: &str) -> Option<&ServiceEndpoint> {
        self.endpoints.iter().find(|e| e.service == service)
    }

    /// Service served on the bare root domain, if any
    pub fn root_service(&self) -> Option<&ServiceSpec> {
        self.services
            .iter()
            .find(|s| s.hostname.as_ref() == Some(&self.domain))
    }

    /// Serialize for submission to the control plane
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
