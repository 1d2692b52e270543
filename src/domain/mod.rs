// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Domain Models
//!
//! Value types shared by every compiler stage, with the validation
//! invariants the descriptor must satisfy.
//!
//! # Value Objects with Invariants
//!
//! - [`Hostname`] - DNS-validated root domains and aliases (RFC 1123)
//! - [`SubdomainFragment`] - lowercase `[a-z0-9-]` label, `main`/`app` reserved
//! - [`Environment`] - ordered, unique environment variables
//! - [`RegistryCredentials`] - username/password pair for private images
//!
//! # Compiler Intermediate and Output
//!
//! - [`ServiceSpec`] / [`ComposeDocument`] - normalized manifest
//! - [`Template`] - stored manifest skeleton with declared variables
//! - [`DeploymentDescriptor`] - validated output for the control plane

pub mod compose;
pub mod descriptor;
pub mod hostname;
pub mod invariants;
pub mod service;
pub mod template;

pub use compose::{ComposeDocument, ManifestWarning, VolumeSource};
pub use descriptor::{
    DeploymentDescriptor, DeploymentMeta, DeploymentSource, RequestContext, ResourceTier,
    ServiceEndpoint, SslConfig,
};
pub use hostname::{Hostname, HostnameError, SubdomainFragment};
pub use invariants::{ValidationError, ValidationResult};
pub use service::{
    is_credential_key, Environment, RegistryCredentials, ServiceSpec, CUSTOM_BUILD_IMAGE,
    PORT_LABEL, SUBDOMAIN_LABEL,
};
pub use template::{Template, TemplateCategory, TemplateVariable, VariableType};
