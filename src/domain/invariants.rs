// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Deployment Invariants
//!
//! Business rules checked while turning a [`ComposeDocument`] into a
//! deployment descriptor. All functions are pure (no side effects) and return
//! the first violation they find.
//!
//! # Invariant Categories
//!
//! 1. **Domain Invariants**: root domain and aliases are valid, distinct names
//! 2. **Ownership Invariants**: a customer owns every deployment
//! 3. **Credential Invariants**: registry credentials come in complete pairs
//! 4. **Service Invariants**: images present, named volumes declared
//!
//! Error payloads carry field and entity names only, never values of
//! credential-bearing fields.

use std::collections::HashSet;

use crate::domain::compose::{ComposeDocument, VolumeSource};
use crate::domain::hostname::Hostname;
use crate::domain::service::{RegistryCredentials, ServiceSpec};

/// Validation result with detailed error information
pub type ValidationResult<T = ()> = Result<T, ValidationError>;

/// Semantic violation found while compiling a deployment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Root domain missing or not a DNS-safe name
    #[error("Invalid domain '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    /// Alias is not a DNS-safe name
    #[error("Invalid alias '{alias}': {reason}")]
    InvalidAlias { alias: String, reason: String },

    /// Alias repeats the root domain
    #[error("Alias '{alias}' duplicates the root domain")]
    AliasDuplicatesDomain { alias: String },

    /// Alias listed more than once
    #[error("Alias '{alias}' is listed more than once")]
    DuplicateAlias { alias: String },

    /// No customer owns the deployment
    #[error("Customer ID is required")]
    MissingCustomerId,

    /// Registry username without password or the reverse
    #[error("Incomplete registry credentials for {scope}: missing {missing}")]
    IncompleteCredentials { scope: String, missing: String },

    /// Document contains no services
    #[error("Deployment contains no services")]
    EmptyDeployment,

    /// Two services share a name
    #[error("Service '{name}' is defined more than once")]
    DuplicateService { name: String },

    /// Service image is empty
    #[error("Service '{service}' has no image")]
    MissingImage { service: String },

    /// Named volume not declared at the top level
    #[error("Service '{service}' mounts undeclared volume '{volume}'")]
    UndeclaredVolume { service: String, volume: String },

    /// Fragment outside `[a-z0-9-]` or not a valid DNS label
    #[error("Service '{service}' has invalid subdomain '{fragment}'")]
    InvalidSubdomain { service: String, fragment: String },

    /// More than one service claims the root domain
    #[error("Services {services:?} all resolve to the root domain")]
    RootDomainConflict { services: Vec<String> },

    /// Two services resolve to the same fragment
    #[error("Subdomain '{fragment}' is assigned to more than one service")]
    SubdomainCollision { fragment: String },

    /// Required template variable without value or default
    #[error("Missing required variable '{name}'")]
    MissingVariable { name: String },

    /// Template variable value does not match its declared type
    #[error("Variable '{name}' must be a {expected}")]
    InvalidType { name: String, expected: String },

    /// Two keys of one template mapping render to the same text
    #[error("Template key '{key}' renders to a key that already exists")]
    DuplicateKey { key: String },

    /// Placeholder with no value to substitute
    #[error("Unresolved template token '{token}'")]
    UnresolvedToken { token: String },

    /// Archetype id not in the wizard catalog
    #[error("Unknown archetype '{id}'")]
    UnknownArchetype { id: String },

    /// Archetype cannot run with the requested database engine
    #[error("Archetype '{archetype}' does not support database '{engine}'")]
    UnsupportedDatabase { archetype: String, engine: String },
}

/// Validate and canonicalize the root domain
///
/// # Rules
/// - Non-empty
/// - Valid RFC 1123 host name after lowercasing
pub fn validate_domain(domain: &str) -> ValidationResult<Hostname> {
    Hostname::canonical(domain).map_err(|e| ValidationError::InvalidDomain {
        domain: domain.to_string(),
        reason: e.to_string(),
    })
}

/// Validate aliases against the root domain and each other
///
/// # Rules
/// - Each alias is a valid host name
/// - No alias equals the root domain
/// - No alias appears twice
///
/// Aliases are checked in input order; the first failing alias is reported.
pub fn validate_aliases(domain: &Hostname, aliases: &[String]) -> ValidationResult<Vec<Hostname>> {
    let mut seen = HashSet::new();
    let mut canonical = Vec::with_capacity(aliases.len());

    for alias in aliases {
        let host = Hostname::canonical(alias).map_err(|e| ValidationError::InvalidAlias {
            alias: alias.clone(),
            reason: e.to_string(),
        })?;

        if &host == domain {
            return Err(ValidationError::AliasDuplicatesDomain {
                alias: alias.clone(),
            });
        }

        if !seen.insert(host.clone()) {
            return Err(ValidationError::DuplicateAlias {
                alias: alias.clone(),
            });
        }

        canonical.push(host);
    }

    Ok(canonical)
}

/// Validate the owning customer
pub fn validate_customer_id(customer_id: &str) -> ValidationResult {
    if customer_id.trim().is_empty() {
        return Err(ValidationError::MissingCustomerId);
    }
    Ok(())
}

/// Validate a registry credential pair
///
/// # Rules
/// - `username` and `password` are both present or both absent
pub fn validate_credentials(scope: &str, credentials: &RegistryCredentials) -> ValidationResult {
    if let Some(missing) = credentials.missing_field() {
        return Err(ValidationError::IncompleteCredentials {
            scope: scope.to_string(),
            missing: missing.to_string(),
        });
    }
    Ok(())
}

/// Validate the registry credentials of every service, in document order
pub fn validate_service_credentials(document: &ComposeDocument) -> ValidationResult {
    for service in document.services.values() {
        if let Some(registry) = &service.registry {
            validate_credentials(&format!("service '{}'", service.name), registry)?;
        }
    }
    Ok(())
}

/// Validate a service has an image
///
/// The `custom-build` placeholder counts as an image; only an empty string
/// fails.
pub fn validate_image(service: &ServiceSpec) -> ValidationResult {
    if service.image.trim().is_empty() {
        return Err(ValidationError::MissingImage {
            service: service.name.clone(),
        });
    }
    Ok(())
}

/// Validate that named volume mounts are declared at the top level
///
/// Bind mounts and anonymous volumes are not checked.
pub fn validate_volume_refs(service: &ServiceSpec, document: &ComposeDocument) -> ValidationResult {
    for entry in &service.volumes {
        if let VolumeSource::Named(name) = VolumeSource::classify(entry) {
            if !document.declared_volumes.contains(name) {
                return Err(ValidationError::UndeclaredVolume {
                    service: service.name.clone(),
                    volume: name.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Composite per-service validation in document order
///
/// # Rules
/// - The document has at least one service
/// - For each service: image, then named volumes
pub fn validate_services(document: &ComposeDocument) -> ValidationResult {
    if document.is_empty() {
        return Err(ValidationError::EmptyDeployment);
    }

    for service in document.services.values() {
        validate_image(service)?;
        validate_volume_refs(service, document)?;
    }

    Ok(())
}
