// Copyright (c) 2025 - Cowboy AI, Inc.
//! Descriptor Assembler & Validator
//!
//! Merges a compose document with caller metadata and checks every
//! deployment invariant in a fixed order, stopping at the first violation:
//!
//! 1. Root domain
//! 2. Aliases (validity, equal to domain, duplicates; input order)
//! 3. Customer id
//! 4. Registry credentials (deployment, then each service in order)
//! 5. Non-empty service list
//! 6. Per service: image, then named volumes
//! 7. Subdomain invariants

use indexmap::IndexMap;
use tracing::info;

use super::subdomain;
use crate::config::CompilerConfig;
use crate::domain::invariants::{
    validate_aliases, validate_credentials, validate_customer_id, validate_domain,
    validate_service_credentials, validate_services,
};
use crate::domain::{
    ComposeDocument, DeploymentDescriptor, DeploymentMeta, ServiceEndpoint, ServiceSpec,
    ValidationResult,
};

/// Port assumed for services that expose none and carry no port label
pub const DEFAULT_ENDPOINT_PORT: u16 = 80;

/// Build the descriptor for `document` under `meta`
pub fn assemble(
    document: ComposeDocument,
    meta: &DeploymentMeta,
    config: &CompilerConfig,
) -> ValidationResult<DeploymentDescriptor> {
    let domain = validate_domain(&meta.domain)?;
    let aliases = validate_aliases(&domain, &meta.aliases)?;
    validate_customer_id(&meta.customer_id)?;

    if let Some(registry) = &meta.registry {
        validate_credentials("deployment", registry)?;
    }
    validate_service_credentials(&document)?;

    validate_services(&document)?;

    let document = subdomain::resolve(document, &domain)?;

    let project_name = config.project_name(domain.as_str());
    let services: Vec<ServiceSpec> = document.services.into_values().collect();
    let endpoints = services
        .iter()
        .filter_map(|service| endpoint(service, &project_name, domain.as_str(), config))
        .collect();

    let mut ssl = meta.ssl.clone();
    if ssl.enabled && ssl.provider.is_none() {
        ssl.provider = Some(config.default_ssl_provider.clone());
    }

    let descriptor = DeploymentDescriptor {
        domain,
        aliases,
        customer_id: meta.customer_id.trim().to_string(),
        ssl,
        project_name,
        services,
        endpoints,
        volumes: document.declared_volumes,
        registry: meta.registry.clone(),
        context: meta.context.clone(),
    };

    info!(
        domain = %descriptor.domain,
        project = %descriptor.project_name,
        services = descriptor.services.len(),
        request_id = %descriptor.context.request_id,
        "Assembled deployment descriptor"
    );

    Ok(descriptor)
}

fn endpoint(
    service: &ServiceSpec,
    project_name: &str,
    domain: &str,
    config: &CompilerConfig,
) -> Option<ServiceEndpoint> {
    let hostname = service.hostname.clone()?;
    let port = service
        .port_label()
        .or_else(|| service.ports.first().copied())
        .unwrap_or(DEFAULT_ENDPOINT_PORT);
    let prefix = &config.project_prefix;

    let mut labels = IndexMap::new();
    labels.insert(format!("{}.project", prefix), project_name.to_string());
    labels.insert(format!("{}.domain", prefix), domain.to_string());
    labels.insert(
        format!("{}.subdomain", prefix),
        service.subdomain.clone().unwrap_or_default(),
    );
    labels.insert(format!("{}.port", prefix), port.to_string());

    Some(ServiceEndpoint {
        service: service.name.clone(),
        hostname,
        container_name: format!("{}-{}", project_name, service.name),
        port,
        labels,
    })
}
