// Copyright (c) 2025 - Cowboy AI, Inc.
//! Manifest Parser
//!
//! Reads the container-orchestration manifest subset (`services`, `image`,
//! `ports`, `environment`, `volumes`, top-level `volumes`) into a
//! [`ComposeDocument`].
//!
//! # Normalization
//!
//! - Missing `image` becomes [`CUSTOM_BUILD_IMAGE`]; the assembler decides
//!   whether that is acceptable
//! - Ports keep only the container side: `"8080:80"` → 80, `"80/tcp"` → 80,
//!   `3000` → 3000; unparseable entries are dropped with a warning
//! - Environment accepts a mapping or `KEY=VALUE` strings; strings without
//!   `=` are ignored
//! - Volumes pass through as opaque strings
//! - Unrecognized keys are kept on the document / service and re-emitted
//!
//! Two extension keys are understood per service: `x-subdomain` (explicit
//! fragment) and `x-registry` (`url`, `username`, `password`). Without
//! `x-subdomain`, a `spinforge.subdomain` label supplies the fragment.

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::domain::{
    ComposeDocument, Environment, ManifestWarning, RegistryCredentials, ServiceSpec,
    CUSTOM_BUILD_IMAGE, SUBDOMAIN_LABEL,
};
use crate::errors::{CompileError, CompileResult};

const SUBDOMAIN_KEY: &str = "x-subdomain";
const REGISTRY_KEY: &str = "x-registry";

/// Parse manifest text
///
/// # Errors
/// - [`CompileError::Syntax`] when the text is not YAML
/// - [`CompileError::Schema`] when the top level is not a mapping with a
///   `services` mapping, or a service field has the wrong container type
pub fn parse(text: &str) -> CompileResult<ComposeDocument> {
    let root: Value = serde_yaml::from_str(text)?;
    let document = from_value(&root)?;

    debug!(
        services = document.len(),
        warnings = document.warnings.len(),
        "Parsed manifest"
    );

    Ok(document)
}

/// Build a document from an already parsed manifest value
///
/// Shared with the template engine, whose skeletons are stored as values.
pub fn from_value(root: &Value) -> CompileResult<ComposeDocument> {
    let root = root
        .as_mapping()
        .ok_or_else(|| CompileError::Schema("manifest must be a mapping".to_string()))?;

    let services = match root.get("services") {
        Some(Value::Mapping(services)) => services,
        Some(Value::Null) => {
            return Err(CompileError::Schema("'services' must not be empty".to_string()))
        }
        Some(_) => return Err(CompileError::Schema("'services' must be a mapping".to_string())),
        None => return Err(CompileError::Schema("missing 'services' key".to_string())),
    };

    let mut document = ComposeDocument::new();

    for (key, body) in services {
        let name = service_name(key)?;
        let service = parse_service(&name, body, &mut document.warnings)?;
        document.add_service(service)?;
    }

    for (key, value) in root {
        match key.as_str() {
            Some("services") => {}
            Some("volumes") => declare_volumes(value, &mut document)?,
            _ => {
                document.extensions.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(document)
}

/// Reduce a port entry to its container port
///
/// Takes the part after the last `:`, strips a `/proto` suffix, and parses
/// the rest as a non-zero port number.
pub fn normalize_port(entry: &str) -> Option<u16> {
    let container = entry.rsplit(':').next().unwrap_or(entry);
    let container = container.split('/').next().unwrap_or(container).trim();
    container.parse::<u16>().ok().filter(|port| *port != 0)
}

fn service_name(key: &Value) -> CompileResult<String> {
    let name = match key {
        Value::String(name) => name.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            return Err(CompileError::Schema(
                "service names must be strings".to_string(),
            ))
        }
    };

    if name.trim().is_empty() {
        return Err(CompileError::Schema("service name must not be empty".to_string()));
    }

    Ok(name)
}

fn parse_service(
    name: &str,
    body: &Value,
    warnings: &mut Vec<ManifestWarning>,
) -> CompileResult<ServiceSpec> {
    let empty = Mapping::new();
    let body = match body {
        Value::Mapping(body) => body,
        Value::Null => &empty,
        _ => {
            return Err(CompileError::Schema(format!(
                "service '{}' must be a mapping",
                name
            )))
        }
    };

    let image = match body.get("image") {
        None | Some(Value::Null) => CUSTOM_BUILD_IMAGE.to_string(),
        Some(value) => scalar_to_string(value).ok_or_else(|| {
            CompileError::Schema(format!("service '{}': 'image' must be a string", name))
        })?,
    };

    let mut service = ServiceSpec::new(name, image);

    for (key, value) in body {
        match key.as_str() {
            Some("image") => {}
            Some("ports") => service.ports = parse_ports(name, value, warnings)?,
            Some("environment") => service.environment = parse_environment(name, value, warnings)?,
            Some("volumes") => service.volumes = parse_volumes(name, value, warnings)?,
            Some(SUBDOMAIN_KEY) => {
                service.subdomain = Some(scalar_to_string(value).ok_or_else(|| {
                    CompileError::Schema(format!(
                        "service '{}': '{}' must be a string",
                        name, SUBDOMAIN_KEY
                    ))
                })?);
            }
            Some(REGISTRY_KEY) => service.registry = Some(parse_registry(name, value)?),
            _ => {
                service.extra.insert(key.clone(), value.clone());
            }
        }
    }

    if service.subdomain.is_none() {
        service.subdomain = service.label(SUBDOMAIN_LABEL);
    }

    Ok(service)
}

fn parse_ports(
    service: &str,
    value: &Value,
    warnings: &mut Vec<ManifestWarning>,
) -> CompileResult<Vec<u16>> {
    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(entries) => entries,
        _ => {
            return Err(CompileError::Schema(format!(
                "service '{}': 'ports' must be a list",
                service
            )))
        }
    };

    let mut ports = Vec::with_capacity(entries.len());
    for entry in entries {
        let port = match entry {
            Value::Number(n) => n
                .as_u64()
                .and_then(|p| u16::try_from(p).ok())
                .filter(|p| *p != 0),
            Value::String(s) => normalize_port(s),
            // Long syntax: { target: 80, published: 8080 }
            Value::Mapping(long) => long.get("target").and_then(|target| match target {
                Value::Number(n) => n
                    .as_u64()
                    .and_then(|p| u16::try_from(p).ok())
                    .filter(|p| *p != 0),
                Value::String(s) => normalize_port(s),
                _ => None,
            }),
            _ => None,
        };

        match port {
            Some(port) => ports.push(port),
            None => {
                let entry = render_entry(entry);
                warn!(service, entry = %entry, "Dropping invalid container port");
                warnings.push(ManifestWarning {
                    service: service.to_string(),
                    field: "ports".to_string(),
                    entry,
                    reason: "container port is not a number in 1-65535".to_string(),
                });
            }
        }
    }

    Ok(ports)
}

fn parse_environment(
    service: &str,
    value: &Value,
    warnings: &mut Vec<ManifestWarning>,
) -> CompileResult<Environment> {
    let mut env = Environment::new();

    match value {
        Value::Null => {}
        Value::Mapping(vars) => {
            for (key, value) in vars {
                let Some(key) = scalar_to_string(key).filter(|k| !k.is_empty()) else {
                    continue;
                };
                match scalar_to_string(value) {
                    Some(value) => {
                        env.insert(key, value);
                    }
                    None => {
                        // Only the key is recorded; the value may be a credential
                        warn!(service, key = %key, "Dropping non-scalar environment value");
                        warnings.push(ManifestWarning {
                            service: service.to_string(),
                            field: "environment".to_string(),
                            entry: key,
                            reason: "value is not a scalar".to_string(),
                        });
                    }
                }
            }
        }
        Value::Sequence(entries) => {
            for entry in entries {
                let Some(entry) = entry.as_str() else {
                    continue;
                };
                if let Some((key, value)) = entry.split_once('=') {
                    if !key.is_empty() {
                        env.insert(key, value);
                    }
                }
            }
        }
        _ => {
            return Err(CompileError::Schema(format!(
                "service '{}': 'environment' must be a mapping or a list",
                service
            )))
        }
    }

    Ok(env)
}

fn parse_volumes(
    service: &str,
    value: &Value,
    warnings: &mut Vec<ManifestWarning>,
) -> CompileResult<Vec<String>> {
    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(entries) => entries,
        _ => {
            return Err(CompileError::Schema(format!(
                "service '{}': 'volumes' must be a list",
                service
            )))
        }
    };

    let mut volumes = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Value::String(volume) => volumes.push(volume.clone()),
            other => {
                let entry = render_entry(other);
                warn!(service, entry = %entry, "Dropping non-string volume entry");
                warnings.push(ManifestWarning {
                    service: service.to_string(),
                    field: "volumes".to_string(),
                    entry,
                    reason: "only short-syntax volume strings are supported".to_string(),
                });
            }
        }
    }

    Ok(volumes)
}

fn parse_registry(service: &str, value: &Value) -> CompileResult<RegistryCredentials> {
    let map = value.as_mapping().ok_or_else(|| {
        CompileError::Schema(format!(
            "service '{}': '{}' must be a mapping",
            service, REGISTRY_KEY
        ))
    })?;

    let field = |name: &str| {
        map.get(name)
            .and_then(scalar_to_string)
            .filter(|value| !value.is_empty())
    };

    Ok(RegistryCredentials {
        url: field("url"),
        username: field("username"),
        password: field("password"),
    })
}

fn declare_volumes(value: &Value, document: &mut ComposeDocument) -> CompileResult<()> {
    match value {
        Value::Null => Ok(()),
        Value::Mapping(volumes) => {
            for key in volumes.keys() {
                let name = scalar_to_string(key).ok_or_else(|| {
                    CompileError::Schema("volume names must be strings".to_string())
                })?;
                document.declare_volume(name);
            }
            Ok(())
        }
        _ => Err(CompileError::Schema(
            "top-level 'volumes' must be a mapping".to_string(),
        )),
    }
}

/// String form of a YAML scalar; `null` becomes the empty string
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

fn render_entry(value: &Value) -> String {
    scalar_to_string(value).unwrap_or_else(|| {
        serde_yaml::to_string(value)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    })
}
