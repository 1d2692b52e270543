// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compose Document - the normalized multi-service unit
//!
//! Every input path (hand-written manifest, wizard, template) ends in a
//! [`ComposeDocument`]; the subdomain resolver and the descriptor assembler
//! only ever see this shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;
use std::fmt;

use super::invariants::ValidationError;
use super::service::ServiceSpec;

/// Non-fatal problem recorded while reading a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestWarning {
    pub service: String,
    pub field: String,
    pub entry: String,
    pub reason: String,
}

impl fmt::Display for ManifestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "service '{}': dropped {} entry '{}' ({})",
            self.service, self.field, self.entry, self.reason
        )
    }
}

/// How a service volume entry refers to its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSource<'a> {
    /// `name:/path` - must be declared at the top level
    Named(&'a str),
    /// `./dir:/path`, `/abs:/path`, `~/dir:/path`
    Bind(&'a str),
    /// `/path` - container-only volume
    Anonymous,
}

impl<'a> VolumeSource<'a> {
    /// Classify a short-syntax volume entry
    pub fn classify(entry: &'a str) -> Self {
        match entry.split_once(':') {
            None => Self::Anonymous,
            Some((source, _)) => {
                let is_path = source.starts_with('/')
                    || source.starts_with('.')
                    || source.starts_with('~')
                    || source.contains('/');
                if is_path {
                    Self::Bind(source)
                } else {
                    Self::Named(source)
                }
            }
        }
    }
}

/// In-memory multi-service unit
///
/// # Invariants
/// - `services` keys are unique and equal each service's `name`
/// - Named volume references resolve against `declared_volumes`
///   (checked by the assembler)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeDocument {
    pub services: IndexMap<String, ServiceSpec>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub declared_volumes: BTreeSet<String>,

    /// Unrecognized top-level keys (`version`, `networks`, `x-*`, ...)
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub extensions: Mapping,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ManifestWarning>,
}

impl ComposeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service, rejecting a second service with the same name
    pub fn add_service(&mut self, service: ServiceSpec) -> Result<(), ValidationError> {
        if self.services.contains_key(&service.name) {
            return Err(ValidationError::DuplicateService {
                name: service.name.clone(),
            });
        }
        self.services.insert(service.name.clone(), service);
        Ok(())
    }

    pub fn declare_volume(&mut self, name: impl Into<String>) {
        self.declared_volumes.insert(name.into());
    }

    pub fn service(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.get(name)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Render back into manifest notation
    ///
    /// Fields the compiler understands are written in normalized form
    /// (container ports only); unrecognized keys are re-emitted as read.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&Value::Mapping(self.to_mapping()))
    }

    fn to_mapping(&self) -> Mapping {
        let mut root = Mapping::new();

        for (key, value) in &self.extensions {
            root.insert(key.clone(), value.clone());
        }

        let services: Mapping = self
            .services
            .iter()
            .map(|(name, service)| (Value::from(name.as_str()), Value::Mapping(service_mapping(service))))
            .collect();
        root.insert(Value::from("services"), Value::Mapping(services));

        if !self.declared_volumes.is_empty() {
            let volumes: Mapping = self
                .declared_volumes
                .iter()
                .map(|name| (Value::from(name.as_str()), Value::Mapping(Mapping::new())))
                .collect();
            root.insert(Value::from("volumes"), Value::Mapping(volumes));
        }

        root
    }
}

fn service_mapping(service: &ServiceSpec) -> Mapping {
    let mut map = Mapping::new();

    if !service.is_custom_build() {
        map.insert(Value::from("image"), Value::from(service.image.as_str()));
    }

    if !service.ports.is_empty() {
        let ports = service.ports.iter().map(|p| Value::from(u64::from(*p))).collect();
        map.insert(Value::from("ports"), Value::Sequence(ports));
    }

    if !service.environment.is_empty() {
        let env: Mapping = service
            .environment
            .iter()
            .map(|(k, v)| (Value::from(k), Value::from(v)))
            .collect();
        map.insert(Value::from("environment"), Value::Mapping(env));
    }

    if !service.volumes.is_empty() {
        let volumes = service.volumes.iter().map(|v| Value::from(v.as_str())).collect();
        map.insert(Value::from("volumes"), Value::Sequence(volumes));
    }

    if let Some(fragment) = &service.subdomain {
        map.insert(Value::from("x-subdomain"), Value::from(fragment.as_str()));
    }

    if let Some(registry) = &service.registry {
        let mut reg = Mapping::new();
        for (key, value) in [
            ("url", &registry.url),
            ("username", &registry.username),
            ("password", &registry.password),
        ] {
            if let Some(value) = value {
                reg.insert(Value::from(key), Value::from(value.as_str()));
            }
        }
        map.insert(Value::from("x-registry"), Value::Mapping(reg));
    }

    for (key, value) in &service.extra {
        map.insert(key.clone(), value.clone());
    }

    map
}
