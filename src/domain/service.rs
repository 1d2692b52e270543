// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service definitions
//!
//! One container service of a [`ComposeDocument`](super::ComposeDocument):
//! image, container ports, environment, volume mounts, and the routing
//! fields the subdomain resolver fills in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::fmt;

use super::{Hostname, SubdomainFragment};

/// Image placeholder for services that declare no `image` (built from source)
pub const CUSTOM_BUILD_IMAGE: &str = "custom-build";

/// Service label naming an explicit subdomain fragment
pub const SUBDOMAIN_LABEL: &str = "spinforge.subdomain";

/// Service label overriding the routed container port
pub const PORT_LABEL: &str = "spinforge.port";

/// Key fragments that mark an environment variable as credential-bearing
const CREDENTIAL_MARKERS: [&str; 4] = ["PASSWORD", "SECRET", "TOKEN", "PASSWD"];

/// Whether an environment key carries a credential
///
/// Values of such keys are never logged or rendered in `Debug` output.
pub fn is_credential_key(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    CREDENTIAL_MARKERS.iter().any(|marker| upper.contains(marker)) || upper.ends_with("_KEY")
}

/// Environment variables of a service
///
/// Keys are unique; insertion order is kept so rendered manifests are
/// reproducible.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(IndexMap<String, String>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a variable, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(key, value)| {
                let shown = if is_credential_key(key) { "***" } else { value.as_str() };
                (key, shown)
            }))
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Private registry reference used to pull an image
///
/// `username` and `password` must be supplied together; the assembler
/// rejects one without the other.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl RegistryCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: None,
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Name of the missing half of the pair, if exactly one half is present
    pub fn missing_field(&self) -> Option<&'static str> {
        let has_user = self.username.as_deref().is_some_and(|u| !u.is_empty());
        let has_pass = self.password.as_deref().is_some_and(|p| !p.is_empty());
        match (has_user, has_pass) {
            (true, false) => Some("password"),
            (false, true) => Some("username"),
            _ => None,
        }
    }
}

impl fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// One container service
///
/// # Invariants
/// - `name` is non-empty and unique within its document
/// - `ports` holds container-side ports only
/// - `subdomain` / `hostname` are set once the resolver has run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    pub name: String,

    pub image: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<u16>,

    #[serde(default, skip_serializing_if = "Environment::is_empty")]
    pub environment: Environment,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,

    /// Explicit fragment before resolution, normalized fragment after
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,

    /// Fully resolved host name (set by the subdomain resolver)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<Hostname>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryCredentials>,

    /// Unrecognized manifest keys, passed through untouched
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub extra: Mapping,
}

impl ServiceSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ports: Vec::new(),
            environment: Environment::new(),
            volumes: Vec::new(),
            subdomain: None,
            hostname: None,
            registry: None,
            extra: Mapping::new(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.ports.push(port);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key, value);
        self
    }

    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.volumes.push(volume.into());
        self
    }

    pub fn with_subdomain(mut self, fragment: impl Into<String>) -> Self {
        self.subdomain = Some(fragment.into());
        self
    }

    pub fn with_registry(mut self, registry: RegistryCredentials) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Attach an opaque manifest key (e.g. `command`, `working_dir`)
    pub fn with_extra(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.extra
            .insert(serde_yaml::Value::String(key.to_string()), value.into());
        self
    }

    /// Value of a `labels` entry, in either mapping or `KEY=VALUE` list form
    pub fn label(&self, key: &str) -> Option<String> {
        use serde_yaml::Value;

        match self.extra.get("labels")? {
            Value::Mapping(labels) => match labels.get(key)? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            },
            Value::Sequence(entries) => entries.iter().find_map(|entry| {
                let (k, v) = entry.as_str()?.split_once('=')?;
                (k.trim() == key).then(|| v.to_string())
            }),
            _ => None,
        }
    }

    /// Container port named by the [`PORT_LABEL`] label, if valid
    pub fn port_label(&self) -> Option<u16> {
        self.label(PORT_LABEL)?
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
    }

    /// Fragment used when no explicit subdomain was given
    pub fn default_fragment(&self) -> String {
        self.name.to_lowercase()
    }

    /// Record the resolver's result
    pub(crate) fn set_route(&mut self, fragment: &SubdomainFragment, hostname: Hostname) {
        self.subdomain = Some(fragment.as_str().to_string());
        self.hostname = Some(hostname);
    }

    /// Whether the image is the placeholder for a locally built service
    pub fn is_custom_build(&self) -> bool {
        self.image == CUSTOM_BUILD_IMAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_keys() {
        assert!(is_credential_key("MYSQL_ROOT_PASSWORD"));
        assert!(is_credential_key("api_token"));
        assert!(is_credential_key("SECRET_KEY_BASE"));
        assert!(is_credential_key("STRIPE_KEY"));
        assert!(!is_credential_key("NODE_ENV"));
        assert!(!is_credential_key("KEYCLOAK_URL"));
    }

    #[test]
    fn test_environment_debug_redacts_credentials() {
        let env: Environment = [("NODE_ENV", "production"), ("DB_PASSWORD", "hunter2")]
            .into_iter()
            .collect();

        let rendered = format!("{:?}", env);
        assert!(rendered.contains("production"));
        assert!(rendered.contains("DB_PASSWORD"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_environment_keeps_insertion_order() {
        let mut env = Environment::new();
        env.insert("Z", "1");
        env.insert("A", "2");
        env.insert("Z", "3");
        assert_eq!(env.keys().collect::<Vec<_>>(), vec!["Z", "A"]);
        assert_eq!(env.get("Z"), Some("3"));
    }

    #[test]
    fn test_registry_missing_field() {
        let full = RegistryCredentials::new("deploy", "s3cret");
        assert_eq!(full.missing_field(), None);

        let user_only = RegistryCredentials {
            username: Some("deploy".into()),
            ..Default::default()
        };
        assert_eq!(user_only.missing_field(), Some("password"));

        let pass_only = RegistryCredentials {
            password: Some("s3cret".into()),
            ..Default::default()
        };
        assert_eq!(pass_only.missing_field(), Some("username"));

        assert_eq!(RegistryCredentials::default().missing_field(), None);
    }

    #[test]
    fn test_registry_debug_redacts_password() {
        let creds = RegistryCredentials::new("deploy", "s3cret").with_url("ghcr.io");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("deploy"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_labels_in_both_forms() {
        let mut labels = serde_yaml::Mapping::new();
        labels.insert(SUBDOMAIN_LABEL.into(), "api".into());
        labels.insert(PORT_LABEL.into(), 8080.into());
        let mapped = ServiceSpec::new("backend", "api:1").with_extra("labels", labels);
        assert_eq!(mapped.label(SUBDOMAIN_LABEL).as_deref(), Some("api"));
        assert_eq!(mapped.port_label(), Some(8080));

        let listed = ServiceSpec::new("backend", "api:1").with_extra(
            "labels",
            vec![
                serde_yaml::Value::from("spinforge.subdomain=api"),
                serde_yaml::Value::from("spinforge.port=0"),
            ],
        );
        assert_eq!(listed.label(SUBDOMAIN_LABEL).as_deref(), Some("api"));
        assert_eq!(listed.port_label(), None);
        assert_eq!(ServiceSpec::new("web", "nginx").label(SUBDOMAIN_LABEL), None);
    }

    #[test]
    fn test_default_fragment_is_lowercased_name() {
        let service = ServiceSpec::new("API", "nginx:latest");
        assert_eq!(service.default_fragment(), "api");
        assert!(!service.is_custom_build());
        assert!(ServiceSpec::new("worker", CUSTOM_BUILD_IMAGE).is_custom_build());
    }
}
