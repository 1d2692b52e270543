// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subdomain Resolver
//!
//! Assigns every service a host name under the root domain. Services using a
//! reserved fragment (`main`, `app`) are served on the root domain itself.

use std::collections::HashSet;
use tracing::debug;

use crate::domain::{ComposeDocument, Hostname, SubdomainFragment, ValidationError, ValidationResult};

/// Resolve host names for every service in document order
///
/// # Errors
/// - `InvalidSubdomain` - fragment has characters outside `[a-z0-9-]` or
///   yields an invalid host name
/// - `RootDomainConflict` - a second service claims the root domain
/// - `SubdomainCollision` - two services share a non-reserved fragment
pub fn resolve(mut document: ComposeDocument, root: &Hostname) -> ValidationResult<ComposeDocument> {
    let mut root_owner: Option<String> = None;
    let mut taken: HashSet<String> = HashSet::new();

    for service in document.services.values_mut() {
        let raw = service
            .subdomain
            .clone()
            .unwrap_or_else(|| service.default_fragment());

        let invalid = || ValidationError::InvalidSubdomain {
            service: service.name.clone(),
            fragment: raw.clone(),
        };

        let fragment = SubdomainFragment::new(&raw).map_err(|_| invalid())?;

        let hostname = if fragment.is_root() {
            if let Some(owner) = &root_owner {
                return Err(ValidationError::RootDomainConflict {
                    services: vec![owner.clone(), service.name.clone()],
                });
            }
            root_owner = Some(service.name.clone());
            root.clone()
        } else {
            if !taken.insert(fragment.as_str().to_string()) {
                return Err(ValidationError::SubdomainCollision {
                    fragment: fragment.as_str().to_string(),
                });
            }
            root.with_fragment(&fragment).map_err(|_| invalid())?
        };

        debug!(service = %service.name, hostname = %hostname, "Resolved service host name");
        service.set_route(&fragment, hostname);
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServiceSpec;

    fn root() -> Hostname {
        Hostname::new("example.com").unwrap()
    }

    fn document(services: Vec<ServiceSpec>) -> ComposeDocument {
        let mut doc = ComposeDocument::new();
        for service in services {
            doc.add_service(service).unwrap();
        }
        doc
    }

    #[test]
    fn test_default_fragment_is_lowercased_name() {
        let doc = resolve(document(vec![ServiceSpec::new("API", "api:1")]), &root()).unwrap();
        let api = doc.service("API").unwrap();
        assert_eq!(api.subdomain.as_deref(), Some("api"));
        assert_eq!(api.hostname.as_ref().map(|h| h.as_str()), Some("api.example.com"));
    }

    #[test]
    fn test_single_app_gets_bare_domain() {
        let doc = resolve(document(vec![ServiceSpec::new("app", "node:18")]), &root()).unwrap();
        assert_eq!(doc.service("app").unwrap().hostname, Some(root()));
    }

    #[test]
    fn test_subdomain_collision() {
        let doc = document(vec![
            ServiceSpec::new("api", "a:1"),
            ServiceSpec::new("backend", "b:1").with_subdomain("API"),
        ]);
        assert_eq!(
            resolve(doc, &root()).unwrap_err(),
            ValidationError::SubdomainCollision {
                fragment: "api".into()
            }
        );
    }

    #[test]
    fn test_root_domain_conflict() {
        let doc = document(vec![
            ServiceSpec::new("main", "a:1"),
            ServiceSpec::new("app", "b:1"),
        ]);
        assert_eq!(
            resolve(doc, &root()).unwrap_err(),
            ValidationError::RootDomainConflict {
                services: vec!["main".into(), "app".into()]
            }
        );
    }

    #[test]
    fn test_invalid_characters_rejected() {
        let doc = document(vec![ServiceSpec::new("web", "nginx").with_subdomain("my_site")]);
        assert_eq!(
            resolve(doc, &root()).unwrap_err(),
            ValidationError::InvalidSubdomain {
                service: "web".into(),
                fragment: "my_site".into()
            }
        );
    }

    #[test]
    fn test_explicit_fragment_overrides_name() {
        let doc = document(vec![
            ServiceSpec::new("frontend", "nginx").with_subdomain("main"),
            ServiceSpec::new("backend", "api:1").with_subdomain("api"),
        ]);
        let doc = resolve(doc, &root()).unwrap();
        assert_eq!(doc.service("frontend").unwrap().hostname, Some(root()));
        assert_eq!(
            doc.service("backend").unwrap().hostname.as_ref().map(|h| h.as_str()),
            Some("api.example.com")
        );
    }
}
