// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Subdomain Resolver

use cim_deployment_compiler::compiler::subdomain::resolve;
use cim_deployment_compiler::domain::{
    ComposeDocument, Hostname, ServiceSpec, SubdomainFragment, ValidationError,
};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

fn root() -> Hostname {
    Hostname::new("example.com").unwrap()
}

fn document(names: &[String]) -> ComposeDocument {
    let mut doc = ComposeDocument::new();
    for name in names {
        doc.add_service(ServiceSpec::new(name.as_str(), "nginx")).unwrap();
    }
    doc
}

/// Distinct, non-reserved fragment-safe names
fn plain_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9]{0,10}", 1..15).prop_map(|names: BTreeSet<String>| {
        names
            .into_iter()
            .filter(|n| !SubdomainFragment::RESERVED.contains(&n.as_str()))
            .collect()
    })
}

proptest! {
    /// Property: distinct fragments give distinct host names under the root
    #[test]
    fn prop_distinct_fragments_resolve(names in plain_names()) {
        let doc = resolve(document(&names), &root()).unwrap();

        let mut seen = HashSet::new();
        for (name, service) in &doc.services {
            let host = service.hostname.clone().unwrap();
            prop_assert_eq!(host.as_str(), format!("{}.example.com", name));
            prop_assert!(seen.insert(host));
        }
    }

    /// Property: a reserved fragment added to any document takes the root
    #[test]
    fn prop_single_reserved_takes_root(names in plain_names(), reserved in prop_oneof![Just("main"), Just("app")]) {
        let mut names = names;
        names.push(reserved.to_string());
        let doc = resolve(document(&names), &root()).unwrap();

        prop_assert_eq!(doc.service(reserved).unwrap().hostname.clone(), Some(root()));
    }

    /// Property: two services claiming the root always conflict
    #[test]
    fn prop_two_reserved_conflict(names in plain_names()) {
        let mut names = names;
        names.push("main".to_string());
        names.push("app".to_string());

        let err = resolve(document(&names), &root()).unwrap_err();
        prop_assert_eq!(
            err,
            ValidationError::RootDomainConflict { services: vec!["main".into(), "app".into()] }
        );
    }
}
