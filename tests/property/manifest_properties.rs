// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Manifest Parser

use cim_deployment_compiler::compiler::manifest::{normalize_port, parse};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Distinct service names in generation order
fn service_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9_-]{0,12}", 1..20)
        .prop_map(|names: BTreeSet<String>| names.into_iter().collect())
        .prop_shuffle()
}

fn manifest_for(names: &[String]) -> String {
    let mut text = String::from("services:\n");
    for name in names {
        text.push_str(&format!("  \"{}\":\n    image: nginx:alpine\n", name));
    }
    text
}

fn protocol() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just("/tcp"), Just("/udp")]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: N distinct service names yield exactly N entries with the
    /// same keys in the same order
    #[test]
    fn prop_service_names_preserved(names in service_names()) {
        let doc = parse(&manifest_for(&names)).unwrap();

        prop_assert_eq!(doc.len(), names.len());
        let parsed: Vec<&str> = doc.service_names().collect();
        let expected: Vec<&str> = names.iter().map(String::as_str).collect();
        prop_assert_eq!(parsed, expected);
    }

    /// Property: only the container side of a mapping survives
    #[test]
    fn prop_container_port_extracted(host in 1u16.., container in 1u16.., proto in protocol()) {
        let entry = format!("{}:{}{}", host, container, proto);
        prop_assert_eq!(normalize_port(&entry), Some(container));
    }

    /// Property: a bare port normalizes to itself
    #[test]
    fn prop_bare_port_identity(port in 1u16..) {
        prop_assert_eq!(normalize_port(&port.to_string()), Some(port));
    }

    /// Property: rendering and re-parsing keeps every service
    #[test]
    fn prop_render_reparse_keeps_services(names in service_names()) {
        let doc = parse(&manifest_for(&names)).unwrap();
        let reparsed = parse(&doc.to_yaml().unwrap()).unwrap();

        prop_assert_eq!(doc.services, reparsed.services);
    }
}
