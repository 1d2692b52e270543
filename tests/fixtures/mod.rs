// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-deployment-compiler
//!
//! Deterministic inputs for the integration suites. Request ids and
//! timestamps are fixed constants and secrets come from a counter, so
//! descriptors compare equal across runs.
//!
//! # Design Principles
//! - No `Uuid::now_v7()`, `Utc::now()` or random secrets in expectations
//! - Manifests and templates used by more than one suite live here

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use cim_deployment_compiler::compiler::{DescriptorCompiler, Secret, SecretGenerator};
use cim_deployment_compiler::config::CompilerConfig;
use cim_deployment_compiler::domain::{
    DeploymentMeta, DeploymentSource, RequestContext, Template, TemplateCategory, TemplateVariable,
    VariableType,
};

// Fixed request id (UUID v7 format, but deterministic for testing)
pub const REQUEST_ID: &str = "01934f4a-0001-7000-8000-000000000001";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

pub const CUSTOMER_ID: &str = "cust-42";

/// Two public services, one private image, one named volume
pub const SHOP_MANIFEST: &str = r#"
version: "3.8"
services:
  app:
    image: node:18-alpine
    ports:
      - "8080:3000"
    environment:
      NODE_ENV: production
      API_TOKEN: not-for-logs
  api:
    image: registry.example.com/shop/api:2.1
    ports: [4000]
    x-registry:
      username: deploy
      password: hunter2
    depends_on: [db]
  db:
    image: postgres:15
    volumes:
      - db_data:/var/lib/postgresql/data
networks:
  default: {}
volumes:
  db_data: {}
"#;

pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

pub fn context(source: DeploymentSource) -> RequestContext {
    RequestContext::with_identity(source, parse_uuid(REQUEST_ID), fixed_timestamp())
}

/// Metadata for `domain` owned by [`CUSTOMER_ID`]
pub fn meta(domain: &str) -> DeploymentMeta {
    DeploymentMeta::new(domain, CUSTOMER_ID, context(DeploymentSource::Manifest))
}

/// Secret generator producing `secret-000001`, `secret-000002`, ...
#[derive(Debug, Default)]
pub struct CountingSecrets(AtomicUsize);

impl CountingSecrets {
    pub fn issued(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl SecretGenerator for CountingSecrets {
    fn generate(&self) -> Secret {
        let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        Secret::from(format!("secret-{:06}", n))
    }
}

/// Compiler with default config and counting secrets
pub fn compiler() -> DescriptorCompiler {
    DescriptorCompiler::with_secrets(CompilerConfig::default(), Arc::new(CountingSecrets::default()))
}

/// Ghost blog template as stored by the template service
pub fn ghost_template() -> Template {
    let skeleton = serde_yaml::from_str(
        r#"
services:
  ghost:
    image: "ghost:{{version}}"
    ports: ["{{port}}"]
    environment:
      url: "https://{{domain}}"
      database__client: sqlite3
    volumes:
      - ghost_content:/var/lib/ghost/content
volumes:
  ghost_content: {}
"#,
    )
    .expect("Invalid template skeleton in test fixture");

    Template::new("ghost-blog", "Ghost Blog", TemplateCategory::Container, skeleton)
        .with_variable(TemplateVariable::new("version", VariableType::String).required())
        .with_variable(TemplateVariable::new("port", VariableType::Number).with_default("2368"))
}
