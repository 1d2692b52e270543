// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Service
//!
//! Accepts a deployment request from any of the three input paths, fetches
//! what the compiler needs from collaborators, and returns the descriptor.
//!
//! # Request Flow
//!
//! ```text
//! DeploymentRequest + DeploymentTarget
//!     ↓
//! RequestContext (v7 id, timestamp, source)
//!     ↓
//! TemplateStore::get (template path only)
//!     ↓
//! DescriptorCompiler
//!     ↓
//! DeploymentDescriptor
//! ```
//!
//! The service never submits the descriptor anywhere; that is the caller's
//! decision.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::templates::TemplateStore;
use super::{ServiceError, ServiceResult};
use crate::compiler::{DescriptorCompiler, WizardOptions};
use crate::domain::{
    DeploymentDescriptor, DeploymentMeta, DeploymentSource, RegistryCredentials, RequestContext,
    SslConfig, Template,
};

/// What to deploy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum DeploymentRequest {
    /// Hand-written manifest text
    Manifest { text: String },

    /// Wizard archetype plus toggles
    Wizard {
        archetype: String,
        #[serde(default)]
        options: WizardOptions,
    },

    /// Stored template plus user values
    Template {
        #[serde(rename = "templateId")]
        template_id: String,
        #[serde(rename = "customerName")]
        customer_name: String,
        #[serde(rename = "deployName")]
        deploy_name: String,
        #[serde(default)]
        variables: HashMap<String, String>,
    },
}

impl DeploymentRequest {
    pub fn source(&self) -> DeploymentSource {
        match self {
            Self::Manifest { .. } => DeploymentSource::Manifest,
            Self::Wizard { archetype, .. } => DeploymentSource::Wizard {
                archetype: archetype.clone(),
            },
            Self::Template { template_id, .. } => DeploymentSource::Template {
                template_id: template_id.clone(),
            },
        }
    }
}

/// Where and for whom to deploy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTarget {
    pub domain: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    pub customer_id: String,

    #[serde(default)]
    pub ssl: SslConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryCredentials>,
}

impl DeploymentTarget {
    pub fn new(domain: impl Into<String>, customer_id: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            aliases: Vec::new(),
            customer_id: customer_id.into(),
            ssl: SslConfig::default(),
            registry: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    fn into_meta(self, context: RequestContext) -> DeploymentMeta {
        DeploymentMeta {
            domain: self.domain,
            aliases: self.aliases,
            customer_id: self.customer_id,
            ssl: self.ssl,
            registry: self.registry,
            context,
        }
    }
}

/// Application service for compiling deployments
#[async_trait]
pub trait DeploymentService: Send + Sync {
    /// Compile a request into a descriptor
    async fn deploy(
        &self,
        request: DeploymentRequest,
        target: DeploymentTarget,
    ) -> ServiceResult<DeploymentDescriptor>;

    /// Templates available for the template path
    async fn templates(&self) -> ServiceResult<Vec<Template>>;
}

/// [`DeploymentService`] backed by a [`DescriptorCompiler`] and a template
/// store
pub struct CompilerDeploymentService<S: TemplateStore> {
    compiler: DescriptorCompiler,
    store: Arc<S>,
}

impl<S: TemplateStore> CompilerDeploymentService<S> {
    pub fn new(compiler: DescriptorCompiler, store: Arc<S>) -> Self {
        Self { compiler, store }
    }
}

#[async_trait]
impl<S: TemplateStore + 'static> DeploymentService for CompilerDeploymentService<S> {
    async fn deploy(
        &self,
        request: DeploymentRequest,
        target: DeploymentTarget,
    ) -> ServiceResult<DeploymentDescriptor> {
        let context = RequestContext::new(request.source());
        let request_id = context.request_id;
        let meta = target.into_meta(context);

        let result = match request {
            DeploymentRequest::Manifest { text } => self.compiler.compile_manifest(&text, &meta),
            DeploymentRequest::Wizard { archetype, options } => {
                self.compiler.compile_wizard(&archetype, &options, &meta)
            }
            DeploymentRequest::Template {
                template_id,
                customer_name,
                deploy_name,
                variables,
            } => {
                let template = self
                    .store
                    .get(&template_id)
                    .await?
                    .ok_or(ServiceError::TemplateNotFound(template_id))?;

                let values = with_system_variables(variables, &meta.domain, &customer_name, &deploy_name);
                self.compiler.compile_template(&template, &values, &meta)
            }
        };

        match result {
            Ok(descriptor) => {
                info!(%request_id, project = %descriptor.project_name, "Deployment compiled");
                Ok(descriptor)
            }
            Err(e) => {
                warn!(%request_id, error = %e, "Deployment rejected");
                Err(e.into())
            }
        }
    }

    async fn templates(&self) -> ServiceResult<Vec<Template>> {
        self.store.list().await
    }
}

/// Merge the system variables into user values; system values win
pub fn with_system_variables(
    mut values: HashMap<String, String>,
    domain: &str,
    customer_name: &str,
    deploy_name: &str,
) -> HashMap<String, String> {
    values.insert("domain".to_string(), domain.trim().to_lowercase());
    values.insert("customerName".to_string(), customer_name.to_string());
    values.insert("deployName".to_string(), deploy_name.to_string());
    values.insert(
        "namespace".to_string(),
        format!("{}-{}", customer_name, deploy_name),
    );
    values
}
