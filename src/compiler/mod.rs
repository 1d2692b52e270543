// Copyright (c) 2025 - Cowboy AI, Inc.
//! Descriptor Compiler
//!
//! Three front ends produce the same intermediate [`ComposeDocument`]; one
//! back end turns it into a [`DeploymentDescriptor`]:
//!
//! ```text
//! manifest text ──▶ manifest::parse ─┐
//! archetype     ──▶ wizard::compile ─┼─▶ ComposeDocument ──▶ assembler::assemble ──▶ DeploymentDescriptor
//! template      ──▶ template::render ┘                           └─ subdomain::resolve
//! ```
//!
//! Every call is independent: no state is shared between invocations other
//! than the read-only configuration and the secret generator.

pub mod assembler;
pub mod manifest;
pub mod secrets;
pub mod subdomain;
pub mod template;
pub mod wizard;

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub use secrets::{RandomSecretGenerator, Secret, SecretGenerator, SECRET_LENGTH};
pub use wizard::{Archetype, DatabaseEngine, DatabasePolicy, WizardOptions, CATALOG};

use crate::config::CompilerConfig;
use crate::domain::{ComposeDocument, DeploymentDescriptor, DeploymentMeta, Template};
use crate::errors::CompileResult;

/// Entry point tying the front ends to the assembler
#[derive(Clone)]
pub struct DescriptorCompiler {
    config: CompilerConfig,
    secrets: Arc<dyn SecretGenerator>,
}

impl DescriptorCompiler {
    /// Compiler with the given configuration and a CSPRNG-backed secret
    /// generator
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_secrets(config, Arc::new(RandomSecretGenerator::new()))
    }

    pub fn with_secrets(config: CompilerConfig, secrets: Arc<dyn SecretGenerator>) -> Self {
        Self { config, secrets }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Parse manifest text and assemble it
    pub fn compile_manifest(&self, text: &str, meta: &DeploymentMeta) -> CompileResult<DeploymentDescriptor> {
        let document = manifest::parse(text)?;
        self.assemble(document, meta)
    }

    /// Expand a wizard archetype and assemble it
    ///
    /// The chosen resource tier is recorded on the request context.
    pub fn compile_wizard(
        &self,
        archetype: &str,
        options: &WizardOptions,
        meta: &DeploymentMeta,
    ) -> CompileResult<DeploymentDescriptor> {
        let document = wizard::compile(archetype, options, self.secrets.as_ref())?;

        let mut meta = meta.clone();
        meta.context.resource_tier = Some(options.resource_tier);
        self.assemble(document, &meta)
    }

    /// Render a template and assemble it
    pub fn compile_template(
        &self,
        template: &Template,
        values: &HashMap<String, String>,
        meta: &DeploymentMeta,
    ) -> CompileResult<DeploymentDescriptor> {
        let document = template::render(template, values)?;
        self.assemble(document, meta)
    }

    fn assemble(&self, document: ComposeDocument, meta: &DeploymentMeta) -> CompileResult<DeploymentDescriptor> {
        for warning in &document.warnings {
            debug!(%warning, "Manifest entry dropped");
        }
        Ok(assembler::assemble(document, meta, &self.config)?)
    }
}

impl Default for DescriptorCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl std::fmt::Debug for DescriptorCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorCompiler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
