// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment descriptor compiler for the Composable Information Machine
//!
//! Turns one of three inputs into a validated [`DeploymentDescriptor`]:
//! a compose-style manifest, a wizard archetype with toggles, or a stored
//! template with variable values.
//!
//! - [`domain`] - value objects and validation invariants
//! - [`compiler`] - parser, wizard, template engine, resolver, assembler
//! - [`service`] - async service layer and template store collaborator
//! - [`config`] - compiler settings with environment overrides

pub mod compiler;
pub mod config;
pub mod domain;
pub mod errors;
pub mod service;

// Re-export commonly used types
pub use compiler::DescriptorCompiler;
pub use config::CompilerConfig;
pub use domain::{ComposeDocument, DeploymentDescriptor, DeploymentMeta, ServiceSpec, ValidationError};
pub use errors::{CompileError, CompileResult};
