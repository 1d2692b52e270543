// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for Deployment Compilation
//!
//! The async boundary around the synchronous compiler. Services reach
//! collaborators (the template store) and hand plain inputs to the
//! compiler.
//!
//! # Architecture
//!
//! ```text
//! Client Request
//!     ↓
//! DeploymentService (this module)
//!     ↓                    ↘
//! DescriptorCompiler      TemplateStore (get/list)
//!     ↓
//! DeploymentDescriptor → control plane (caller)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cim_deployment_compiler::compiler::DescriptorCompiler;
//! use cim_deployment_compiler::service::*;
//!
//! let store = Arc::new(InMemoryTemplateStore::from_json(&stored_templates)?);
//! let service = CompilerDeploymentService::new(DescriptorCompiler::default(), store);
//!
//! let descriptor = service
//!     .deploy(
//!         DeploymentRequest::Manifest { text },
//!         DeploymentTarget::new("shop.example.com", "cust-42"),
//!     )
//!     .await?;
//! ```

pub mod deployment;
pub mod templates;

pub use deployment::{
    with_system_variables, CompilerDeploymentService, DeploymentRequest, DeploymentService,
    DeploymentTarget,
};
pub use templates::{InMemoryTemplateStore, TemplateStore};

use crate::errors::CompileError;

/// Service layer result type
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service layer errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The compiler rejected the request
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// No stored template with this id
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Template store failure
    #[error("Template store error: {0}")]
    Store(String),
}
