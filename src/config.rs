// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compiler configuration

use crate::errors::{CompileError, CompileResult};

/// Upload ceiling applied by callers before text reaches the parser
pub const DEFAULT_MAX_MANIFEST_BYTES: usize = 100 * 1024 * 1024;

/// Settings shared by every compile call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Prefix for project names and endpoint labels
    pub project_prefix: String,
    /// SSL provider used when the request enables SSL without naming one
    pub default_ssl_provider: String,
    /// Maximum manifest size accepted by callers
    pub max_manifest_bytes: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            project_prefix: "spinforge".to_string(),
            default_ssl_provider: "letsencrypt".to_string(),
            max_manifest_bytes: DEFAULT_MAX_MANIFEST_BYTES,
        }
    }
}

impl CompilerConfig {
    /// Defaults overridden by `DEPLOY_*` environment variables
    pub fn from_env() -> CompileResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CompilerConfig::from_env`] with an explicit variable source
    pub fn from_lookup<F>(lookup: F) -> CompileResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let project_prefix = lookup("DEPLOY_PROJECT_PREFIX")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.project_prefix);

        let default_ssl_provider = lookup("DEPLOY_SSL_PROVIDER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.default_ssl_provider);

        let max_manifest_bytes = match lookup("DEPLOY_MAX_MANIFEST_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                CompileError::Configuration(format!(
                    "DEPLOY_MAX_MANIFEST_BYTES must be a byte count, got '{}'",
                    raw
                ))
            })?,
            None => defaults.max_manifest_bytes,
        };

        Ok(Self {
            project_prefix,
            default_ssl_provider,
            max_manifest_bytes,
        })
    }

    pub fn with_project_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.project_prefix = prefix.into();
        self
    }

    /// Project name for a root domain: `{prefix}-{domain with '.' as '-'}`
    pub fn project_name(&self, domain: &str) -> String {
        format!("{}-{}", self.project_prefix, domain.replace('.', "-"))
    }
}
