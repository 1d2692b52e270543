// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Descriptor Compiler CLI
//!
//! Compiles a manifest file, a wizard archetype, or a stored template into
//! a deployment descriptor and prints it as JSON on stdout.
//!
//! Run with:
//!
//! ```bash
//! descriptor-compiler --domain shop.example.com --customer cust-42 manifest docker-compose.yml
//! descriptor-compiler --domain shop.example.com --customer cust-42 wizard blog+database
//! descriptor-compiler --domain blog.acme.io --customer cust-7 \
//!     template templates.json ghost --customer-name acme --deploy-name blog --var version=5
//! descriptor-compiler archetypes
//! ```
//!
//! Environment:
//! - `DEPLOY_PROJECT_PREFIX`, `DEPLOY_SSL_PROVIDER`, `DEPLOY_MAX_MANIFEST_BYTES`
//! - `RUST_LOG` for log filtering (logs go to stderr)

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use cim_deployment_compiler::compiler::{DatabaseEngine, DescriptorCompiler, WizardOptions, CATALOG};
use cim_deployment_compiler::config::CompilerConfig;
use cim_deployment_compiler::domain::{ResourceTier, SslConfig};
use cim_deployment_compiler::service::{
    CompilerDeploymentService, DeploymentRequest, DeploymentService, DeploymentTarget,
    InMemoryTemplateStore,
};

#[derive(Parser)]
#[command(name = "descriptor-compiler")]
#[command(about = "Compile deployments into validated descriptors", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root domain of the deployment
    #[arg(long, global = true, default_value = "")]
    domain: String,

    /// Owning customer id
    #[arg(long, global = true, default_value = "")]
    customer: String,

    /// Additional domain (repeatable)
    #[arg(long = "alias", global = true)]
    aliases: Vec<String>,

    /// Request TLS certificates
    #[arg(long, global = true)]
    ssl: bool,

    /// TLS provider (defaults to DEPLOY_SSL_PROVIDER)
    #[arg(long, global = true, value_name = "PROVIDER")]
    ssl_provider: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a compose manifest file
    Manifest {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Expand a wizard archetype
    Wizard {
        #[arg(value_name = "ARCHETYPE")]
        archetype: String,

        /// Database engine (mysql or postgres)
        #[arg(long)]
        database: Option<DatabaseEngine>,

        /// Add a redis cache
        #[arg(long)]
        cache: bool,

        /// Resource tier (small, medium, large, xlarge)
        #[arg(long, default_value = "small")]
        tier: ResourceTier,

        /// Application name, used for the database name
        #[arg(long)]
        app_name: Option<String>,
    },

    /// Render a template from a JSON template file
    Template {
        /// JSON array of stored templates
        #[arg(value_name = "STORE")]
        store: PathBuf,

        #[arg(value_name = "TEMPLATE_ID")]
        template_id: String,

        #[arg(long)]
        customer_name: String,

        #[arg(long)]
        deploy_name: String,

        /// Variable value as NAME=VALUE (repeatable)
        #[arg(long = "var", value_parser = parse_variable)]
        variables: Vec<(String, String)>,
    },

    /// List wizard archetypes
    Archetypes,
}

fn parse_variable(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = CompilerConfig::from_env().context("Invalid compiler configuration")?;
    info!(prefix = %config.project_prefix, "Configuration loaded");

    let mut target = DeploymentTarget::new(cli.domain, cli.customer);
    target.aliases = cli.aliases;
    if cli.ssl {
        target.ssl = match cli.ssl_provider {
            Some(provider) => SslConfig::enabled().with_provider(provider),
            None => SslConfig::enabled(),
        };
    }

    let (request, store) = match cli.command {
        Commands::Manifest { path } => {
            let text = read_manifest(&path, config.max_manifest_bytes).await?;
            (DeploymentRequest::Manifest { text }, InMemoryTemplateStore::new())
        }
        Commands::Wizard {
            archetype,
            database,
            cache,
            tier,
            app_name,
        } => {
            let options = WizardOptions {
                app_name,
                database,
                enable_cache: cache,
                resource_tier: tier,
            };
            (
                DeploymentRequest::Wizard { archetype, options },
                InMemoryTemplateStore::new(),
            )
        }
        Commands::Template {
            store,
            template_id,
            customer_name,
            deploy_name,
            variables,
        } => {
            let json = tokio::fs::read_to_string(&store)
                .await
                .with_context(|| format!("Failed to read template store {}", store.display()))?;
            let store = InMemoryTemplateStore::from_json(&json).context("Failed to load templates")?;
            let request = DeploymentRequest::Template {
                template_id,
                customer_name,
                deploy_name,
                variables: variables.into_iter().collect::<HashMap<_, _>>(),
            };
            (request, store)
        }
        Commands::Archetypes => {
            for archetype in CATALOG.iter() {
                println!("{:<20} {:<10} {}", archetype.id, archetype.name, archetype.description);
            }
            return Ok(());
        }
    };

    let service = CompilerDeploymentService::new(DescriptorCompiler::new(config), Arc::new(store));
    let descriptor = service
        .deploy(request, target)
        .await
        .context("Deployment rejected")?;

    println!(
        "{}",
        descriptor.to_json().context("Failed to serialize descriptor")?
    );
    Ok(())
}

/// Read a manifest, refusing files over the upload ceiling
async fn read_manifest(path: &Path, max_bytes: usize) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to stat manifest {}", path.display()))?;

    if metadata.len() > max_bytes as u64 {
        bail!(
            "Manifest {} is {} bytes, limit is {} bytes",
            path.display(),
            metadata.len(),
            max_bytes
        );
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read manifest {}", path.display()))
}
