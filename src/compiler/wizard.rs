// Copyright (c) 2025 - Cowboy AI, Inc.
//! Wizard Compiler
//!
//! Expands a catalog archetype plus the user's toggles into the same
//! [`ComposeDocument`] a hand-written manifest would produce.
//!
//! # Wiring
//!
//! ```text
//! app ──DATABASE_HOST=db──▶ db      (password generated once, shared)
//!  └───REDIS_URL=redis://redis──▶ redis
//! ```
//!
//! Host names are service names; resolving them is the control plane's job.
//! Generated passwords only ever land in service environments.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::secrets::SecretGenerator;
use crate::domain::{ComposeDocument, ResourceTier, ServiceSpec, ValidationError, VolumeSource};
use crate::errors::CompileResult;

/// Service name of a generated database
pub const DATABASE_SERVICE: &str = "db";

/// Service name of a generated cache
pub const CACHE_SERVICE: &str = "redis";

const CACHE_IMAGE: &str = "redis:alpine";
const CACHE_PORT: u16 = 6379;
const DATA_VOLUME: &str = "db_data";
const COMPOSE_VERSION: &str = "3.8";

/// Database engines the wizard can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    Mysql,
    Postgres,
}

impl DatabaseEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
        }
    }

    pub fn image(&self) -> &'static str {
        match self {
            Self::Mysql => "mysql:8.0",
            Self::Postgres => "postgres:15",
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            Self::Mysql => 3306,
            Self::Postgres => 5432,
        }
    }

    fn data_path(&self) -> &'static str {
        match self {
            Self::Mysql => "/var/lib/mysql",
            Self::Postgres => "/var/lib/postgresql/data",
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::Mysql),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(format!("unknown database engine '{}'", other)),
        }
    }
}

/// How an archetype treats the database toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabasePolicy {
    /// No database unless the user asks for one
    Optional,
    /// Always a database; the user may pick the engine
    Bundled(DatabaseEngine),
    /// Always this engine; any other choice is rejected
    Fixed(DatabaseEngine),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppKind {
    Blog,
    Node { command: &'static str },
    Django,
    Rails,
}

/// Named application pattern the wizard can expand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Archetype {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Older identifiers accepted for the same entry
    pub aliases: &'static [&'static str],
    pub database: DatabasePolicy,
    pub bundled_cache: bool,
    kind: AppKind,
}

/// Fixed archetype catalog
pub static CATALOG: [Archetype; 5] = [
    Archetype {
        id: "blog+database",
        name: "WordPress",
        description: "Blog & CMS platform with MySQL",
        aliases: &["wordpress"],
        database: DatabasePolicy::Fixed(DatabaseEngine::Mysql),
        bundled_cache: false,
        kind: AppKind::Blog,
    },
    Archetype {
        id: "node-app",
        name: "Node.js",
        description: "Express, NestJS",
        aliases: &["nodejs"],
        database: DatabasePolicy::Optional,
        bundled_cache: false,
        kind: AppKind::Node { command: "npm start" },
    },
    Archetype {
        id: "next-app",
        name: "Next.js",
        description: "React framework",
        aliases: &["nextjs"],
        database: DatabasePolicy::Optional,
        bundled_cache: false,
        kind: AppKind::Node {
            command: "npm run start",
        },
    },
    Archetype {
        id: "django-app",
        name: "Django",
        description: "Python framework with PostgreSQL",
        aliases: &["django"],
        database: DatabasePolicy::Bundled(DatabaseEngine::Postgres),
        bundled_cache: false,
        kind: AppKind::Django,
    },
    Archetype {
        id: "api+database+cache",
        name: "Rails",
        description: "Ruby API with PostgreSQL and Redis",
        aliases: &["rails"],
        database: DatabasePolicy::Bundled(DatabaseEngine::Postgres),
        bundled_cache: true,
        kind: AppKind::Rails,
    },
];

impl Archetype {
    /// Look up a catalog entry by id or alias (case-insensitive)
    pub fn find(id: &str) -> Option<&'static Archetype> {
        let id = id.trim().to_ascii_lowercase();
        CATALOG
            .iter()
            .find(|a| a.id == id || a.aliases.contains(&id.as_str()))
    }

    /// Name of the service that carries the application
    pub fn app_service(&self) -> &'static str {
        match self.kind {
            AppKind::Blog => "web",
            _ => "app",
        }
    }

    fn select_database(&self, requested: Option<DatabaseEngine>) -> CompileResult<Option<DatabaseEngine>> {
        match (self.database, requested) {
            (DatabasePolicy::Optional, requested) => Ok(requested),
            (DatabasePolicy::Bundled(default), requested) => Ok(Some(requested.unwrap_or(default))),
            (DatabasePolicy::Fixed(engine), None) => Ok(Some(engine)),
            (DatabasePolicy::Fixed(engine), Some(requested)) if requested == engine => Ok(Some(engine)),
            (DatabasePolicy::Fixed(_), Some(requested)) => Err(ValidationError::UnsupportedDatabase {
                archetype: self.id.to_string(),
                engine: requested.to_string(),
            }
            .into()),
        }
    }
}

/// User toggles collected by the wizard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardOptions {
    /// Used to name the generated database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseEngine>,

    #[serde(default)]
    pub enable_cache: bool,

    /// Recorded on the request context; does not change the document
    #[serde(default)]
    pub resource_tier: ResourceTier,
}

impl WizardOptions {
    pub fn with_database(mut self, engine: DatabaseEngine) -> Self {
        self.database = Some(engine);
        self
    }

    pub fn with_cache(mut self) -> Self {
        self.enable_cache = true;
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn with_tier(mut self, tier: ResourceTier) -> Self {
        self.resource_tier = tier;
        self
    }
}

/// Connection settings shared between the app and its database
struct DatabaseLink {
    engine: DatabaseEngine,
    name: String,
    user: String,
    password: String,
}

/// Expand an archetype into a compose document
///
/// # Errors
/// - `UnknownArchetype` - id not in [`CATALOG`]
/// - `UnsupportedDatabase` - engine not allowed for a fixed-database archetype
pub fn compile(
    archetype_id: &str,
    options: &WizardOptions,
    secrets: &dyn SecretGenerator,
) -> CompileResult<ComposeDocument> {
    let archetype = Archetype::find(archetype_id).ok_or_else(|| ValidationError::UnknownArchetype {
        id: archetype_id.to_string(),
    })?;

    let engine = archetype.select_database(options.database)?;
    let with_cache = archetype.bundled_cache || options.enable_cache;

    let mut document = ComposeDocument::new();
    document
        .extensions
        .insert(Value::from("version"), Value::from(COMPOSE_VERSION));

    let link = engine.map(|engine| {
        let (name, user) = match archetype.kind {
            AppKind::Blog => ("wordpress".to_string(), "wordpress".to_string()),
            _ => (database_name(options.app_name.as_deref()), "appuser".to_string()),
        };
        DatabaseLink {
            engine,
            name,
            user,
            password: secrets.generate().into_inner(),
        }
    });

    let mut app = app_service(archetype, secrets);
    if let Some(link) = &link {
        app = wire_database(app, archetype.kind, link);
    }
    if with_cache {
        app = app.with_env("REDIS_URL", format!("redis://{}:{}", CACHE_SERVICE, CACHE_PORT));
    }
    for volume in app.volumes.iter().filter_map(|v| named_volume(v)) {
        document.declare_volume(volume);
    }
    document.add_service(app)?;

    if let Some(link) = link {
        document.add_service(database_service(&link, secrets))?;
        document.declare_volume(DATA_VOLUME);
    }

    if with_cache {
        document.add_service(ServiceSpec::new(CACHE_SERVICE, CACHE_IMAGE).with_port(CACHE_PORT))?;
    }

    debug!(
        archetype = archetype.id,
        services = document.len(),
        database = engine.map(|e| e.as_str()).unwrap_or("none"),
        cache = with_cache,
        "Compiled wizard archetype"
    );

    Ok(document)
}

fn app_service(archetype: &Archetype, secrets: &dyn SecretGenerator) -> ServiceSpec {
    let name = archetype.app_service();
    match archetype.kind {
        AppKind::Blog => ServiceSpec::new(name, "wordpress:latest")
            .with_port(80)
            .with_volume("web_data:/var/www/html"),
        AppKind::Node { command } => ServiceSpec::new(name, "node:18-alpine")
            .with_port(3000)
            .with_env("NODE_ENV", "production")
            .with_volume("./app:/app")
            .with_extra("working_dir", "/app")
            .with_extra("command", command),
        AppKind::Django => ServiceSpec::new(name, "python:3.12-slim")
            .with_port(8000)
            .with_env("PYTHONUNBUFFERED", "1")
            .with_env("DJANGO_DEBUG", "False")
            .with_volume("./app:/app")
            .with_extra("working_dir", "/app"),
        AppKind::Rails => ServiceSpec::new(name, "ruby:3.3-slim")
            .with_port(3000)
            .with_env("RAILS_ENV", "production")
            .with_env("RAILS_LOG_TO_STDOUT", "1")
            .with_env("SECRET_KEY_BASE", secrets.generate().into_inner())
            .with_volume("./app:/app")
            .with_extra("working_dir", "/app"),
    }
}

fn wire_database(app: ServiceSpec, kind: AppKind, link: &DatabaseLink) -> ServiceSpec {
    match kind {
        AppKind::Blog => app
            .with_env("WORDPRESS_DB_HOST", DATABASE_SERVICE)
            .with_env("WORDPRESS_DB_NAME", link.name.as_str())
            .with_env("WORDPRESS_DB_USER", link.user.as_str())
            .with_env("WORDPRESS_DB_PASSWORD", link.password.as_str()),
        _ => app
            .with_env("DATABASE_HOST", DATABASE_SERVICE)
            .with_env("DATABASE_PORT", link.engine.port().to_string())
            .with_env("DATABASE_NAME", link.name.as_str())
            .with_env("DATABASE_USER", link.user.as_str())
            .with_env("DATABASE_PASSWORD", link.password.as_str()),
    }
}

fn database_service(link: &DatabaseLink, secrets: &dyn SecretGenerator) -> ServiceSpec {
    let service = ServiceSpec::new(DATABASE_SERVICE, link.engine.image())
        .with_port(link.engine.port())
        .with_volume(format!("{}:{}", DATA_VOLUME, link.engine.data_path()));

    match link.engine {
        DatabaseEngine::Mysql => service
            .with_env("MYSQL_DATABASE", link.name.as_str())
            .with_env("MYSQL_USER", link.user.as_str())
            .with_env("MYSQL_PASSWORD", link.password.as_str())
            .with_env("MYSQL_ROOT_PASSWORD", secrets.generate().into_inner()),
        DatabaseEngine::Postgres => service
            .with_env("POSTGRES_DB", link.name.as_str())
            .with_env("POSTGRES_USER", link.user.as_str())
            .with_env("POSTGRES_PASSWORD", link.password.as_str()),
    }
}

/// Database name derived from the app name: lowercase, `[a-z0-9_]`, never empty
fn database_name(app_name: Option<&str>) -> String {
    let name: String = app_name
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if name.trim_matches('_').is_empty() {
        "app".to_string()
    } else {
        name
    }
}

fn named_volume(entry: &str) -> Option<&str> {
    match VolumeSource::classify(entry) {
        VolumeSource::Named(name) => Some(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::secrets::{RandomSecretGenerator, Secret};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hands out `secret-1`, `secret-2`, ...
    #[derive(Default)]
    struct CountingSecrets(AtomicUsize);

    impl SecretGenerator for CountingSecrets {
        fn generate(&self) -> Secret {
            let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            Secret::from(format!("secret-{}", n))
        }
    }

    #[test]
    fn test_node_app_without_options() {
        let doc = compile("node-app", &WizardOptions::default(), &RandomSecretGenerator).unwrap();

        assert_eq!(doc.len(), 1);
        let app = doc.service("app").unwrap();
        assert_eq!(app.image, "node:18-alpine");
        assert_eq!(app.ports, vec![3000]);
        assert_eq!(app.environment.get("NODE_ENV"), Some("production"));
        assert!(doc.declared_volumes.is_empty());
    }

    #[test]
    fn test_blog_shares_database_password() {
        let secrets = CountingSecrets::default();
        let doc = compile("blog+database", &WizardOptions::default(), &secrets).unwrap();

        assert_eq!(doc.service_names().collect::<Vec<_>>(), vec!["web", "db"]);
        let web = doc.service("web").unwrap();
        let db = doc.service("db").unwrap();

        assert_eq!(web.environment.get("WORDPRESS_DB_HOST"), Some("db"));
        assert_eq!(
            web.environment.get("WORDPRESS_DB_PASSWORD"),
            db.environment.get("MYSQL_PASSWORD")
        );
        assert_ne!(
            db.environment.get("MYSQL_PASSWORD"),
            db.environment.get("MYSQL_ROOT_PASSWORD")
        );
        // One user password, one root password
        assert_eq!(secrets.0.load(Ordering::SeqCst), 2);
        assert!(doc.declared_volumes.contains("web_data"));
        assert!(doc.declared_volumes.contains("db_data"));
    }

    #[test]
    fn test_alias_ids_resolve() {
        assert_eq!(Archetype::find("wordpress").unwrap().id, "blog+database");
        assert_eq!(Archetype::find("Rails").unwrap().id, "api+database+cache");
        assert!(Archetype::find("cobol-mainframe").is_none());
    }

    #[test]
    fn test_unknown_archetype() {
        let err = compile("cobol-mainframe", &WizardOptions::default(), &RandomSecretGenerator).unwrap_err();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::UnknownArchetype {
                id: "cobol-mainframe".into()
            })
        );
    }

    #[test]
    fn test_blog_rejects_postgres() {
        let options = WizardOptions::default().with_database(DatabaseEngine::Postgres);
        let err = compile("blog+database", &options, &RandomSecretGenerator).unwrap_err();
        assert!(matches!(
            err.validation(),
            Some(ValidationError::UnsupportedDatabase { .. })
        ));
    }

    #[test]
    fn test_node_app_with_postgres_and_cache() {
        let options = WizardOptions::default()
            .with_database(DatabaseEngine::Postgres)
            .with_cache()
            .with_app_name("My Shop");
        let doc = compile("nodejs", &options, &CountingSecrets::default()).unwrap();

        assert_eq!(doc.service_names().collect::<Vec<_>>(), vec!["app", "db", "redis"]);
        let app = doc.service("app").unwrap();
        let db = doc.service("db").unwrap();
        assert_eq!(app.environment.get("DATABASE_HOST"), Some("db"));
        assert_eq!(app.environment.get("DATABASE_PORT"), Some("5432"));
        assert_eq!(app.environment.get("DATABASE_NAME"), Some("my_shop"));
        assert_eq!(db.environment.get("POSTGRES_DB"), Some("my_shop"));
        assert_eq!(
            app.environment.get("DATABASE_PASSWORD"),
            db.environment.get("POSTGRES_PASSWORD")
        );
        assert_eq!(app.environment.get("REDIS_URL"), Some("redis://redis:6379"));
        assert_eq!(doc.service("redis").unwrap().image, "redis:alpine");
    }

    #[test]
    fn test_api_stack_bundles_database_and_cache() {
        let doc = compile("api+database+cache", &WizardOptions::default(), &RandomSecretGenerator).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.service("db").unwrap().image, "postgres:15");
        assert!(doc.service("app").unwrap().environment.contains_key("SECRET_KEY_BASE"));
    }

    #[test]
    fn test_resource_tier_does_not_change_document() {
        let small = compile("next-app", &WizardOptions::default(), &CountingSecrets::default()).unwrap();
        let large = compile(
            "next-app",
            &WizardOptions::default().with_tier(ResourceTier::Xlarge),
            &CountingSecrets::default(),
        )
        .unwrap();
        assert_eq!(small, large);
    }

    #[test]
    fn test_database_name_sanitized() {
        assert_eq!(database_name(None), "app");
        assert_eq!(database_name(Some("  ")), "app");
        assert_eq!(database_name(Some("Blog-2")), "blog_2");
    }
}
