// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template Store
//!
//! Read-only access to stored templates. The compiler never writes
//! templates; whoever owns the backing store does.

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{ServiceError, ServiceResult};
use crate::domain::Template;

/// Get/list collaborator for stored templates
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Template by id, `None` when absent
    async fn get(&self, id: &str) -> ServiceResult<Option<Template>>;

    /// Every stored template
    async fn list(&self) -> ServiceResult<Vec<Template>>;
}

/// Process-local template store
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: RwLock<IndexMap<String, Template>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded from a JSON array of template records
    pub fn from_json(json: &str) -> ServiceResult<Self> {
        let templates: Vec<Template> =
            serde_json::from_str(json).map_err(|e| ServiceError::Store(e.to_string()))?;

        debug!(count = templates.len(), "Loaded templates");

        Ok(Self {
            templates: RwLock::new(templates.into_iter().map(|t| (t.id.clone(), t)).collect()),
        })
    }

    /// Add or replace a template (seeding only)
    pub async fn insert(&self, template: Template) {
        self.templates.write().await.insert(template.id.clone(), template);
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn get(&self, id: &str) -> ServiceResult<Option<Template>> {
        Ok(self.templates.read().await.get(id).cloned())
    }

    async fn list(&self) -> ServiceResult<Vec<Template>> {
        Ok(self.templates.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TemplateCategory, VariableType};

    const STORED: &str = r#"[
        {
            "id": "nginx-static",
            "name": "Static Site",
            "category": "static",
            "config": { "services": { "web": { "image": "nginx:alpine" } } }
        },
        {
            "id": "traefik",
            "name": "Traefik",
            "category": "proxy",
            "config": { "services": { "proxy": { "image": "traefik:v3" } } },
            "tags": ["proxy"]
        }
    ]"#;

    #[tokio::test]
    async fn test_from_json_keeps_order() {
        let store = InMemoryTemplateStore::from_json(STORED).unwrap();
        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["nginx-static", "traefik"]);

        let proxy = store.get("traefik").await.unwrap().unwrap();
        assert_eq!(proxy.category, TemplateCategory::Proxy);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_loads_password_variables() {
        let store = InMemoryTemplateStore::from_json(
            r#"[{
                "id": "mongodb",
                "name": "MongoDB",
                "category": "container",
                "config": { "services": { "mongo": { "image": "mongo:latest" } } },
                "variables": [
                    { "name": "username", "label": "Admin Username", "type": "text", "default": "admin", "required": true },
                    { "name": "password", "label": "Admin Password", "type": "password", "required": true },
                    { "name": "database", "label": "Initial Database", "type": "text", "default": "{{deployName}}" }
                ]
            }]"#,
        )
        .unwrap();

        let mongo = store.get("mongodb").await.unwrap().unwrap();
        assert_eq!(mongo.variable("password").unwrap().var_type, VariableType::Password);
        assert_eq!(mongo.variable("username").unwrap().var_type, VariableType::String);
    }

    #[tokio::test]
    async fn test_bad_json_is_store_error() {
        let err = InMemoryTemplateStore::from_json("{not json").unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[tokio::test]
    async fn test_insert_replaces() {
        let store = InMemoryTemplateStore::new();
        let skeleton = serde_yaml::from_str("services: {}").unwrap();
        store
            .insert(Template::new("t", "One", TemplateCategory::Container, skeleton))
            .await;
        let skeleton = serde_yaml::from_str("services: {}").unwrap();
        store
            .insert(Template::new("t", "Two", TemplateCategory::Container, skeleton))
            .await;

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Two");
    }
}
