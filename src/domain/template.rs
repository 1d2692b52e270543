// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stored Deployment Templates
//!
//! A template is a manifest skeleton with `{{name}}` placeholders plus the
//! variables an administrator declared for it. Templates are read-only input
//! to the template engine; they are created and edited elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;

/// What kind of deployment a template describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Container,
    Proxy,
    Static,
    #[serde(alias = "load_balancer")]
    LoadBalancer,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Proxy => "proxy",
            Self::Static => "static",
            Self::LoadBalancer => "loadbalancer",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a template variable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    #[serde(alias = "text")]
    String,
    Number,
    Boolean,
    /// Any string; the value is a credential
    Password,
}

impl VariableType {
    /// Whether `value` is acceptable for this type
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::String | Self::Password => true,
            Self::Number => value.trim().parse::<f64>().is_ok_and(f64::is_finite),
            Self::Boolean => matches!(value.trim(), "true" | "false"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Password => "password",
        }
    }

    /// Whether values of this type must stay out of logs and error payloads
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Password)
    }
}

/// One declared substitution variable
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub name: String,

    #[serde(default)]
    pub label: String,

    #[serde(default, rename = "type")]
    pub var_type: VariableType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default)]
    pub required: bool,
}

impl TemplateVariable {
    pub fn new(name: impl Into<String>, var_type: VariableType) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            var_type,
            default: None,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl fmt::Debug for TemplateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let default = match &self.default {
            Some(_) if self.var_type.is_secret() => Some("***"),
            other => other.as_deref(),
        };
        f.debug_struct("TemplateVariable")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("var_type", &self.var_type)
            .field("default", &default)
            .field("required", &self.required)
            .finish()
    }
}

/// Stored, parameterized manifest skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub category: TemplateCategory,

    /// Manifest-shaped skeleton containing `{{name}}` placeholders
    #[serde(alias = "config")]
    pub config_skeleton: Value,

    #[serde(default)]
    pub variables: Vec<TemplateVariable>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Template {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: TemplateCategory,
        config_skeleton: Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category,
            config_skeleton,
            variables: Vec::new(),
            tags: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_variable(mut self, variable: TemplateVariable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn variable(&self, name: &str) -> Option<&TemplateVariable> {
        self.variables.iter().find(|v| v.name == name)
    }
}
