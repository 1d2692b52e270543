// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template Engine
//!
//! Renders a stored [`Template`] into a [`ComposeDocument`]:
//!
//! 1. Resolve each declared variable (supplied value, else default with its
//!    own placeholders expanded)
//! 2. Type-check resolved values
//! 3. Reject any skeleton placeholder that has no resolved value
//! 4. Replace `{{name}}` tokens in every key and string value of the skeleton
//! 5. Hand the result to the manifest reader
//!
//! Substituted values are never rescanned for placeholders, so a value may
//! contain `{{` verbatim. The engine knows nothing about domains or
//! subdomains.

use regex::{Captures, Regex};
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

use super::manifest;
use crate::domain::{ComposeDocument, Template, ValidationError};
use crate::errors::CompileResult;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("token pattern is valid"))
}

/// Where a mapping sits in the skeleton
#[derive(Clone, Copy, PartialEq, Eq)]
enum Level {
    Root,
    Services,
    Nested,
}

/// Render `template` with the supplied variable values
///
/// Values for names the template does not declare are still substituted;
/// the service layer uses this for system variables such as `domain`.
///
/// # Errors
/// - `MissingVariable` - required, no (non-empty) value, no (non-empty) default
/// - `InvalidType` - value does not match the declared type
/// - `UnresolvedToken` - a skeleton or default placeholder has no value
/// - `DuplicateService` - two service names render to the same name
/// - `DuplicateKey` - two other mapping keys render to the same key
/// - `Schema` - the rendered skeleton is not a valid manifest
pub fn render(template: &Template, values: &HashMap<String, String>) -> CompileResult<ComposeDocument> {
    let resolved = resolve_variables(template, values)?;

    if let Some(token) = first_unresolved(&template.config_skeleton, &resolved) {
        return Err(ValidationError::UnresolvedToken { token }.into());
    }

    let rendered = substitute(&template.config_skeleton, &resolved, Level::Root)?;
    let document = manifest::from_value(&rendered)?;

    debug!(
        template = %template.id,
        category = %template.category,
        services = document.len(),
        "Rendered template"
    );

    Ok(document)
}

/// Merge supplied values with declared defaults and check them
///
/// Variables resolve in declaration order. A default may reference supplied
/// values and earlier variables (`default: "{{deployName}}"`). An empty
/// supplied value or an empty default counts as absent; optional variables
/// left with neither resolve to the empty string.
pub fn resolve_variables(
    template: &Template,
    values: &HashMap<String, String>,
) -> Result<HashMap<String, String>, ValidationError> {
    let mut resolved = values.clone();

    for variable in &template.variables {
        let supplied = values.get(&variable.name).filter(|v| !v.is_empty()).cloned();
        let value = match supplied {
            Some(value) => Some(value),
            None => variable
                .default
                .as_deref()
                .filter(|default| !default.is_empty())
                .map(|default| expand_default(default, &resolved))
                .transpose()?,
        };

        match value {
            Some(value) => {
                if !variable.var_type.accepts(&value) {
                    return Err(ValidationError::InvalidType {
                        name: variable.name.clone(),
                        expected: variable.var_type.as_str().to_string(),
                    });
                }
                resolved.insert(variable.name.clone(), value);
            }
            None if variable.required => {
                return Err(ValidationError::MissingVariable {
                    name: variable.name.clone(),
                });
            }
            None => {
                resolved.insert(variable.name.clone(), String::new());
            }
        }
    }

    Ok(resolved)
}

fn expand_default(default: &str, values: &HashMap<String, String>) -> Result<String, ValidationError> {
    if let Some(token) = unresolved_in(default, values) {
        return Err(ValidationError::UnresolvedToken { token });
    }
    Ok(substitute_str(default, values))
}

fn unresolved_in(text: &str, values: &HashMap<String, String>) -> Option<String> {
    token_pattern()
        .captures_iter(text)
        .find(|caps| !values.contains_key(&caps[1]))
        .map(|caps| caps[0].to_string())
}

/// First skeleton placeholder without a value, in document order
fn first_unresolved(value: &Value, values: &HashMap<String, String>) -> Option<String> {
    match value {
        Value::String(s) => unresolved_in(s, values),
        Value::Sequence(items) => items.iter().find_map(|item| first_unresolved(item, values)),
        Value::Mapping(map) => map
            .iter()
            .find_map(|(k, v)| first_unresolved(k, values).or_else(|| first_unresolved(v, values))),
        Value::Tagged(tagged) => first_unresolved(&tagged.value, values),
        _ => None,
    }
}

fn substitute_str(text: &str, values: &HashMap<String, String>) -> String {
    token_pattern()
        .replace_all(text, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn substitute(
    value: &Value,
    values: &HashMap<String, String>,
    level: Level,
) -> Result<Value, ValidationError> {
    let substituted = match value {
        Value::String(s) => Value::String(substitute_str(s, values)),
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| substitute(item, values, Level::Nested))
                .collect::<Result<_, _>>()?,
        ),
        Value::Mapping(map) => {
            let mut rendered = Mapping::with_capacity(map.len());
            for (key, child) in map {
                let new_key = substitute(key, values, Level::Nested)?;
                let child_level = if level == Level::Root && new_key.as_str() == Some("services") {
                    Level::Services
                } else {
                    Level::Nested
                };
                let new_child = substitute(child, values, child_level)?;

                if rendered.insert(new_key.clone(), new_child).is_some() {
                    return Err(match (level, new_key.as_str()) {
                        (Level::Services, Some(name)) => ValidationError::DuplicateService {
                            name: name.to_string(),
                        },
                        // The skeleton key, never the rendered one
                        _ => ValidationError::DuplicateKey {
                            key: key_text(key),
                        },
                    });
                }
            }
            Value::Mapping(rendered)
        }
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: substitute(&tagged.value, values, level)?,
        })),
        other => other.clone(),
    };

    Ok(substituted)
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
