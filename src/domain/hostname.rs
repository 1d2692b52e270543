// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hostname and Subdomain Fragment Value Objects with DNS Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Hostname validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostnameError {
    #[error("Hostname is empty")]
    Empty,

    #[error("Hostname exceeds maximum length of 253 characters: {0}")]
    TooLong(usize),

    #[error("Label exceeds maximum length of 63 characters: {0}")]
    LabelTooLong(String),

    #[error("Invalid character in hostname: {0}")]
    InvalidCharacter(char),

    #[error("Label cannot start or end with hyphen: {0}")]
    InvalidLabelFormat(String),

    #[error("Top-level label cannot be all numeric: {0}")]
    NumericLabel(String),
}

/// Fully Qualified Domain Name (FQDN) value object
///
/// Represents a valid DNS hostname following RFC 1123 with invariants:
/// - Total length ≤ 253 characters
/// - Each label ≤ 63 characters
/// - Labels separated by dots
/// - Labels contain only alphanumeric and hyphens
/// - Labels cannot start or end with hyphens
/// - The top-level label cannot be all numeric
///
/// Root domains and aliases of a deployment are held as `Hostname`s in
/// canonical (lowercase) form, see [`Hostname::canonical`].
///
/// # Examples
///
/// ```rust
/// use cim_deployment_compiler::domain::Hostname;
///
/// let host = Hostname::canonical("Shop.Example.com").unwrap();
/// assert_eq!(host.as_str(), "shop.example.com");
///
/// assert!(Hostname::new("").is_err());
/// assert!(Hostname::new("-invalid").is_err());
/// assert!(Hostname::new("invalid-.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hostname(String);

impl Hostname {
    /// Maximum total length for FQDN (RFC 1123)
    pub const MAX_LENGTH: usize = 253;

    /// Maximum length for a single label (RFC 1123)
    pub const MAX_LABEL_LENGTH: usize = 63;

    /// Create a new hostname with validation
    pub fn new(hostname: impl Into<String>) -> Result<Self, HostnameError> {
        let hostname = hostname.into();

        if hostname.is_empty() {
            return Err(HostnameError::Empty);
        }

        if hostname.len() > Self::MAX_LENGTH {
            return Err(HostnameError::TooLong(hostname.len()));
        }

        for label in hostname.split('.') {
            validate_label(label)?;
        }

        // Only the TLD is held to the non-numeric rule
        if let Some(tld) = hostname.rsplit('.').next() {
            if tld.chars().all(|c| c.is_ascii_digit()) {
                return Err(HostnameError::NumericLabel(tld.to_string()));
            }
        }

        Ok(Self(hostname))
    }

    /// Lowercase and trim the input, then validate it
    pub fn canonical(hostname: &str) -> Result<Self, HostnameError> {
        Self::new(hostname.trim().to_ascii_lowercase())
    }

    /// Prefix this hostname with a subdomain fragment (`api` + `example.com`)
    pub fn with_fragment(&self, fragment: &SubdomainFragment) -> Result<Self, HostnameError> {
        Self::new(format!("{}.{}", fragment.as_str(), self.0))
    }

    /// Get the hostname as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validate a single DNS label
fn validate_label(label: &str) -> Result<(), HostnameError> {
    if label.is_empty() {
        return Err(HostnameError::Empty);
    }

    if label.len() > Hostname::MAX_LABEL_LENGTH {
        return Err(HostnameError::LabelTooLong(label.to_string()));
    }

    for ch in label.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '-' {
            return Err(HostnameError::InvalidCharacter(ch));
        }
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(HostnameError::InvalidLabelFormat(label.to_string()));
    }

    Ok(())
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Hostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Hostname {
    type Error = HostnameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Hostname {
    type Error = HostnameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Subdomain fragment: the label placed in front of a root domain to address
/// one service (`api` in `api.example.com`).
///
/// Invariants:
/// - Lowercase
/// - Only `[a-z0-9-]`
/// - Non-empty, at most 63 characters, no leading or trailing hyphen
///
/// The fragments `main` and `app` are reserved and address the root domain
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubdomainFragment(String);

impl SubdomainFragment {
    /// Fragments that resolve to the bare root domain
    pub const RESERVED: [&'static str; 2] = ["main", "app"];

    /// Normalize (lowercase) and validate a fragment
    pub fn new(raw: &str) -> Result<Self, HostnameError> {
        let fragment = raw.trim().to_lowercase();

        if fragment.is_empty() {
            return Err(HostnameError::Empty);
        }

        if let Some(ch) = fragment
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(HostnameError::InvalidCharacter(ch));
        }

        validate_label(&fragment)?;

        Ok(Self(fragment))
    }

    /// Whether this fragment addresses the root domain (`main` / `app`)
    pub fn is_root(&self) -> bool {
        Self::RESERVED.contains(&self.0.as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubdomainFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SubdomainFragment {
    type Error = HostnameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<SubdomainFragment> for String {
    fn from(fragment: SubdomainFragment) -> Self {
        fragment.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_hostnames() {
        assert!(Hostname::new("localhost").is_ok());
        assert!(Hostname::new("app.example.com").is_ok());
        assert!(Hostname::new("api-server.prod.us-east-1.example.com").is_ok());
        assert!(Hostname::new("1.example.com").is_ok());
        assert!(Hostname::new("a.b").is_ok());
    }

    #[test]
    fn test_invalid_hostnames() {
        assert!(Hostname::new("").is_err());
        assert!(Hostname::new("-invalid").is_err());
        assert!(Hostname::new("invalid-").is_err());
        assert!(Hostname::new("invalid..com").is_err());
        assert!(Hostname::new("invalid_.com").is_err());
        assert!(Hostname::new("example.123").is_err());
        assert!(Hostname::new("https://example.com").is_err());
    }

    #[test]
    fn test_length_limits() {
        let long_label = "a".repeat(64);
        assert!(Hostname::new(format!("{}.com", long_label)).is_err());

        let max_label = "a".repeat(63);
        assert!(Hostname::new(format!("{}.com", max_label)).is_ok());

        let long_fqdn = format!("{}.{}.com", "a".repeat(125), "b".repeat(125));
        assert_eq!(
            Hostname::new(long_fqdn),
            Err(HostnameError::TooLong(255))
        );
    }

    #[test]
    fn test_canonical_lowercases() {
        let host = Hostname::canonical("  Shop.Example.COM ").unwrap();
        assert_eq!(host.as_str(), "shop.example.com");
    }

    #[test]
    fn test_with_fragment() {
        let root = Hostname::new("example.com").unwrap();
        let api = SubdomainFragment::new("api").unwrap();
        assert_eq!(root.with_fragment(&api).unwrap().as_str(), "api.example.com");
    }

    #[test]
    fn test_fragment_normalization() {
        assert_eq!(SubdomainFragment::new("API").unwrap().as_str(), "api");
        assert_eq!(
            SubdomainFragment::new("my_db"),
            Err(HostnameError::InvalidCharacter('_'))
        );
        assert!(SubdomainFragment::new("").is_err());
        assert!(SubdomainFragment::new("-web").is_err());
        assert!(SubdomainFragment::new("web.v2").is_err());
    }

    #[test]
    fn test_reserved_fragments() {
        assert!(SubdomainFragment::new("main").unwrap().is_root());
        assert!(SubdomainFragment::new("App").unwrap().is_root());
        assert!(!SubdomainFragment::new("api").unwrap().is_root());
    }
}
