// Copyright (c) 2025 - Cowboy AI, Inc.
//! Secret Generator
//!
//! Credentials for generated infrastructure services (database sidecars).
//! Every call draws fresh output from a cryptographically secure generator;
//! nothing is derived from counters or timestamps.

use rand::distr::Alphanumeric;
use rand::Rng;
use std::fmt;

/// Length of every generated secret
pub const SECRET_LENGTH: usize = 24;

/// Generated credential
///
/// `Debug` and `Display` never show the value; call [`Secret::expose`] at the
/// single point where it is written into a service environment.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Source of generated credentials
pub trait SecretGenerator: Send + Sync {
    fn generate(&self) -> Secret;
}

/// Alphanumeric secrets of [`SECRET_LENGTH`] characters from the thread-local
/// CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSecretGenerator;

impl RandomSecretGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl SecretGenerator for RandomSecretGenerator {
    fn generate(&self) -> Secret {
        let value: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SECRET_LENGTH)
            .map(char::from)
            .collect();
        Secret(value)
    }
}

/// Whether `value` satisfies the generation policy
pub fn satisfies_policy(value: &str) -> bool {
    value.len() == SECRET_LENGTH && value.bytes().all(|b| b.is_ascii_alphanumeric())
}
