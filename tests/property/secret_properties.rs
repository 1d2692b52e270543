// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for generated secrets

use cim_deployment_compiler::compiler::secrets::satisfies_policy;
use cim_deployment_compiler::compiler::{RandomSecretGenerator, SecretGenerator, SECRET_LENGTH};
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    /// Property: every batch is policy-conformant and collision-free
    #[test]
    fn prop_batches_distinct(count in 1usize..500) {
        let generator = RandomSecretGenerator::new();
        let batch: Vec<String> = (0..count).map(|_| generator.generate().into_inner()).collect();

        for secret in &batch {
            prop_assert_eq!(secret.len(), SECRET_LENGTH);
            prop_assert!(satisfies_policy(secret));
        }
        prop_assert_eq!(batch.iter().collect::<HashSet<_>>().len(), count);
    }

    /// Property: anything containing a non-alphanumeric byte fails the policy
    #[test]
    fn prop_policy_rejects_symbols(prefix in "[A-Za-z0-9]{23}", symbol in "[^A-Za-z0-9]") {
        let candidate = format!("{}{}", prefix, symbol);
        prop_assert!(!satisfies_policy(&candidate));
    }
}
