// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod manifest_properties;
mod secret_properties;
mod subdomain_properties;
