// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Run configuration.
//!
//! Assembled once per run (TOML file and/or command line), validated, then
//! shared read-only by every partition.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default indexing pipeline endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "http://localhost:8764/api/apollo/index-pipelines/eventsim-default/collections/eventsim/index";

/// Default number of documents per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("password is required when authentication is enabled")]
    MissingPassword,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Indexing run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Indexing pipeline endpoint URLs.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Authenticate against the pipeline before posting.
    #[serde(default = "default_true")]
    pub auth_enabled: bool,

    /// Username for authentication.
    #[serde(default = "default_username")]
    pub username: String,

    /// Password; required when `auth_enabled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Security realm.
    #[serde(default = "default_realm")]
    pub realm: String,

    /// Documents per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// HTTP request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_endpoints() -> Vec<String> {
    vec![DEFAULT_ENDPOINT.to_string()]
}

fn default_true() -> bool {
    true
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_realm() -> String {
    "native".to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_timeout() -> u64 {
    60
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            auth_enabled: true,
            username: default_username(),
            password: None,
            realm: default_realm(),
            batch_size: DEFAULT_BATCH_SIZE,
            request_timeout_secs: default_timeout(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string without validating it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Configuration for unauthenticated delivery to `endpoints`.
    pub fn unauthenticated(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            auth_enabled: false,
            ..Default::default()
        }
    }

    /// Check run preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth_enabled && self.password.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingPassword);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch size must be positive".into()));
        }
        if self.endpoints.is_empty() {
            return Err(ConfigError::Invalid("no endpoints configured".into()));
        }
        if let Some(bad) = self
            .endpoints
            .iter()
            .find(|e| !(e.starts_with("http://") || e.starts_with("https://")))
        {
            return Err(ConfigError::Invalid(format!(
                "endpoint is not an http(s) URL: {}",
                bad
            )));
        }
        Ok(())
    }

    /// Credentials to authenticate with, if authentication is enabled.
    pub fn credentials(&self) -> Option<Credentials<'_>> {
        if !self.auth_enabled {
            return None;
        }
        Some(Credentials {
            username: &self.username,
            password: self.password.as_deref().unwrap_or_default(),
            realm: &self.realm,
        })
    }
}

/// Borrowed authentication settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub realm: &'a str,
}

/// Split a comma-separated endpoint list, trimming blanks.
pub fn parse_endpoints(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
