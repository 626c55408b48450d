//! Configuration types for forcehook.
//!
//! `ForcehookConfig` represents the top-level `config.toml`: platform API
//! version, per-call timeout, OAuth client registration and the login host
//! for each environment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::secret::Redacted;

/// Top-level configuration. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForcehookConfig {
    /// Platform REST/tooling API version (e.g. "62.0").
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Upper bound for a single platform HTTP call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Lifetime of a browser session, in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// OAuth client registration (connected app).
    #[serde(default)]
    pub oauth: OAuthConfig,

    /// Environment name -> login host (e.g. `prod` -> `https://login.salesforce.com`).
    #[serde(default = "default_environments")]
    pub environments: BTreeMap<String, String>,
}

fn default_api_version() -> String {
    "62.0".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_session_ttl_secs() -> u64 {
    8 * 60 * 60
}

fn default_environments() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("prod".to_string(), "https://login.salesforce.com".to_string()),
        ("sandbox".to_string(), "https://test.salesforce.com".to_string()),
    ])
}

impl Default for ForcehookConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            request_timeout_secs: default_request_timeout_secs(),
            session_ttl_secs: default_session_ttl_secs(),
            oauth: OAuthConfig::default(),
            environments: default_environments(),
        }
    }
}

impl ForcehookConfig {
    /// Login host for an environment name, without a trailing slash.
    pub fn login_url(&self, env: &str) -> Option<&str> {
        self.environments
            .get(env)
            .map(|url| url.trim_end_matches('/'))
    }
}

/// OAuth connected-app settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<Redacted>,
    pub redirect_uri: Option<String>,
}
