//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the REST API. The
//! webhook service is generic over the platform port; AppState pins it to
//! the reqwest client from `forcehook-infra`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use forcehook_core::service::webhook::WebhookService;
use forcehook_infra::config::{apply_env_overrides, load_config, resolve_data_dir};
use forcehook_infra::force::ForceClient;
use forcehook_infra::oauth::OAuthClient;
use forcehook_infra::session::{PendingLogins, SessionStore};
use forcehook_types::config::ForcehookConfig;

use crate::http::extractors::connection::CookiePolicy;

/// Webhook service pinned to the HTTP platform client.
pub type ConcreteWebhookService = WebhookService<ForceClient>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub webhook_service: Arc<ConcreteWebhookService>,
    pub oauth: Arc<OAuthClient>,
    pub sessions: SessionStore,
    /// OAuth `state` nonces issued by `/login`, awaiting the callback.
    pub logins: PendingLogins,
    pub cookies: CookiePolicy,
    pub config: Arc<ForcehookConfig>,
}

impl AppState {
    /// Load configuration from the data directory and wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let (config, _) = load_effective_config().await;
        Self::from_config(config)
    }

    pub fn from_config(config: ForcehookConfig) -> anyhow::Result<Self> {
        let platform = ForceClient::new(&config)?;
        let oauth = OAuthClient::new(&config)?;
        let cookies = CookiePolicy::for_redirect_uri(config.oauth.redirect_uri.as_deref());

        Ok(Self {
            webhook_service: Arc::new(WebhookService::new(platform)),
            oauth: Arc::new(oauth),
            sessions: SessionStore::with_ttl(Duration::from_secs(config.session_ttl_secs)),
            logins: PendingLogins::new(),
            cookies,
            config: Arc::new(config),
        })
    }
}

/// `config.toml` from the data directory with environment overrides applied.
pub async fn load_effective_config() -> (ForcehookConfig, PathBuf) {
    let data_dir = resolve_data_dir();
    let config = apply_env_overrides(load_config(&data_dir).await, |key| std::env::var(key).ok());
    (config, data_dir)
}
