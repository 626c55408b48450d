//! OAuth 2.0 web-server flow against the platform's login hosts.
//!
//! [`OAuthClient::authorize_url`] builds the browser redirect and
//! [`OAuthClient::exchange_code`] trades the callback's authorization code
//! for an access token. The `state` value is an opaque nonce chosen by the
//! caller; see [`PendingLogins`](crate::session::PendingLogins).

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use forcehook_types::config::ForcehookConfig;

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("OAuth is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("unknown environment '{0}'")]
    UnknownEnvironment(String),

    #[error("token exchange rejected: {0}")]
    Rejected(String),

    #[error("HTTP request failed: {0}")]
    Http(String),
}

/// Access token returned by a successful exchange.
#[derive(Debug)]
pub struct AccessToken {
    pub access_token: SecretString,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Connected-app client for the authorization-code flow.
pub struct OAuthClient {
    client: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    redirect_uri: Option<String>,
    environments: BTreeMap<String, String>,
}

impl OAuthClient {
    pub fn new(config: &ForcehookConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            client_id: config.oauth.client_id.clone(),
            client_secret: config
                .oauth
                .client_secret
                .as_ref()
                .map(|s| SecretString::from(s.expose().to_string())),
            redirect_uri: config.oauth.redirect_uri.clone(),
            environments: config
                .environments
                .iter()
                .map(|(env, url)| (env.clone(), url.trim_end_matches('/').to_string()))
                .collect(),
        })
    }

    /// Whether the client id and redirect URI needed to start a login are set.
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.redirect_uri.is_some()
    }

    fn login_url(&self, env: &str) -> Result<&str, OAuthError> {
        self.environments
            .get(env)
            .map(String::as_str)
            .ok_or_else(|| OAuthError::UnknownEnvironment(env.to_string()))
    }

    fn client_id(&self) -> Result<&str, OAuthError> {
        self.client_id.as_deref().ok_or(OAuthError::NotConfigured("client_id"))
    }

    fn redirect_uri(&self) -> Result<&str, OAuthError> {
        self.redirect_uri
            .as_deref()
            .ok_or(OAuthError::NotConfigured("redirect_uri"))
    }

    /// Authorization endpoint URL for `env`, carrying `state` through the
    /// platform's login page back to the callback.
    pub fn authorize_url(&self, env: &str, state: &str) -> Result<String, OAuthError> {
        let base = format!("{}/services/oauth2/authorize", self.login_url(env)?);
        let url = Url::parse_with_params(
            &base,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id()?),
                ("redirect_uri", self.redirect_uri()?),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::Http(format!("invalid login url '{base}': {e}")))?;
        Ok(url.into())
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, env: &str, code: &str) -> Result<AccessToken, OAuthError> {
        let url = format!("{}/services/oauth2/token", self.login_url(env)?);
        let secret = self
            .client_secret
            .as_ref()
            .ok_or(OAuthError::NotConfigured("client_secret"))?;

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id()?),
            ("client_secret", secret.expose_secret()),
            ("redirect_uri", self.redirect_uri()?),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| OAuthError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OAuthError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => OAuthError::Rejected(err.error_description.unwrap_or(err.error)),
                Err(_) => OAuthError::Rejected(format!("HTTP {status}: {body}")),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| OAuthError::Http(format!("failed to parse token response: {e}")))?;

        tracing::info!(env, "oauth code exchanged");
        Ok(AccessToken {
            access_token: SecretString::from(token.access_token),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forcehook_types::secret::Redacted;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn configured(login: &str) -> ForcehookConfig {
        let mut config = ForcehookConfig::default();
        config.environments.insert("prod".to_string(), login.to_string());
        config.oauth.client_id = Some("cid".to_string());
        config.oauth.client_secret = Some(Redacted::new("csecret"));
        config.oauth.redirect_uri = Some("http://localhost:3000/_oauth_callback".to_string());
        config
    }

    #[test]
    fn authorize_url_carries_state_nonce() {
        let client = OAuthClient::new(&configured("https://login.salesforce.com/")).unwrap();
        let url = Url::parse(&client.authorize_url("prod", "n0nce").unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("login.salesforce.com"));
        assert_eq!(url.path(), "/services/oauth2/authorize");
        let params: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "cid");
        assert_eq!(params["state"], "n0nce");
        assert_eq!(params["redirect_uri"], "http://localhost:3000/_oauth_callback");
    }

    #[test]
    fn authorize_url_errors() {
        let client = OAuthClient::new(&ForcehookConfig::default()).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client.authorize_url("prod", "n"),
            Err(OAuthError::NotConfigured("client_id"))
        ));
        assert!(matches!(
            client.authorize_url("nowhere", "n"),
            Err(OAuthError::UnknownEnvironment(_))
        ));
    }

    #[tokio::test]
    async fn exchange_code_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/oauth2/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc123"))
            .and(body_string_contains("client_secret=csecret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "00Dxx!token",
                "instance_url": "https://na1.salesforce.com",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::new(&configured(&server.uri())).unwrap();
        let token = client.exchange_code("prod", "abc123").await.unwrap();
        assert_eq!(token.access_token.expose_secret(), "00Dxx!token");
    }

    #[tokio::test]
    async fn exchange_code_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "expired authorization code"
            })))
            .mount(&server)
            .await;

        let client = OAuthClient::new(&configured(&server.uri())).unwrap();
        let err = client.exchange_code("prod", "old").await.unwrap_err();
        assert!(matches!(err, OAuthError::Rejected(ref m) if m == "expired authorization code"));
    }
}
