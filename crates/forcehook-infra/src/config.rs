//! Configuration loader for forcehook.
//!
//! Reads `config.toml` from the data directory (`~/.forcehook/` in
//! production) and deserializes it into [`ForcehookConfig`]. Falls back to
//! defaults when the file is missing or malformed, then applies environment
//! variable overrides for the OAuth client registration.

use std::path::{Path, PathBuf};

use forcehook_types::config::ForcehookConfig;
use forcehook_types::secret::Redacted;

pub const ENV_DATA_DIR: &str = "FORCEHOOK_DATA_DIR";
pub const ENV_CLIENT_ID: &str = "FORCEHOOK_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "FORCEHOOK_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "FORCEHOOK_REDIRECT_URI";

/// Resolve the data directory.
///
/// Priority: `FORCEHOOK_DATA_DIR`, then `~/.forcehook`, then `./.forcehook`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".forcehook");
    }

    PathBuf::from(".forcehook")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ForcehookConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> ForcehookConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ForcehookConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ForcehookConfig::default();
        }
    };

    match toml::from_str::<ForcehookConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ForcehookConfig::default()
        }
    }
}

/// Overlay OAuth settings from environment variables onto a loaded config.
///
/// `lookup` is `std::env::var` in production; tests pass a closure.
pub fn apply_env_overrides<F>(mut config: ForcehookConfig, lookup: F) -> ForcehookConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(id) = non_empty(ENV_CLIENT_ID) {
        config.oauth.client_id = Some(id);
    }
    if let Some(secret) = non_empty(ENV_CLIENT_SECRET) {
        config.oauth.client_secret = Some(Redacted::new(secret));
    }
    if let Some(uri) = non_empty(ENV_REDIRECT_URI) {
        config.oauth.redirect_uri = Some(uri);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.api_version, "62.0");
        assert!(config.oauth.client_id.is_none());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
api_version = "61.0"
request_timeout_secs = 10

[oauth]
client_id = "3MVG9-client"
redirect_uri = "http://localhost:3000/_oauth_callback"
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.api_version, "61.0");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.oauth.client_id.as_deref(), Some("3MVG9-client"));
        assert_eq!(config.login_url("prod"), Some("https://login.salesforce.com"));
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.api_version, "62.0");
    }

    #[test]
    fn env_overrides_replace_oauth_fields() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_CLIENT_ID, "env-client"),
            (ENV_CLIENT_SECRET, "env-secret"),
            (ENV_REDIRECT_URI, "  "),
        ]);
        let mut base = ForcehookConfig::default();
        base.oauth.redirect_uri = Some("http://file/cb".to_string());

        let config = apply_env_overrides(base, |k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.oauth.client_id.as_deref(), Some("env-client"));
        assert_eq!(
            config.oauth.client_secret.as_ref().map(|s| s.expose()),
            Some("env-secret")
        );
        // Blank values do not override.
        assert_eq!(config.oauth.redirect_uri.as_deref(), Some("http://file/cb"));
    }
}
