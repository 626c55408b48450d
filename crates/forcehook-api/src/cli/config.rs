//! `forcehook config`: show the effective configuration.

use std::path::Path;

use console::style;
use serde_json::json;

use forcehook_types::config::ForcehookConfig;

pub fn show_config(config: &ForcehookConfig, data_dir: &Path, json: bool) -> anyhow::Result<()> {
    let secret = config.oauth.client_secret.as_ref().map(|s| s.masked());

    if json {
        let out = json!({
            "data_dir": data_dir.display().to_string(),
            "api_version": config.api_version,
            "request_timeout_secs": config.request_timeout_secs,
            "session_ttl_secs": config.session_ttl_secs,
            "oauth": {
                "client_id": config.oauth.client_id,
                "client_secret": secret,
                "redirect_uri": config.oauth.redirect_uri,
            },
            "environments": config.environments,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let unset = || style("(unset)").dim().to_string();

    println!();
    println!("  {}  {}", style("Data dir").bold(), data_dir.display());
    println!("  {}  v{}", style("API version").bold(), config.api_version);
    println!("  {}  {}s", style("Timeout").bold(), config.request_timeout_secs);
    println!("  {}  {}s", style("Session TTL").bold(), config.session_ttl_secs);
    println!();
    println!("  {}", style("OAuth").bold().underlined());
    println!("    client_id      {}", config.oauth.client_id.clone().unwrap_or_else(unset));
    println!("    client_secret  {}", secret.unwrap_or_else(unset));
    println!("    redirect_uri   {}", config.oauth.redirect_uri.clone().unwrap_or_else(unset));
    println!();
    println!("  {}", style("Environments").bold().underlined());
    for (env, url) in &config.environments {
        println!("    {:<14} {}", style(env).cyan(), url);
    }
    println!();
    Ok(())
}
