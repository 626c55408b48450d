//! `forcehook render`: offline preview of the generated Apex.

use std::path::Path;

use anyhow::Context;
use console::style;
use serde_json::json;

use forcehook_core::apex::{self, ApexArtifacts, HELPER_CLASS_NAME};
use forcehook_types::webhook::{TriggerMetadata, WebhookPayload};

pub async fn render(file: &Path, json: bool) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let payload: WebhookPayload = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid webhook definition", file.display()))?;
    let meta = TriggerMetadata::try_from(payload)?;
    let artifacts = ApexArtifacts::render(&meta);

    if json {
        let out = json!({
            "helper_class": { "name": HELPER_CLASS_NAME, "body": artifacts.helper_class },
            "remote_site": { "name": apex::remote_site_name(&meta.name), "url": meta.url },
            "trigger": { "name": meta.name, "sobject": meta.sobject, "body": artifacts.trigger },
            "test_class": { "name": meta.name, "body": artifacts.test_class },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let section = |title: String| println!("\n{}\n", style(title).bold().cyan());
    section(format!("// class {HELPER_CLASS_NAME}"));
    print!("{}", artifacts.helper_class);
    section(format!(
        "// remote site {} -> {}",
        apex::remote_site_name(&meta.name),
        meta.url
    ));
    section(format!("// trigger {} on {}", meta.name, meta.sobject));
    print!("{}", artifacts.trigger);
    section(format!("// test class {}", meta.name));
    print!("{}", artifacts.test_class);
    Ok(())
}
