//! Reads [`TriggerMetadata`] back out of a generated trigger body.
//!
//! This is not an Apex parser. It only understands the exact shape produced
//! by [`render_trigger`](super::render_trigger).

use forcehook_types::error::WebhookError;
use forcehook_types::webhook::{TriggerEvent, TriggerMetadata};

use super::{SOBJECT_TOKEN_INDEX, URL_MARKER, URL_TERMINATOR};

/// Parse a trigger body. `name` is the artifact's declared name and is
/// returned as-is.
pub fn parse_trigger(name: &str, body: &str) -> Result<TriggerMetadata, WebhookError> {
    let fail = |reason: String| WebhookError::Parse {
        name: name.to_string(),
        reason,
    };

    let first_line = body.lines().next().unwrap_or_default();

    let sobject = first_line
        .split(' ')
        .nth(SOBJECT_TOKEN_INDEX)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| fail(format!("first line has no sobject token: '{first_line}'")))?;

    let events = parse_events(first_line).map_err(fail)?;
    let url = parse_url(body).map_err(fail)?;

    Ok(TriggerMetadata {
        name: name.to_string(),
        sobject: sobject.to_string(),
        events,
        url: url.to_string(),
    })
}

fn parse_events(first_line: &str) -> Result<Vec<TriggerEvent>, String> {
    let open = first_line
        .find('(')
        .ok_or_else(|| "first line has no '('".to_string())?;
    let close = first_line
        .find(')')
        .ok_or_else(|| "first line has no ')'".to_string())?;
    if close < open {
        return Err("')' appears before '(' on first line".to_string());
    }

    let inner = &first_line[open + 1..close];
    if inner.trim().is_empty() {
        return Err("trigger declares no events".to_string());
    }

    inner
        .split(',')
        .map(|token| TriggerEvent::from_clause(token.trim()).map_err(|e| e.to_string()))
        .collect()
}

fn parse_url(body: &str) -> Result<&str, String> {
    let start = body
        .find(URL_MARKER)
        .map(|i| i + URL_MARKER.len())
        .ok_or_else(|| format!("missing url marker \"{URL_MARKER}\""))?;
    let rest = &body[start..];
    let end = rest
        .find(URL_TERMINATOR)
        .ok_or_else(|| format!("url is not terminated by \"{URL_TERMINATOR}\""))?;

    let url = &rest[..end];
    if url.is_empty() {
        return Err("url is empty".to_string());
    }
    Ok(url)
}
