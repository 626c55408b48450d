//! Webhook trigger metadata and the data-change events it fires on.
//!
//! `TriggerMetadata` is the record that both the Apex generator and the
//! trigger parser agree on. Request payloads never deserialize straight into
//! it: they land in [`WebhookPayload`] first and are checked field by field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WebhookError;

/// A data-change event an Apex trigger can fire on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TriggerEvent {
    BeforeInsert,
    BeforeUpdate,
    BeforeDelete,
    AfterInsert,
    AfterUpdate,
    AfterDelete,
    AfterUndelete,
}

/// Canonical spellings: (tag, tag name, Apex trigger clause).
const EVENT_TABLE: [(TriggerEvent, &str, &str); 7] = [
    (TriggerEvent::BeforeInsert, "BeforeInsert", "before insert"),
    (TriggerEvent::BeforeUpdate, "BeforeUpdate", "before update"),
    (TriggerEvent::BeforeDelete, "BeforeDelete", "before delete"),
    (TriggerEvent::AfterInsert, "AfterInsert", "after insert"),
    (TriggerEvent::AfterUpdate, "AfterUpdate", "after update"),
    (TriggerEvent::AfterDelete, "AfterDelete", "after delete"),
    (TriggerEvent::AfterUndelete, "AfterUndelete", "after undelete"),
];

impl TriggerEvent {
    /// Every event, in declaration order.
    pub const ALL: [TriggerEvent; 7] = [
        TriggerEvent::BeforeInsert,
        TriggerEvent::BeforeUpdate,
        TriggerEvent::BeforeDelete,
        TriggerEvent::AfterInsert,
        TriggerEvent::AfterUpdate,
        TriggerEvent::AfterDelete,
        TriggerEvent::AfterUndelete,
    ];

    // EVENT_TABLE rows follow the variant declaration order.
    fn entry(self) -> &'static (TriggerEvent, &'static str, &'static str) {
        &EVENT_TABLE[self as usize]
    }

    /// Tag name used in JSON payloads (e.g. `"AfterInsert"`).
    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Apex trigger clause (e.g. `"after insert"`).
    pub fn clause(self) -> &'static str {
        self.entry().2
    }

    /// Look up an event by its tag name. Case-sensitive.
    pub fn from_name(name: &str) -> Result<Self, UnknownEventError> {
        EVENT_TABLE
            .iter()
            .find(|(_, tag, _)| *tag == name)
            .map(|(event, _, _)| *event)
            .ok_or_else(|| UnknownEventError(name.to_string()))
    }

    /// Look up an event by its Apex clause. Case-sensitive.
    pub fn from_clause(clause: &str) -> Result<Self, UnknownEventError> {
        EVENT_TABLE
            .iter()
            .find(|(_, _, text)| *text == clause)
            .map(|(event, _, _)| *event)
            .ok_or_else(|| UnknownEventError(clause.to_string()))
    }

    pub fn is_insert(self) -> bool {
        matches!(self, TriggerEvent::BeforeInsert | TriggerEvent::AfterInsert)
    }

    pub fn is_update(self) -> bool {
        matches!(self, TriggerEvent::BeforeUpdate | TriggerEvent::AfterUpdate)
    }

    pub fn is_delete(self) -> bool {
        matches!(self, TriggerEvent::BeforeDelete | TriggerEvent::AfterDelete)
    }

    pub fn is_undelete(self) -> bool {
        matches!(self, TriggerEvent::AfterUndelete)
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TriggerEvent {
    type Err = UnknownEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl TryFrom<String> for TriggerEvent {
    type Error = UnknownEventError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_name(&s)
    }
}

impl From<TriggerEvent> for String {
    fn from(event: TriggerEvent) -> Self {
        event.name().to_string()
    }
}

/// A spelling that does not map onto any [`TriggerEvent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trigger event: '{0}'")]
pub struct UnknownEventError(pub String);

/// Everything needed to generate (or describe) one webhook trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerMetadata {
    /// Artifact name, used for the trigger and its test class.
    pub name: String,
    /// Target sobject (e.g. `Account`, `Order`, `Invoice__c`).
    pub sobject: String,
    /// Events in declaration order, never empty.
    pub events: Vec<TriggerEvent>,
    /// Absolute callback URL.
    pub url: String,
}

impl TriggerMetadata {
    /// Build metadata, enforcing every field invariant.
    pub fn new(
        name: impl Into<String>,
        sobject: impl Into<String>,
        events: Vec<TriggerEvent>,
        url: impl Into<String>,
    ) -> Result<Self, WebhookError> {
        let name = name.into();
        let sobject = sobject.into();
        let url = url.into();

        validate_apex_name(&name)?;
        validate_identifier("sobject", &sobject)?;
        validate_url(&url)?;

        let mut unique = Vec::with_capacity(events.len());
        for event in events {
            if !unique.contains(&event) {
                unique.push(event);
            }
        }
        if unique.is_empty() {
            return Err(WebhookError::Validation(
                "events must contain at least one trigger event".to_string(),
            ));
        }

        Ok(Self {
            name,
            sobject,
            events: unique,
            url,
        })
    }
}

/// Raw provisioning request body: `{ name, sobject, events, url }`.
///
/// All fields are optional here so that a missing field is reported as a
/// validation failure naming that field, not as a generic decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    pub name: Option<String>,
    pub sobject: Option<String>,
    pub events: Option<Vec<String>>,
    pub url: Option<String>,
}

impl TryFrom<WebhookPayload> for TriggerMetadata {
    type Error = WebhookError;

    fn try_from(payload: WebhookPayload) -> Result<Self, Self::Error> {
        let name = required("name", payload.name)?;
        let sobject = required("sobject", payload.sobject)?;
        let url = required("url", payload.url)?;
        let raw_events = payload
            .events
            .ok_or_else(|| WebhookError::Validation("missing required field 'events'".to_string()))?;

        let events = raw_events
            .iter()
            .map(|raw| TriggerEvent::from_name(raw.trim()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| WebhookError::Validation(e.to_string()))?;

        TriggerMetadata::new(name, sobject, events, url)
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, WebhookError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(WebhookError::Validation(format!(
            "field '{field}' must not be empty"
        ))),
        None => Err(WebhookError::Validation(format!(
            "missing required field '{field}'"
        ))),
    }
}

/// Platform identifiers: ASCII letter first, then letters, digits or `_`.
fn validate_identifier(field: &str, value: &str) -> Result<(), WebhookError> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(WebhookError::Validation(format!(
            "field '{field}' must be a platform identifier (letters, digits, '_'), got '{value}'"
        )))
    }
}

/// Class and trigger names are stricter than sobject names: no trailing
/// `_` and no `__` anywhere (that form is reserved for namespaces and custom
/// object suffixes).
fn validate_apex_name(value: &str) -> Result<(), WebhookError> {
    validate_identifier("name", value)?;
    if value.ends_with('_') || value.contains("__") {
        return Err(WebhookError::Validation(format!(
            "field 'name' must not end with '_' or contain '__', got '{value}'"
        )));
    }
    Ok(())
}

/// The URL ends up inside an Apex string literal, so quotes, backslashes and
/// line breaks are rejected along with anything that is not http(s).
fn validate_url(url: &str) -> Result<(), WebhookError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| {
            WebhookError::Validation(format!("field 'url' must be an absolute http(s) URL, got '{url}'"))
        })?;

    if rest.is_empty() || rest.starts_with('/') {
        return Err(WebhookError::Validation(format!(
            "field 'url' has no host: '{url}'"
        )));
    }
    if url
        .chars()
        .any(|c| c == '\'' || c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(WebhookError::Validation(format!(
            "field 'url' contains characters not allowed in a callback URL: '{url}'"
        )));
    }

    Ok(())
}
