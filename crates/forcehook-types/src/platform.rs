//! Records read back from the platform's management API.
//!
//! Only the fields forcehook needs are kept; everything else the platform
//! returns is dropped during decoding.

use serde::{Deserialize, Serialize};

/// An Apex trigger as listed by the tooling API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApexTriggerRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Body")]
    pub body: String,
}

/// An sobject as listed by the describe-global endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SobjectSummary {
    pub name: String,
    #[serde(default)]
    pub triggerable: bool,
}
