//! REST and tooling API wire types.
//!
//! These mirror the platform's JSON shapes. They are not the domain types
//! from `forcehook-types`; the client converts between the two.

use serde::{Deserialize, Serialize};

/// Response of `GET <login>/services/oauth2/userinfo`. Only the REST
/// endpoint template is needed to find the connection's instance host.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub urls: UserInfoUrls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoUrls {
    pub rest: String,
}

/// Response of `GET /services/data/vXX.X/sobjects`.
#[derive(Debug, Clone, Deserialize)]
pub struct DescribeGlobal<T> {
    pub sobjects: Vec<T>,
}

/// One page of a (tooling) SOQL query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage<T> {
    pub records: Vec<T>,
    #[serde(default = "default_done")]
    pub done: bool,
    pub next_records_url: Option<String>,
}

fn default_done() -> bool {
    true
}

/// Body of `POST /tooling/sobjects/ApexClass`.
#[derive(Debug, Clone, Serialize)]
pub struct ApexClassCreate<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "Body")]
    pub body: &'a str,
}

/// Body of `POST /tooling/sobjects/ApexTrigger`.
#[derive(Debug, Clone, Serialize)]
pub struct ApexTriggerCreate<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "TableEnumOrId")]
    pub table_enum_or_id: &'a str,
    #[serde(rename = "Body")]
    pub body: &'a str,
}

/// One element of the platform's JSON error array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error_code: String,
}

/// Error code the platform uses for a name collision.
pub const DUPLICATE_VALUE: &str = "DUPLICATE_VALUE";

#[cfg(test)]
mod tests {
    use super::*;
    use forcehook_types::platform::ApexTriggerRecord;

    #[test]
    fn query_page_with_attributes() {
        let json = r#"{
            "size": 1,
            "totalSize": 1,
            "done": false,
            "nextRecordsUrl": "/services/data/v62.0/tooling/query/01g-2000",
            "records": [
                {"attributes": {"type": "ApexTrigger"}, "Name": "AWebhookTrigger", "Body": "trigger"}
            ]
        }"#;
        let page: QueryPage<ApexTriggerRecord> = serde_json::from_str(json).unwrap();
        assert!(!page.done);
        assert_eq!(page.records[0].name, "AWebhookTrigger");
        assert_eq!(
            page.next_records_url.as_deref(),
            Some("/services/data/v62.0/tooling/query/01g-2000")
        );
    }

    #[test]
    fn trigger_create_uses_platform_field_names() {
        let body = serde_json::to_value(ApexTriggerCreate {
            name: "T",
            table_enum_or_id: "Account",
            body: "b",
        })
        .unwrap();
        assert_eq!(body["TableEnumOrId"], "Account");
        assert_eq!(body["Name"], "T");
    }

    #[test]
    fn api_error_array() {
        let errors: Vec<ApiError> = serde_json::from_str(
            r#"[{"message":"duplicate value found","errorCode":"DUPLICATE_VALUE","fields":[]}]"#,
        )
        .unwrap();
        assert_eq!(errors[0].error_code, DUPLICATE_VALUE);
    }
}
