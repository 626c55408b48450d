//! ForceClient -- concrete [`ForcePlatform`] implementation over reqwest.
//!
//! Every call is authenticated with the connection's access token as a
//! bearer credential. The instance host for a connection is discovered once
//! through the login host's `userinfo` endpoint and cached per
//! (environment, token) pair. An entry is dropped as soon as the platform
//! rejects its token, and the cache is cleared once it reaches
//! [`MAX_CACHED_INSTANCES`] entries.
//!
//! The client never derives `Debug`: the instance cache is keyed by tokens.

use std::collections::BTreeMap;
use std::time::Duration;

use dashmap::DashMap;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::Instrument;

use forcehook_core::platform::ForcePlatform;
use forcehook_types::config::ForcehookConfig;
use forcehook_types::connection::ConnectionContext;
use forcehook_types::error::PlatformError;
use forcehook_types::platform::{ApexTriggerRecord, SobjectSummary};

use super::metadata::{create_remote_site_envelope, interpret_create_response};
use super::types::{
    ApexClassCreate, ApexTriggerCreate, ApiError, DUPLICATE_VALUE, DescribeGlobal, QueryPage,
    UserInfo,
};

const TRIGGER_QUERY: &str = "SELECT Name, Body FROM ApexTrigger";

/// Error code the platform returns for an expired or revoked token.
const INVALID_SESSION_ID: &str = "INVALID_SESSION_ID";

/// Upper bound on cached instance hosts.
pub const MAX_CACHED_INSTANCES: usize = 1024;

type InstanceKey = (String, String);

/// HTTP client for the platform's management APIs.
pub struct ForceClient {
    client: reqwest::Client,
    api_version: String,
    environments: BTreeMap<String, String>,
    instances: DashMap<InstanceKey, String>,
    instance_capacity: usize,
}

impl ForceClient {
    /// Build a client from configuration. Each HTTP call is bounded by
    /// `request_timeout_secs`.
    pub fn new(config: &ForcehookConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let environments = config
            .environments
            .iter()
            .map(|(env, url)| (env.clone(), url.trim_end_matches('/').to_string()))
            .collect();

        Ok(Self {
            client,
            api_version: config.api_version.clone(),
            environments,
            instances: DashMap::new(),
            instance_capacity: MAX_CACHED_INSTANCES,
        })
    }

    fn login_url(&self, env: &str) -> Result<&str, PlatformError> {
        self.environments
            .get(env)
            .map(String::as_str)
            .ok_or_else(|| PlatformError::Upstream(format!("unknown environment '{env}'")))
    }

    fn instance_key(conn: &ConnectionContext) -> InstanceKey {
        (conn.env().to_string(), conn.session_id().to_string())
    }

    fn remember_instance(&self, key: InstanceKey, instance: String) {
        if self.instances.len() >= self.instance_capacity {
            tracing::debug!(entries = self.instances.len(), "instance cache full, clearing");
            self.instances.clear();
        }
        self.instances.insert(key, instance);
    }

    /// Drop the cached instance for a connection whose token was rejected.
    fn forget_instance(&self, conn: &ConnectionContext) {
        if self.instances.remove(&Self::instance_key(conn)).is_some() {
            tracing::debug!(env = %conn.env(), "dropped cached instance for rejected token");
        }
    }

    /// Origin (`scheme://host[:port]`) of the connection's instance.
    async fn instance_url(&self, conn: &ConnectionContext) -> Result<String, PlatformError> {
        let key = Self::instance_key(conn);
        let cached = self.instances.get(&key).map(|entry| entry.value().clone());
        if let Some(instance) = cached {
            return Ok(instance);
        }

        let url = format!("{}/services/oauth2/userinfo", self.login_url(conn.env())?);
        let info: UserInfo = self
            .fetch_json(conn, self.client.get(&url).bearer_auth(conn.session_id()))
            .await?;

        let rest = Url::parse(&info.urls.rest)
            .map_err(|e| PlatformError::Upstream(format!("invalid instance url '{}': {e}", info.urls.rest)))?;
        let instance = rest.origin().ascii_serialization();

        tracing::debug!(env = %conn.env(), %instance, "resolved instance");
        self.remember_instance(key, instance.clone());
        Ok(instance)
    }

    fn data_url(&self, instance: &str, path: &str) -> String {
        format!("{instance}/services/data/v{}{path}", self.api_version)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        conn: &ConnectionContext,
        request: RequestBuilder,
    ) -> Result<T, PlatformError> {
        let response = request.send().await.map_err(transport_error)?;
        let response = self.check_status(conn, response).await?;
        response
            .json()
            .await
            .map_err(|e| PlatformError::Upstream(format!("failed to parse platform response: {e}")))
    }

    async fn create_tooling_record<B: Serialize>(
        &self,
        conn: &ConnectionContext,
        sobject_type: &str,
        body: &B,
    ) -> Result<(), PlatformError> {
        let instance = self.instance_url(conn).await?;
        let url = self.data_url(&instance, &format!("/tooling/sobjects/{sobject_type}"));

        let response = self
            .client
            .post(&url)
            .bearer_auth(conn.session_id())
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        self.check_status(conn, response).await?;
        Ok(())
    }

    /// Pass successful responses through; turn everything else into a
    /// [`PlatformError`] carrying the platform's own message. A rejected
    /// token also evicts the connection's cached instance.
    async fn check_status(&self, conn: &ConnectionContext, response: Response) -> Result<Response, PlatformError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let first = serde_json::from_str::<Vec<ApiError>>(&body)
            .ok()
            .and_then(|errors| errors.into_iter().next());

        let session_rejected = status == StatusCode::UNAUTHORIZED
            || first.as_ref().is_some_and(|err| err.error_code == INVALID_SESSION_ID);
        if session_rejected {
            self.forget_instance(conn);
        }

        Err(match first {
            Some(err) if err.error_code == DUPLICATE_VALUE => PlatformError::Duplicate(err.message),
            Some(err) if !err.message.is_empty() => PlatformError::Upstream(err.message),
            _ => PlatformError::Upstream(format!("HTTP {status}: {body}")),
        })
    }
}

fn transport_error(e: reqwest::Error) -> PlatformError {
    if e.is_timeout() {
        PlatformError::Upstream(format!("platform request timed out: {e}"))
    } else {
        PlatformError::Upstream(format!("HTTP request failed: {e}"))
    }
}

impl ForcePlatform for ForceClient {
    async fn list_sobjects(&self, conn: &ConnectionContext) -> Result<Vec<SobjectSummary>, PlatformError> {
        let span = tracing::info_span!("force.list_sobjects", env = %conn.env());
        async {
            let instance = self.instance_url(conn).await?;
            let url = self.data_url(&instance, "/sobjects");
            let describe: DescribeGlobal<SobjectSummary> = self
                .fetch_json(conn, self.client.get(&url).bearer_auth(conn.session_id()))
                .await?;
            Ok(describe.sobjects)
        }
        .instrument(span)
        .await
    }

    async fn list_apex_triggers(
        &self,
        conn: &ConnectionContext,
    ) -> Result<Vec<ApexTriggerRecord>, PlatformError> {
        let span = tracing::info_span!("force.list_apex_triggers", env = %conn.env());
        async {
            let instance = self.instance_url(conn).await?;
            let first_url = self.data_url(&instance, "/tooling/query");

            let mut page: QueryPage<ApexTriggerRecord> = self
                .fetch_json(
                    conn,
                    self.client
                        .get(&first_url)
                        .query(&[("q", TRIGGER_QUERY)])
                        .bearer_auth(conn.session_id()),
                )
                .await?;
            let mut records = std::mem::take(&mut page.records);

            while !page.done {
                let Some(next) = page.next_records_url.take() else {
                    break;
                };
                page = self
                    .fetch_json(
                        conn,
                        self.client
                            .get(format!("{instance}{next}"))
                            .bearer_auth(conn.session_id()),
                    )
                    .await?;
                records.append(&mut page.records);
            }

            tracing::debug!(count = records.len(), "listed apex triggers");
            Ok(records)
        }
        .instrument(span)
        .await
    }

    async fn create_apex_class(
        &self,
        conn: &ConnectionContext,
        name: &str,
        body: &str,
    ) -> Result<(), PlatformError> {
        let span = tracing::info_span!("force.create_apex_class", env = %conn.env(), artifact = %name);
        self.create_tooling_record(conn, "ApexClass", &ApexClassCreate { name, body })
            .instrument(span)
            .await
    }

    async fn create_apex_trigger(
        &self,
        conn: &ConnectionContext,
        name: &str,
        body: &str,
        sobject: &str,
    ) -> Result<(), PlatformError> {
        let span = tracing::info_span!(
            "force.create_apex_trigger",
            env = %conn.env(),
            artifact = %name,
            sobject = %sobject,
        );
        let record = ApexTriggerCreate {
            name,
            table_enum_or_id: sobject,
            body,
        };
        self.create_tooling_record(conn, "ApexTrigger", &record)
            .instrument(span)
            .await
    }

    async fn create_remote_site(
        &self,
        conn: &ConnectionContext,
        name: &str,
        url: &str,
    ) -> Result<(), PlatformError> {
        let span = tracing::info_span!("force.create_remote_site", env = %conn.env(), artifact = %name);
        async {
            let instance = self.instance_url(conn).await?;
            let endpoint = format!("{instance}/services/Soap/m/{}", self.api_version);
            let envelope = create_remote_site_envelope(conn.session_id(), name, url);

            let response = self
                .client
                .post(&endpoint)
                .header("Content-Type", "text/xml; charset=UTF-8")
                .header("SOAPAction", "\"\"")
                .body(envelope)
                .send()
                .await
                .map_err(transport_error)?;

            // Faults arrive as HTTP 500 with a SOAP body, so read it either way.
            let body = response.text().await.map_err(transport_error)?;
            let result = interpret_create_response(&body);
            if matches!(&result, Err(PlatformError::Upstream(msg)) if msg.starts_with(INVALID_SESSION_ID)) {
                self.forget_instance(conn);
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, ForceClient, ConnectionContext) {
        let server = MockServer::start().await;
        let mut config = ForcehookConfig::default();
        config.environments.insert("prod".to_string(), format!("{}/", server.uri()));
        config.request_timeout_secs = 2;

        Mock::given(method("GET"))
            .and(path("/services/oauth2/userinfo"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_id": "005",
                "urls": { "rest": format!("{}/services/data/v{{version}}/", server.uri()) }
            })))
            .mount(&server)
            .await;

        let client = ForceClient::new(&config).unwrap();
        (server, client, ConnectionContext::new("tok", "prod"))
    }

    #[tokio::test]
    async fn lists_sobjects() {
        let (server, client, conn) = setup().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/sobjects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "encoding": "UTF-8",
                "sobjects": [
                    { "name": "Account", "triggerable": true, "label": "Account" },
                    { "name": "AccountHistory", "triggerable": false }
                ]
            })))
            .mount(&server)
            .await;

        let sobjects = client.list_sobjects(&conn).await.unwrap();
        assert_eq!(sobjects.len(), 2);
        assert_eq!(sobjects[0].name, "Account");
        assert!(sobjects[0].triggerable);
        assert!(!sobjects[1].triggerable);
    }

    #[tokio::test]
    async fn instance_lookup_is_cached() {
        let server = MockServer::start().await;
        let mut config = ForcehookConfig::default();
        config.environments.insert("prod".to_string(), server.uri());

        Mock::given(method("GET"))
            .and(path("/services/oauth2/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "urls": { "rest": format!("{}/services/data/v{{version}}/", server.uri()) }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/sobjects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sobjects": [] })))
            .expect(2)
            .mount(&server)
            .await;

        let client = ForceClient::new(&config).unwrap();
        let conn = ConnectionContext::new("tok", "prod");
        client.list_sobjects(&conn).await.unwrap();
        client.list_sobjects(&conn).await.unwrap();
    }

    /// Server whose userinfo accepts any token; sobject listing answers with `sobjects`.
    async fn open_server(sobjects: ResponseTemplate) -> (MockServer, ForceClient) {
        let server = MockServer::start().await;
        let mut config = ForcehookConfig::default();
        config.environments.insert("prod".to_string(), server.uri());

        Mock::given(method("GET"))
            .and(path("/services/oauth2/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "urls": { "rest": format!("{}/services/data/v{{version}}/", server.uri()) }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/sobjects"))
            .respond_with(sobjects)
            .mount(&server)
            .await;

        let client = ForceClient::new(&config).unwrap();
        (server, client)
    }

    #[tokio::test]
    async fn rejected_tokens_are_evicted() {
        let (_server, client) = open_server(ResponseTemplate::new(401).set_body_json(json!([{
            "message": "Session expired or invalid",
            "errorCode": "INVALID_SESSION_ID"
        }])))
        .await;

        for i in 0..50 {
            let conn = ConnectionContext::new(format!("expired-{i}"), "prod");
            let err = client.list_sobjects(&conn).await.unwrap_err();
            assert_eq!(err, PlatformError::Upstream("Session expired or invalid".to_string()));
        }
        assert!(client.instances.is_empty());
    }

    #[tokio::test]
    async fn instance_cache_is_bounded() {
        let (_server, mut client) =
            open_server(ResponseTemplate::new(200).set_body_json(json!({ "sobjects": [] }))).await;
        client.instance_capacity = 3;

        for i in 0..10 {
            let conn = ConnectionContext::new(format!("tok-{i}"), "prod");
            client.list_sobjects(&conn).await.unwrap();
            assert!(client.instances.len() <= 3);
        }
    }

    #[tokio::test]
    async fn remote_site_session_fault_evicts_instance() {
        let (server, client, conn) = setup().await;
        Mock::given(method("POST"))
            .and(path("/services/Soap/m/62.0"))
            .respond_with(ResponseTemplate::new(500).set_body_string(
                "<soapenv:Fault><faultcode>sf:INVALID_SESSION_ID</faultcode>\
                 <faultstring>INVALID_SESSION_ID: Invalid Session ID found in SessionHeader</faultstring>\
                 </soapenv:Fault>",
            ))
            .mount(&server)
            .await;

        let err = client
            .create_remote_site(&conn, "XRemoteSiteSetting", "https://x.io")
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Upstream(ref m) if m.starts_with("INVALID_SESSION_ID")));
        assert!(client.instances.is_empty());
    }

    #[tokio::test]
    async fn trigger_query_follows_pages() {
        let (server, client, conn) = setup().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/tooling/query"))
            .and(query_param("q", TRIGGER_QUERY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "done": false,
                "nextRecordsUrl": "/services/data/v62.0/tooling/query/01g-2000",
                "records": [{ "Name": "AWebhookTrigger", "Body": "a" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/tooling/query/01g-2000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "done": true,
                "records": [{ "Name": "Other", "Body": "b" }]
            })))
            .mount(&server)
            .await;

        let triggers = client.list_apex_triggers(&conn).await.unwrap();
        let names: Vec<&str> = triggers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["AWebhookTrigger", "Other"]);
    }

    #[tokio::test]
    async fn creates_trigger_with_table() {
        let (server, client, conn) = setup().await;
        Mock::given(method("POST"))
            .and(path("/services/data/v62.0/tooling/sobjects/ApexTrigger"))
            .and(body_json(json!({
                "Name": "OrderSyncWebhookTrigger",
                "TableEnumOrId": "Order",
                "Body": "trigger body"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "01q000000000001", "success": true, "errors": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        client
            .create_apex_trigger(&conn, "OrderSyncWebhookTrigger", "trigger body", "Order")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_class_is_reported() {
        let (server, client, conn) = setup().await;
        Mock::given(method("POST"))
            .and(path("/services/data/v62.0/tooling/sobjects/ApexClass"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!([{
                "message": "duplicate value found: <unknown> duplicates value on record with id: <unknown>",
                "errorCode": "DUPLICATE_VALUE",
                "fields": []
            }])))
            .mount(&server)
            .await;

        let err = client.create_apex_class(&conn, "Webhook", "body").await.unwrap_err();
        assert!(matches!(err, PlatformError::Duplicate(ref m) if m.starts_with("duplicate value found")));
    }

    #[tokio::test]
    async fn platform_message_is_preserved() {
        let (server, client, conn) = setup().await;
        Mock::given(method("POST"))
            .and(path("/services/data/v62.0/tooling/sobjects/ApexClass"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!([{
                "message": "Test coverage of selected Apex Trigger is 0%",
                "errorCode": "FIELD_CUSTOM_VALIDATION_EXCEPTION"
            }])))
            .mount(&server)
            .await;

        let err = client.create_apex_class(&conn, "X", "body").await.unwrap_err();
        assert_eq!(
            err,
            PlatformError::Upstream("Test coverage of selected Apex Trigger is 0%".to_string())
        );
    }

    #[tokio::test]
    async fn creates_remote_site_over_soap() {
        let (server, client, conn) = setup().await;
        Mock::given(method("POST"))
            .and(path("/services/Soap/m/62.0"))
            .and(header("SOAPAction", "\"\""))
            .and(body_string_contains("<met:fullName>OrderSyncRemoteSiteSetting</met:fullName>"))
            .and(body_string_contains("<met:sessionId>tok</met:sessionId>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<soapenv:Envelope><soapenv:Body><createMetadataResponse><result>\
                 <fullName>OrderSyncRemoteSiteSetting</fullName><success>true</success>\
                 </result></createMetadataResponse></soapenv:Body></soapenv:Envelope>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        client
            .create_remote_site(&conn, "OrderSyncRemoteSiteSetting", "https://hooks.example.com/order")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_environment_is_upstream_error() {
        let (_server, client, _) = setup().await;
        let conn = ConnectionContext::new("tok", "staging");
        let err = client.list_sobjects(&conn).await.unwrap_err();
        assert_eq!(err, PlatformError::Upstream("unknown environment 'staging'".to_string()));
    }

    #[tokio::test]
    async fn timeout_is_upstream_error() {
        let (server, client, conn) = setup().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/sobjects"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "sobjects": [] }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let err = client.list_sobjects(&conn).await.unwrap_err();
        assert!(matches!(err, PlatformError::Upstream(ref m) if m.contains("timed out")));
    }
}
