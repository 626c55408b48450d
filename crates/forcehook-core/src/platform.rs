//! External platform port.
//!
//! The orchestrator talks to the platform only through [`ForcePlatform`].
//! The concrete HTTP client lives in `forcehook-infra`; tests supply
//! in-memory fakes.

use std::future::Future;

use forcehook_types::connection::ConnectionContext;
use forcehook_types::error::PlatformError;
use forcehook_types::platform::{ApexTriggerRecord, SobjectSummary};

/// Listing and creation calls against the platform's management API.
///
/// Every call is made on behalf of the given connection. Implementations
/// must bound each call with a timeout and report it as
/// [`PlatformError::Upstream`].
pub trait ForcePlatform: Send + Sync {
    /// All sobjects visible to the connection.
    fn list_sobjects(
        &self,
        conn: &ConnectionContext,
    ) -> impl Future<Output = Result<Vec<SobjectSummary>, PlatformError>> + Send;

    /// All Apex triggers (name and body).
    fn list_apex_triggers(
        &self,
        conn: &ConnectionContext,
    ) -> impl Future<Output = Result<Vec<ApexTriggerRecord>, PlatformError>> + Send;

    /// Create an Apex class. A name collision is [`PlatformError::Duplicate`].
    fn create_apex_class(
        &self,
        conn: &ConnectionContext,
        name: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Create an Apex trigger on `sobject`.
    fn create_apex_trigger(
        &self,
        conn: &ConnectionContext,
        name: &str,
        body: &str,
        sobject: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Create a remote-site allowlist entry for `url`.
    fn create_remote_site(
        &self,
        conn: &ConnectionContext,
        name: &str,
        url: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;
}
