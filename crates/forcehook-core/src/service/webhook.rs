//! Webhook discovery and provisioning.
//!
//! WebhookService is generic over the platform port so that the
//! provisioning sequence can be exercised without a network.

use std::fmt;

use tracing::{Instrument, debug, info, info_span, warn};

use forcehook_types::connection::ConnectionContext;
use forcehook_types::error::{PlatformError, WebhookError};
use forcehook_types::webhook::{TriggerMetadata, WebhookPayload};

use crate::apex::{self, ApexArtifacts, HELPER_CLASS_NAME};
use crate::platform::ForcePlatform;

/// One platform write in the provisioning sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    HelperClass,
    RemoteSite,
    Trigger,
    TestClass,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionStep::HelperClass => write!(f, "helper_class"),
            ProvisionStep::RemoteSite => write!(f, "remote_site"),
            ProvisionStep::Trigger => write!(f, "trigger"),
            ProvisionStep::TestClass => write!(f, "test_class"),
        }
    }
}

/// Lists, reads back and creates webhook triggers on the platform.
pub struct WebhookService<P: ForcePlatform> {
    platform: P,
}

impl<P: ForcePlatform> WebhookService<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    /// Names of the sobjects a trigger can be attached to, in platform order.
    pub async fn list_triggerable_sobjects(
        &self,
        conn: &ConnectionContext,
    ) -> Result<Vec<String>, WebhookError> {
        let sobjects = self.platform.list_sobjects(conn).await?;
        Ok(sobjects
            .into_iter()
            .filter(|s| s.triggerable)
            .map(|s| s.name)
            .collect())
    }

    /// Every webhook trigger currently on the platform.
    ///
    /// Triggers without the webhook suffix are ignored. A webhook trigger
    /// whose body cannot be read back is logged and skipped; the rest are
    /// still returned.
    pub async fn discover(&self, conn: &ConnectionContext) -> Result<Vec<TriggerMetadata>, WebhookError> {
        let span = info_span!("webhook.discover", env = %conn.env());

        async {
            let triggers = self.platform.list_apex_triggers(conn).await?;
            let total = triggers.len();

            let webhooks: Vec<TriggerMetadata> = triggers
                .into_iter()
                .filter(|t| apex::is_webhook_trigger(&t.name))
                .filter_map(|t| match apex::parse_trigger(&t.name, &t.body) {
                    Ok(meta) => Some(meta),
                    Err(e) => {
                        warn!(trigger = %t.name, error = %e, "skipping unreadable webhook trigger");
                        None
                    }
                })
                .collect();

            debug!(total, webhooks = webhooks.len(), "listed apex triggers");
            Ok::<_, WebhookError>(webhooks)
        }
        .instrument(span)
        .await
    }

    /// Validate a payload and create every artifact for it, in order.
    ///
    /// The helper class is shared between webhooks, so an existing one is
    /// accepted. Any other failure stops the sequence where it happened;
    /// artifacts already created are left in place.
    pub async fn provision(
        &self,
        conn: &ConnectionContext,
        payload: WebhookPayload,
    ) -> Result<TriggerMetadata, WebhookError> {
        let meta = TriggerMetadata::try_from(payload)?;

        let span = info_span!(
            "webhook.provision",
            env = %conn.env(),
            webhook = %meta.name,
            sobject = %meta.sobject,
        );

        async {
            let artifacts = ApexArtifacts::render(&meta);

            let helper = self
                .platform
                .create_apex_class(conn, HELPER_CLASS_NAME, &artifacts.helper_class)
                .await;
            match helper {
                Ok(()) => info!(step = %ProvisionStep::HelperClass, "created"),
                Err(PlatformError::Duplicate(msg)) => {
                    debug!(step = %ProvisionStep::HelperClass, reason = %msg, "already present");
                }
                Err(e) => return Err(step_failed(ProvisionStep::HelperClass, e)),
            }

            let remote_site = apex::remote_site_name(&meta.name);
            self.platform
                .create_remote_site(conn, &remote_site, &meta.url)
                .await
                .map_err(|e| step_failed(ProvisionStep::RemoteSite, e))?;
            info!(step = %ProvisionStep::RemoteSite, artifact = %remote_site, "created");

            self.platform
                .create_apex_trigger(conn, &meta.name, &artifacts.trigger, &meta.sobject)
                .await
                .map_err(|e| step_failed(ProvisionStep::Trigger, e))?;
            info!(step = %ProvisionStep::Trigger, artifact = %meta.name, "created");

            self.platform
                .create_apex_class(conn, &meta.name, &artifacts.test_class)
                .await
                .map_err(|e| step_failed(ProvisionStep::TestClass, e))?;
            info!(step = %ProvisionStep::TestClass, artifact = %meta.name, "created");

            Ok::<(), WebhookError>(())
        }
        .instrument(span)
        .await?;

        Ok(meta)
    }
}

fn step_failed(step: ProvisionStep, e: PlatformError) -> WebhookError {
    warn!(step = %step, error = %e, "provisioning stopped");
    e.into()
}
